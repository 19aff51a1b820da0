//! Audit writer: the single path from a computed change to the ledger.
//!
//! Builds the record via the core builder (precondition checks, diff,
//! classification) and appends it to the ledger. Every mutation command
//! in this crate routes through [`log_product_audit`].

use rusqlite::Connection;
use traceport_core::audit::{build_audit_record, AuditParams};
use traceport_core::errors::Result;
use traceport_core::{log_op_error, AuditRecord};
use traceport_store::repo::AuditRepo;

/// Build and append one audit record.
///
/// # Errors
///
/// Propagates precondition failures from the builder (missing snapshots
/// for the event type) and persistence failures from the ledger insert.
/// Nothing is written when building fails.
pub fn log_product_audit(conn: &Connection, params: AuditParams) -> Result<AuditRecord> {
    let product_id = params.product_id.clone();

    let record = build_audit_record(params).inspect_err(|e| {
        log_op_error!("log_product_audit", e, product_id = %product_id);
    })?;

    AuditRepo::insert(conn, &record)?;

    tracing::info!(
        component = module_path!(),
        op = "log_product_audit",
        event = traceport_core_types::schema::EVENT_END,
        product_id = %record.product_id,
        audit_id = %record.id,
        event_type = %record.event_type,
        has_struct_change = record.has_struct_change,
        has_lifecycle_change = record.has_lifecycle_change,
    );

    Ok(record)
}
