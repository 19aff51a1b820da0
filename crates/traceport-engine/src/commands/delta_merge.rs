//! Telemetry delta pipeline.
//!
//! ## Pipeline (in order):
//! 1. Load the product (unknown id is an error, not a silent drop)
//! 2. Empty delta short-circuit (no writes)
//! 3. Merge delta into the current operational snapshot
//! 4. Merged == current short-circuit (idempotent redelivery, no writes)
//! 5. Persist the updated aggregate and append the audit record
//!
//! Steps 4 and 5 make redelivered broker messages no-ops: the ledger only
//! grows when the stored state actually changed.

use rusqlite::Connection;
use traceport_core::audit::AuditParams;
use traceport_core::errors::{Result, TraceportError};
use traceport_core::merge::merge_snapshot;
use traceport_core::model::OperationalSnapshot;
use traceport_core::{log_op_end, log_op_start, EventType, LifecycleCategory, Product};
use traceport_store::repo::ProductRepo;

use super::audit_writer::log_product_audit;

/// Provenance attached to a delta application
#[derive(Debug, Clone)]
pub struct DeltaContext {
    /// Origin of the change ("broker", "api", ...)
    pub source: String,
    /// Channel within the source ("mqtt_backend", "rest", ...)
    pub source_channel: String,
    pub request_id: Option<String>,
    pub actor_id: Option<String>,
    pub actor_name: Option<String>,
    pub notes: Option<String>,
}

impl DeltaContext {
    /// Context for deltas arriving over the broker ingestion path
    pub fn broker(request_id: impl Into<String>) -> Self {
        Self {
            source: "broker".to_string(),
            source_channel: "mqtt_backend".to_string(),
            request_id: Some(request_id.into()),
            actor_id: None,
            actor_name: None,
            notes: None,
        }
    }
}

/// Result of applying one telemetry delta
#[derive(Debug, Clone)]
pub struct DeltaOutcome {
    /// False when the delta was empty or already reflected in the store
    pub changed: bool,
    /// The product after the operation (unchanged on no-op)
    pub product: Product,
    /// Ledger entry id, present only when a write happened
    pub audit_id: Option<String>,
}

/// Apply a telemetry delta to a product's operational snapshot.
///
/// # Errors
///
/// Returns [`TraceportError::ProductNotFound`] for an unknown product id;
/// persistence errors surface from the repositories.
pub fn apply_operational_delta(
    conn: &Connection,
    product_id: &str,
    delta: &OperationalSnapshot,
    ctx: &DeltaContext,
) -> Result<DeltaOutcome> {
    log_op_start!(
        "apply_operational_delta",
        product_id = %product_id,
        delta_fields = delta.len(),
    );

    let mut product = ProductRepo::get(conn, product_id)?.ok_or_else(|| {
        TraceportError::ProductNotFound {
            product_id: product_id.to_string(),
        }
    })?;

    if delta.is_empty() {
        log_op_end!("apply_operational_delta", product_id = %product_id, changed = false);
        return Ok(DeltaOutcome {
            changed: false,
            product,
            audit_id: None,
        });
    }

    let current = product.operational_data();
    let merged = merge_snapshot(&current, delta);

    if merged == current {
        // Idempotent redelivery: state already reflects this delta
        log_op_end!("apply_operational_delta", product_id = %product_id, changed = false);
        return Ok(DeltaOutcome {
            changed: false,
            product,
            audit_id: None,
        });
    }

    let previous_data = product.snapshot()?;

    product.set_operational_data(merged);
    product.touch();
    ProductRepo::upsert(conn, &product)?;

    let new_data = product.snapshot()?;

    let record = log_product_audit(
        conn,
        AuditParams {
            product_id: product.id.clone(),
            event_type: Some(EventType::Update),
            source: Some(ctx.source.clone()),
            source_channel: Some(ctx.source_channel.clone()),
            request_id: ctx.request_id.clone(),
            actor_id: ctx.actor_id.clone(),
            actor_name: ctx.actor_name.clone(),
            previous_data: Some(previous_data),
            new_data: Some(new_data),
            lifecycle_category: Some(LifecycleCategory::Other),
            lifecycle_type: Some("operational_data_update".to_string()),
            notes: ctx.notes.clone(),
            ..Default::default()
        },
    )?;

    log_op_end!(
        "apply_operational_delta",
        product_id = %product_id,
        changed = true,
        audit_id = %record.id,
    );

    Ok(DeltaOutcome {
        changed: true,
        product,
        audit_id: Some(record.id),
    })
}
