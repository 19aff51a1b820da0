//! Audit record construction
//!
//! [`build_audit_record`] is the single place audit entries are assembled:
//! it validates snapshot preconditions per event type, computes the
//! structural diff, classifies touched paths into structural versus
//! lifecycle changes, and resolves the product code from the
//! identification block. Persistence is the store crate's job; this
//! builder is pure.

use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::diff::diff_snapshots;
use crate::errors::{Result, TraceportError};
use crate::model::{AuditRecord, EventType, LifecycleCategory};

/// Top-level snapshot keys whose subtree counts as structural product data
pub const STRUCT_SECTIONS: [&str; 5] = [
    "identification",
    "technicalSpecifications",
    "documentation",
    "sustainability",
    "productionData",
];

/// Top-level snapshot keys whose subtree counts as lifecycle/usage data
pub const LIFECYCLE_SECTIONS: [&str; 4] = [
    "usageData",
    "productLifecycle",
    "maintenanceHistory",
    "repairHistory",
];

/// Inputs for one audit entry; snapshots are full product states
#[derive(Debug, Clone, Default)]
pub struct AuditParams {
    pub product_id: String,
    pub event_type: Option<EventType>,
    pub source: Option<String>,
    pub source_channel: Option<String>,
    pub request_id: Option<String>,
    pub actor_id: Option<String>,
    pub actor_name: Option<String>,
    /// Defaults to "user" when unset
    pub actor_type: Option<String>,
    pub previous_data: Option<Map<String, Value>>,
    pub new_data: Option<Map<String, Value>>,
    pub lifecycle_category: Option<LifecycleCategory>,
    pub lifecycle_type: Option<String>,
    pub related_product_id: Option<String>,
    pub notes: Option<String>,
}

/// Assemble an audit record from validated inputs.
///
/// # Errors
///
/// Returns [`TraceportError::MissingPreviousData`] or
/// [`TraceportError::MissingNewData`] when the event type requires a
/// snapshot the caller did not supply. Create events need new data only,
/// delete events previous data only, everything else both.
pub fn build_audit_record(params: AuditParams) -> Result<AuditRecord> {
    let event_type = params.event_type.unwrap_or(EventType::Update);

    if event_type.requires_previous_data() && params.previous_data.is_none() {
        return Err(TraceportError::MissingPreviousData {
            event_type: event_type.as_str().to_string(),
        });
    }
    if event_type.requires_new_data() && params.new_data.is_none() {
        return Err(TraceportError::MissingNewData {
            event_type: event_type.as_str().to_string(),
        });
    }

    let diff = match (&params.previous_data, &params.new_data) {
        (Some(prev), Some(next)) => Some(diff_snapshots(prev, next)),
        _ => None,
    };

    let (has_struct_change, has_lifecycle_change) = diff
        .as_ref()
        .map(|d| classify(d.path_keys().into_iter()))
        .unwrap_or((false, false));

    let product_code = resolve_product_code(
        params.previous_data.as_ref(),
        params.new_data.as_ref(),
    );

    Ok(AuditRecord {
        id: Uuid::now_v7().to_string(),
        product_id: params.product_id,
        product_code,
        event_type,
        source: params.source,
        source_channel: params.source_channel,
        request_id: params.request_id,
        actor_id: params.actor_id,
        actor_name: params.actor_name,
        actor_type: params.actor_type.unwrap_or_else(|| "user".to_string()),
        previous_data: params.previous_data,
        new_data: params.new_data,
        diff,
        lifecycle_category: params.lifecycle_category,
        lifecycle_type: params.lifecycle_type,
        related_product_id: params.related_product_id,
        has_struct_change,
        has_lifecycle_change,
        notes: params.notes,
        created_at: Utc::now(),
    })
}

/// Classify touched diff paths into (structural, lifecycle) flags.
///
/// A section created or removed wholesale surfaces in the diff as the
/// bare key (`usageData`, not `usageData.…`), so classification is by
/// the leading path segment rather than a dotted prefix.
fn classify<'a>(paths: impl Iterator<Item = &'a str>) -> (bool, bool) {
    let mut structural = false;
    let mut lifecycle = false;
    for path in paths {
        let section = path.split('.').next().unwrap_or(path);
        structural |= STRUCT_SECTIONS.contains(&section);
        lifecycle |= LIFECYCLE_SECTIONS.contains(&section);
        if structural && lifecycle {
            break;
        }
    }
    (structural, lifecycle)
}

/// Serial number, falling back to internal code, from whichever snapshot
/// carries an identification block (previous preferred).
fn resolve_product_code(
    previous: Option<&Map<String, Value>>,
    new: Option<&Map<String, Value>>,
) -> Option<String> {
    for snapshot in [previous, new].into_iter().flatten() {
        let Some(ident) = snapshot.get("identification").and_then(Value::as_object) else {
            continue;
        };
        let code = ident
            .get("serialNumber")
            .and_then(Value::as_str)
            .or_else(|| ident.get("internalCode").and_then(Value::as_str));
        if let Some(code) = code {
            return Some(code.to_string());
        }
    }
    None
}
