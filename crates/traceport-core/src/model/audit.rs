use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::diff::SnapshotDiff;

/// Kind of state transition recorded by an audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Create,
    Update,
    Delete,
    LifecycleEvent,
    RelationChange,
}

impl EventType {
    /// Stable string form, used for persistence and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Create => "create",
            EventType::Update => "update",
            EventType::Delete => "delete",
            EventType::LifecycleEvent => "lifecycle_event",
            EventType::RelationChange => "relation_change",
        }
    }

    /// Parse from the stable string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(EventType::Create),
            "update" => Some(EventType::Update),
            "delete" => Some(EventType::Delete),
            "lifecycle_event" => Some(EventType::LifecycleEvent),
            "relation_change" => Some(EventType::RelationChange),
            _ => None,
        }
    }

    /// Whether the audit builder requires a previous-state snapshot
    pub fn requires_previous_data(&self) -> bool {
        matches!(
            self,
            EventType::Update
                | EventType::Delete
                | EventType::RelationChange
                | EventType::LifecycleEvent
        )
    }

    /// Whether the audit builder requires a new-state snapshot
    pub fn requires_new_data(&self) -> bool {
        matches!(
            self,
            EventType::Create
                | EventType::Update
                | EventType::RelationChange
                | EventType::LifecycleEvent
        )
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse lifecycle classification attached to lifecycle-flavored events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleCategory {
    Maintenance,
    Repair,
    StatusChange,
    Movement,
    Other,
}

impl LifecycleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleCategory::Maintenance => "maintenance",
            LifecycleCategory::Repair => "repair",
            LifecycleCategory::StatusChange => "status_change",
            LifecycleCategory::Movement => "movement",
            LifecycleCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "maintenance" => Some(LifecycleCategory::Maintenance),
            "repair" => Some(LifecycleCategory::Repair),
            "status_change" => Some(LifecycleCategory::StatusChange),
            "movement" => Some(LifecycleCategory::Movement),
            "other" => Some(LifecycleCategory::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for LifecycleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable ledger entry capturing a product state transition
///
/// Records full before/after snapshots (the entire product state, not just
/// the changed slice) plus the computed structural diff. Created if and
/// only if the two snapshots differ - the caller decides that; once
/// written a record is never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Unique identifier (UUIDv7)
    pub id: String,

    /// Subject product
    pub product_id: String,

    /// Serial number or internal code pulled from the identification block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,

    pub event_type: EventType,

    /// Origin of the change ("broker", "api", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Channel within the source ("mqtt_backend", "rest", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_channel: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_name: Option<String>,

    /// "user" unless the caller says otherwise
    pub actor_type: String,

    /// Full product state before the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_data: Option<Map<String, Value>>,

    /// Full product state after the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_data: Option<Map<String, Value>>,

    /// Structural diff between the two snapshots, when both are present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<SnapshotDiff>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_category: Option<LifecycleCategory>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_product_id: Option<String>,

    /// Any diff path touched a structural section
    pub has_struct_change: bool,

    /// Any diff path touched usage data or lifecycle sections
    pub has_lifecycle_change: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}
