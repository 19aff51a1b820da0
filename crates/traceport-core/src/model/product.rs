use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::telemetry::OperationalSnapshot;
use crate::errors::Result;

/// Product - the aggregate root of a digital passport
///
/// A product carries an identification block (the only required section),
/// several schemaless descriptive sections, lifecycle data, and usage data
/// holding the live operational snapshot plus maintenance/repair history.
///
/// Serialized field names are camelCase; diff paths over product snapshots
/// therefore read `identification.brandName`, `usageData.operationalData.x`
/// and so on. Ownership fields are weak string references - no referential
/// integrity is enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier for this product (UUID string)
    pub id: String,

    /// Identification section (required)
    pub identification: Identification,

    /// Technical specifications (schemaless passthrough)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_specifications: Option<Value>,

    /// Documentation section (schemaless passthrough)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<Value>,

    /// Sustainability section (schemaless passthrough)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sustainability: Option<Value>,

    /// Production data section (schemaless passthrough)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_data: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_lifecycle: Option<ProductLifecycle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_data: Option<UsageData>,

    /// Owner identity bound via NIF/NISS lookup (weak reference)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<String>,

    /// Company identity that manages this product (weak reference)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create a new active product with the given ID and identification
    pub fn new(id: String, identification: Identification) -> Self {
        let now = Utc::now();
        Self {
            id,
            identification,
            technical_specifications: None,
            documentation: None,
            sustainability: None,
            production_data: None,
            product_lifecycle: None,
            usage_data: None,
            owner_user_id: None,
            company_user_id: None,
            created_by_id: None,
            updated_by_id: None,
            description: None,
            image_url: None,
            qr_code: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this product is visible/active
    ///
    /// Deactivation is a soft delete: the flag flips, the row stays.
    pub fn is_active(&self) -> bool {
        self.identification.is_active
    }

    /// Full state snapshot as a nested JSON mapping
    ///
    /// Used as the before/after state recorded on audit entries. Absent
    /// optional sections are omitted (not serialized as null), so the diff
    /// engine sees section creation as `added` rather than a null change.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the aggregate cannot be encoded
    /// (does not happen for well-formed products).
    pub fn snapshot(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => unreachable!("a struct always serializes to a JSON object"),
        }
    }

    /// Current operational snapshot, empty if usage data is absent
    pub fn operational_data(&self) -> OperationalSnapshot {
        self.usage_data
            .as_ref()
            .map(|u| u.operational_data.clone())
            .unwrap_or_default()
    }

    /// Assign a merged operational snapshot, creating usage data on first write
    pub fn set_operational_data(&mut self, snapshot: OperationalSnapshot) {
        let usage = self.usage_data.get_or_insert_with(UsageData::default);
        usage.operational_data = snapshot;
    }

    /// Bump the updated-at timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Identification section - the only required product section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identification {
    pub brand_name: String,
    pub model_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_category: Option<ProductCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_code: Option<String>,
    /// Soft-delete flag: false means deactivated, never physically removed
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Identification {
    /// Create an identification block with the two required fields
    pub fn new(brand_name: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            brand_name: brand_name.into(),
            model_name: model_name.into(),
            sku: None,
            upc: None,
            product_category: None,
            serial_number: None,
            serial_number_pattern: None,
            internal_code: None,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductCategory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tertiary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductLifecycle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_lifetime_hours: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_maintenance_interval_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_of_life_date: Option<NaiveDate>,
}

/// Usage data: live operational snapshot plus maintenance/repair history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsageData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_usage_per_day: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Telemetry field -> latest value, merged from broker deltas
    #[serde(default, skip_serializing_if = "OperationalSnapshot::is_empty")]
    pub operational_data: OperationalSnapshot,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maintenance_history: Vec<MaintenanceItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repair_history: Vec<RepairItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technician: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<UsageAttachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RepairItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub under_warranty: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<UsageAttachment>,
}

/// File attachment on a maintenance or repair entry
///
/// Only the opaque attachment id is meaningful to the core; storage
/// mechanics live behind an external file service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageAttachment {
    pub attachment_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub uploaded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TelemetryValue;

    #[test]
    fn test_new_product_is_active() {
        let product = Product::new(
            "prod-1".to_string(),
            Identification::new("Acme", "Conveyor X1"),
        );
        assert!(product.is_active());
        assert!(product.usage_data.is_none());
        assert!(product.operational_data().is_empty());
    }

    #[test]
    fn test_snapshot_uses_camel_case_paths() {
        let product = Product::new(
            "prod-1".to_string(),
            Identification::new("Acme", "Conveyor X1"),
        );
        let snap = product.snapshot().unwrap();

        let ident = snap["identification"].as_object().unwrap();
        assert_eq!(ident["brandName"], "Acme");
        assert_eq!(ident["isActive"], true);
        // Absent sections are omitted, not serialized as null
        assert!(!snap.contains_key("usageData"));
        assert!(!snap.contains_key("technicalSpecifications"));
    }

    #[test]
    fn test_set_operational_data_creates_usage_data() {
        let mut product = Product::new(
            "prod-1".to_string(),
            Identification::new("Acme", "Conveyor X1"),
        );
        let mut snap = OperationalSnapshot::new();
        snap.insert("motorStatus".to_string(), TelemetryValue::from("running"));

        product.set_operational_data(snap.clone());
        assert_eq!(product.operational_data(), snap);

        let json = product.snapshot().unwrap();
        let usage = json["usageData"].as_object().unwrap();
        assert_eq!(usage["operationalData"]["motorStatus"], "running");
    }

    #[test]
    fn test_deactivation_is_a_flag_flip() {
        let mut product = Product::new(
            "prod-1".to_string(),
            Identification::new("Acme", "Conveyor X1"),
        );
        product.identification.is_active = false;
        assert!(!product.is_active());
        // The aggregate itself survives
        assert_eq!(product.id, "prod-1");
    }
}
