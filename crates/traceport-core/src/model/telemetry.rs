use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latest known telemetry state for a product: an ordered mapping of
/// field name to scalar value, with no fixed schema.
///
/// Created empty on the first accepted delta, overwritten field-by-field
/// on each merge, never independently deleted.
pub type OperationalSnapshot = BTreeMap<String, TelemetryValue>;

/// A single telemetry scalar.
///
/// Deltas arrive as arbitrary JSON objects; values are accepted verbatim
/// with no coercion, but are modeled as a small tagged union so merge and
/// diff have well-defined equality semantics. Variant order matters for
/// untagged deserialization: RFC 3339 strings become timestamps, all other
/// strings stay text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TelemetryValue {
    Bool(bool),
    Number(f64),
    Timestamp(DateTime<Utc>),
    Text(String),
}

impl From<&str> for TelemetryValue {
    fn from(s: &str) -> Self {
        TelemetryValue::Text(s.to_string())
    }
}

impl From<f64> for TelemetryValue {
    fn from(n: f64) -> Self {
        TelemetryValue::Number(n)
    }
}

impl From<bool> for TelemetryValue {
    fn from(b: bool) -> Self {
        TelemetryValue::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_scalar_kinds() {
        let snap: OperationalSnapshot = serde_json::from_str(
            r#"{"motorStatus": "running", "rpm": 1450.5, "enabled": true}"#,
        )
        .unwrap();

        assert_eq!(snap["motorStatus"], TelemetryValue::from("running"));
        assert_eq!(snap["rpm"], TelemetryValue::Number(1450.5));
        assert_eq!(snap["enabled"], TelemetryValue::Bool(true));
    }

    #[test]
    fn test_rfc3339_string_decodes_as_timestamp() {
        let snap: OperationalSnapshot =
            serde_json::from_str(r#"{"lastSeen": "2026-01-15T08:30:00Z"}"#).unwrap();
        assert!(matches!(snap["lastSeen"], TelemetryValue::Timestamp(_)));
    }

    #[test]
    fn test_non_object_payload_rejected() {
        let result = serde_json::from_str::<OperationalSnapshot>(r#"[1, 2, 3]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let mut snap = OperationalSnapshot::new();
        snap.insert("temperature".to_string(), TelemetryValue::Number(21.5));
        snap.insert("state".to_string(), TelemetryValue::from("idle"));

        let json = serde_json::to_string(&snap).unwrap();
        let back: OperationalSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, back);
    }
}
