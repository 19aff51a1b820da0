//! Shallow delta merge for operational snapshots.

use crate::model::OperationalSnapshot;

/// Merge an inbound delta into the current operational snapshot.
///
/// Shallow union: delta entries overwrite same-named current entries;
/// non-overlapping keys from both sides survive. No type coercion or
/// schema validation is performed - any decoded telemetry value is
/// accepted verbatim. Last write wins per top-level key; there is no
/// per-field timestamp comparison (out-of-order broker delivery can
/// overwrite a fresher value - accepted semantics, see DESIGN.md).
pub fn merge_snapshot(
    current: &OperationalSnapshot,
    delta: &OperationalSnapshot,
) -> OperationalSnapshot {
    let mut merged = current.clone();
    for (key, value) in delta {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TelemetryValue;

    fn snap(entries: &[(&str, &str)]) -> OperationalSnapshot {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), TelemetryValue::from(*v)))
            .collect()
    }

    #[test]
    fn test_key_set_is_union() {
        let current = snap(&[("motorStatus", "stopped"), ("mode", "auto")]);
        let delta = snap(&[("motorStatus", "running"), ("rpm", "1450")]);

        let merged = merge_snapshot(&current, &delta);
        let keys: Vec<&str> = merged.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["mode", "motorStatus", "rpm"]);
    }

    #[test]
    fn test_delta_wins_on_overlap() {
        let current = snap(&[("motorStatus", "stopped")]);
        let delta = snap(&[("motorStatus", "running")]);

        let merged = merge_snapshot(&current, &delta);
        assert_eq!(merged["motorStatus"], TelemetryValue::from("running"));
    }

    #[test]
    fn test_non_overlapping_current_keys_survive() {
        let current = snap(&[("mode", "auto")]);
        let delta = snap(&[("rpm", "1450")]);

        let merged = merge_snapshot(&current, &delta);
        assert_eq!(merged["mode"], TelemetryValue::from("auto"));
    }

    #[test]
    fn test_merging_identical_delta_is_idempotent() {
        let current = snap(&[("motorStatus", "running")]);
        let delta = snap(&[("motorStatus", "running")]);

        let merged = merge_snapshot(&current, &delta);
        assert_eq!(merged, current);
    }

    #[test]
    fn test_empty_current_takes_delta() {
        let merged = merge_snapshot(&OperationalSnapshot::new(), &snap(&[("a", "1")]));
        assert_eq!(merged, snap(&[("a", "1")]));
    }
}
