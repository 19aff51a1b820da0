//! Property tests for the snapshot diff engine.
//!
//! Pure in-memory checks (no I/O): diff symmetry, disjointness of the
//! three result sets, and reconstruction of the target snapshot from the
//! source plus the diff.

use proptest::prelude::*;
use serde_json::{Map, Value};
use traceport_core::diff::diff_snapshots;

/// Scalar leaf values as they appear in product snapshots.
fn leaf_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-1000i64..1000).prop_map(Value::from),
        "[a-z]{1,8}".prop_map(Value::from),
    ]
}

/// Flat snapshot: small key space so that generated pairs overlap often.
fn flat_snapshot() -> impl Strategy<Value = Map<String, Value>> {
    proptest::collection::btree_map("[a-e]", leaf_value(), 0..6)
        .prop_map(|m| m.into_iter().collect())
}

/// Two-level snapshot with nested sections under fixed keys.
fn nested_snapshot() -> impl Strategy<Value = Map<String, Value>> {
    proptest::collection::btree_map(
        prop_oneof![Just("identification"), Just("usageData"), Just("docs")],
        flat_snapshot().prop_map(Value::Object),
        0..3,
    )
    .prop_map(|m| m.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

/// Apply a flat-snapshot diff back onto the source mapping.
fn apply_flat(source: &Map<String, Value>, diff: &traceport_core::diff::SnapshotDiff) -> Map<String, Value> {
    let mut result = source.clone();
    for key in diff.removed.keys() {
        result.remove(key);
    }
    for (key, change) in &diff.changed {
        result.insert(key.clone(), change.new.clone());
    }
    for (key, value) in &diff.added {
        result.insert(key.clone(), value.clone());
    }
    result
}

proptest! {
    #[test]
    fn prop_diff_self_is_empty(snap in nested_snapshot()) {
        prop_assert!(diff_snapshots(&snap, &snap).is_empty());
    }

    #[test]
    fn prop_added_mirrors_removed(a in nested_snapshot(), b in nested_snapshot()) {
        let forward = diff_snapshots(&a, &b);
        let backward = diff_snapshots(&b, &a);
        prop_assert_eq!(&forward.added, &backward.removed);
        prop_assert_eq!(&forward.removed, &backward.added);
    }

    #[test]
    fn prop_changed_swaps_old_and_new(a in nested_snapshot(), b in nested_snapshot()) {
        let forward = diff_snapshots(&a, &b);
        let backward = diff_snapshots(&b, &a);
        prop_assert_eq!(forward.changed.len(), backward.changed.len());
        for (path, change) in &forward.changed {
            let mirrored = &backward.changed[path];
            prop_assert_eq!(&change.old, &mirrored.new);
            prop_assert_eq!(&change.new, &mirrored.old);
        }
    }

    #[test]
    fn prop_result_sets_are_disjoint(a in nested_snapshot(), b in nested_snapshot()) {
        let diff = diff_snapshots(&a, &b);
        for path in diff.changed.keys() {
            prop_assert!(!diff.added.contains_key(path));
            prop_assert!(!diff.removed.contains_key(path));
        }
        for path in diff.added.keys() {
            prop_assert!(!diff.removed.contains_key(path));
        }
    }

    // Flat snapshots only: dotted paths map one-to-one onto keys there,
    // so the diff is a complete edit script.
    #[test]
    fn prop_flat_diff_reconstructs_target(a in flat_snapshot(), b in flat_snapshot()) {
        let diff = diff_snapshots(&a, &b);
        prop_assert_eq!(apply_flat(&a, &diff), b);
    }
}
