//! Recursive snapshot diff computation.

use serde_json::{Map, Value};

use super::model::{FieldChange, SnapshotDiff};

/// Compute a structural diff between two nested snapshots.
///
/// Recursion rule: descend only when BOTH sides hold a nested mapping at a
/// key; any other type combination (arrays included) is compared as an
/// opaque leaf by equality. `null` is a distinct leaf value from key
/// absence: a key present as null on both sides records nothing, while a
/// key present on one side only is added/removed even when its value is
/// null.
pub fn diff_snapshots(previous: &Map<String, Value>, next: &Map<String, Value>) -> SnapshotDiff {
    let mut diff = SnapshotDiff::default();
    walk(previous, next, "", &mut diff);
    diff
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn walk(old: &Map<String, Value>, new: &Map<String, Value>, path: &str, out: &mut SnapshotDiff) {
    for (key, old_val) in old {
        let full_key = join_path(path, key);
        match new.get(key) {
            None => {
                out.removed.insert(full_key, old_val.clone());
            }
            Some(new_val) => match (old_val, new_val) {
                (Value::Object(old_map), Value::Object(new_map)) => {
                    walk(old_map, new_map, &full_key, out);
                }
                _ => {
                    if old_val != new_val {
                        out.changed.insert(
                            full_key,
                            FieldChange {
                                old: old_val.clone(),
                                new: new_val.clone(),
                            },
                        );
                    }
                }
            },
        }
    }

    for (key, new_val) in new {
        if !old.contains_key(key) {
            out.added.insert(join_path(path, key), new_val.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_identical_snapshots_yield_empty_diff() {
        let a = obj(json!({"identification": {"brandName": "Acme"}}));
        assert!(diff_snapshots(&a, &a).is_empty());
    }

    #[test]
    fn test_changed_leaf_records_old_and_new() {
        let a = obj(json!({"identification": {"brandName": "Acme", "isActive": true}}));
        let b = obj(json!({"identification": {"brandName": "Apex", "isActive": true}}));

        let diff = diff_snapshots(&a, &b);
        assert_eq!(diff.changed.len(), 1);
        let change = &diff.changed["identification.brandName"];
        assert_eq!(change.old, json!("Acme"));
        assert_eq!(change.new, json!("Apex"));
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn test_added_and_removed_keys() {
        let a = obj(json!({"description": "old"}));
        let b = obj(json!({"usageData": {"notes": "fresh"}}));

        let diff = diff_snapshots(&a, &b);
        assert_eq!(diff.removed["description"], json!("old"));
        // A key absent on one side is recorded whole, with no descent
        // into its subtree
        assert_eq!(diff.added["usageData"], json!({"notes": "fresh"}));
        assert!(diff.changed.is_empty());
    }

    #[test]
    fn test_descends_only_when_both_sides_are_objects() {
        // Object replaced by a scalar is one opaque change, not a removal
        // of every nested key.
        let a = obj(json!({"documentation": {"warranty": {"durationMonths": 24}}}));
        let b = obj(json!({"documentation": "see manual"}));

        let diff = diff_snapshots(&a, &b);
        assert_eq!(diff.changed.len(), 1);
        assert!(diff.changed.contains_key("documentation"));
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn test_lists_compare_as_opaque_leaves() {
        let a = obj(json!({"compliance": ["CE", "RoHS"]}));
        let b = obj(json!({"compliance": ["CE"]}));

        let diff = diff_snapshots(&a, &b);
        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.changed["compliance"].old, json!(["CE", "RoHS"]));
        assert_eq!(diff.changed["compliance"].new, json!(["CE"]));
    }

    #[test]
    fn test_null_on_both_sides_records_nothing() {
        let a = obj(json!({"sku": null}));
        let b = obj(json!({"sku": null}));
        assert!(diff_snapshots(&a, &b).is_empty());
    }

    #[test]
    fn test_null_is_distinct_from_absent() {
        let a = obj(json!({}));
        let b = obj(json!({"sku": null}));

        let diff = diff_snapshots(&a, &b);
        assert_eq!(diff.added["sku"], Value::Null);

        let back = diff_snapshots(&b, &a);
        assert_eq!(back.removed["sku"], Value::Null);
    }

    #[test]
    fn test_deeply_nested_dotted_paths() {
        let a = obj(json!({"sustainability": {"recycling": {"isRecyclable": false}}}));
        let b = obj(json!({"sustainability": {"recycling": {"isRecyclable": true}}}));

        let diff = diff_snapshots(&a, &b);
        assert!(diff
            .changed
            .contains_key("sustainability.recycling.isRecyclable"));
    }
}
