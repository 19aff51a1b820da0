use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Old and new leaf values at a changed path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: Value,
    pub new: Value,
}

/// Result of comparing two nested snapshots
///
/// All three mappings are keyed by dotted path
/// (`parent.child.grandchild`). Keys are unique per mapping, so traversal
/// order is immaterial to the result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapshotDiff {
    /// Path present on both sides with unequal leaf values
    pub changed: BTreeMap<String, FieldChange>,
    /// Path present only in the next snapshot
    pub added: BTreeMap<String, Value>,
    /// Path present only in the previous snapshot
    pub removed: BTreeMap<String, Value>,
}

impl SnapshotDiff {
    /// True when the two snapshots were identical
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }

    /// Union of all touched path keys across the three sets
    pub fn path_keys(&self) -> BTreeSet<&str> {
        self.changed
            .keys()
            .chain(self.added.keys())
            .chain(self.removed.keys())
            .map(|s| s.as_str())
            .collect()
    }
}
