//! Migration fingerprinting.
//!
//! Each applied migration is recorded with a SHA256 fingerprint over its
//! id and SQL text. A later run that finds a different fingerprint for an
//! already-applied id refuses to continue instead of silently diverging
//! from the schema on disk.

use sha2::{Digest, Sha256};

use super::embedded::Migration;

/// SHA256 fingerprint of a migration, hex encoded
pub fn migration_checksum(migration: &Migration) -> String {
    let mut hasher = Sha256::new();
    hasher.update(migration.id.as_bytes());
    // NUL separator so an id/sql boundary shift cannot collide
    hasher.update([0u8]);
    hasher.update(migration.sql.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migration(id: &'static str, sql: &'static str) -> Migration {
        Migration { id, sql }
    }

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let checksum = migration_checksum(&migration("001_test", "SELECT 1"));
        assert_eq!(checksum.len(), 64);
        assert!(checksum.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = migration_checksum(&migration("001_test", "SELECT 1"));
        let b = migration_checksum(&migration("001_test", "SELECT 1"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_covers_the_id() {
        let a = migration_checksum(&migration("001_test", "SELECT 1"));
        let b = migration_checksum(&migration("002_test", "SELECT 1"));
        assert_ne!(a, b);
    }
}
