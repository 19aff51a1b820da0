//! Error handling for traceport-store
//!
//! Wraps traceport-core's error type with store-specific helpers

use traceport_core::TraceportError;

/// Result type alias using the shared error type
pub type Result<T> = std::result::Result<T, TraceportError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> TraceportError {
    TraceportError::Persistence {
        message: format!("migration {} failed: {}", migration_id, reason),
    }
}

/// Create a checksum mismatch error for an already-applied migration
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> TraceportError {
    TraceportError::Persistence {
        message: format!(
            "checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ),
    }
}

/// Create an error for a stored row whose JSON body failed to decode
pub fn corrupt_row(table: &str, id: &str, err: serde_json::Error) -> TraceportError {
    TraceportError::Persistence {
        message: format!("corrupt {} row {}: {}", table, id, err),
    }
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> TraceportError {
    TraceportError::Persistence {
        message: err.to_string(),
    }
}
