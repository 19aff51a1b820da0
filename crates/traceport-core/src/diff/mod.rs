//! Structural diff over nested JSON snapshots
//!
//! The core entry point is [`diff_snapshots`], a pure function comparing
//! two product state mappings and yielding per-path changed/added/removed
//! sets. It is generic over JSON trees and knows nothing about the product
//! schema, so it is independently unit-testable.

mod engine;
mod model;

pub use engine::diff_snapshots;
pub use model::{FieldChange, SnapshotDiff};
