//! Traceport Core - domain models and pure pipeline logic
//!
//! This crate provides the foundational data structures and pure functions
//! for the digital product passport platform:
//! - Product aggregate, audit record, and role profile models
//! - Structural diff engine over nested JSON snapshots
//! - Shallow delta merge for operational telemetry snapshots
//! - Audit record builder with precondition validation and classification
//! - Role-based authorization policy and allowlist pruning
//!
//! Persistence, orchestration, and broker ingestion live in the store,
//! engine, and broker crates respectively.

pub mod audit;
pub mod diff;
pub mod errors;
pub mod logging;
mod macros;
pub mod merge;
pub mod model;
pub mod policy;

// Re-export commonly used types
pub use errors::{Result, TraceportError};
pub use model::{
    AuditRecord, EventType, Identification, LifecycleCategory, OperationalSnapshot, Product,
    RoleProfile, TelemetryValue, UsageData,
};
pub use policy::{Action, Allowlist};
