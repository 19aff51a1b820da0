//! Traceport Engine - Orchestration layer
//!
//! Provides high-level command orchestration that coordinates between
//! core domain logic and the persistence layer: the telemetry delta
//! pipeline, guarded product operations, and the audit writer.

pub mod commands;
