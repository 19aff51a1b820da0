//! Command orchestration layer.
//!
//! Provides high-level command functions that coordinate between
//! core domain logic and the persistence layer.

pub mod audit_writer;
pub mod delta_merge;
pub mod product_ops;
