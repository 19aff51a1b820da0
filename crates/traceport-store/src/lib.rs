//! Traceport Store - SQLite persistence layer
//!
//! Provides:
//! - SQLite schema with an embedded, checksummed migration framework
//! - Product repository (JSON aggregate body plus indexed columns)
//! - Append-only audit ledger repository
//! - Account repository resolving identities to role profiles

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

pub use errors::Result;
