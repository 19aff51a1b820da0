//! Core types shared across Traceport facilities
//!
//! This crate provides foundational types used by the domain, persistence,
//! and ingestion layers:
//!
//! - **Correlation types**: RequestId for tying audit records and log lines
//!   to the request or broker message that caused them
//! - **Schema constants**: Canonical field keys and event names for
//!   structured logging

pub mod correlation;
pub mod schema;

pub use correlation::RequestId;
