//! Traceport Broker - MQTT telemetry ingestion
//!
//! Subscribes to the operational-data topic tree and routes decoded
//! deltas into the engine's delta pipeline. One supervisor task owns the
//! connection; a failed connection is rebuilt after a fixed delay, and a
//! bad message is discarded with a log line, never crashing the loop.

pub mod config;
pub mod subscriber;
pub mod topic;

pub use config::BrokerConfig;
pub use subscriber::TelemetrySubscriber;
