//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Entity identifiers
pub const FIELD_PRODUCT_ID: &str = "product_id";
pub const FIELD_AUDIT_ID: &str = "audit_id";
pub const FIELD_ACTOR_ID: &str = "actor_id";

// Broker fields
pub const FIELD_TOPIC: &str = "topic";
pub const FIELD_PAYLOAD_BYTES: &str = "payload_bytes";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_DISCARD: &str = "discard";
pub const EVENT_RECONNECT: &str = "reconnect";
