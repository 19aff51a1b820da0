use thiserror::Error;

/// Result type alias using TraceportError
pub type Result<T> = std::result::Result<T, TraceportError>;

/// Error taxonomy for Traceport operations
///
/// Transport and message-format errors are contained inside the telemetry
/// subscriber loop and never reach callers; precondition errors from the
/// audit builder propagate to whichever operation invoked it. Authorization
/// denials are NOT errors at the policy layer (the policy returns plain
/// booleans) - `Forbidden` is raised only by the engine boundary when a
/// guarded operation is attempted without the required capability.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraceportError {
    // ===== Lookup =====
    /// Product not found in the repository
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Account not found in the repository
    #[error("Account not found: {account_id}")]
    AccountNotFound { account_id: String },

    // ===== Audit preconditions =====
    /// previous_data is required for update/delete/relation_change/lifecycle_event
    #[error("previous_data is required for event type '{event_type}'")]
    MissingPreviousData { event_type: String },

    /// new_data is required for create/update/relation_change/lifecycle_event
    #[error("new_data is required for event type '{event_type}'")]
    MissingNewData { event_type: String },

    // ===== Broker message handling =====
    /// Topic does not match <namespace>/operational_data/<productId>
    #[error("Invalid telemetry topic: {topic}")]
    InvalidTopic { topic: String },

    /// Payload is not a JSON object of telemetry fields
    #[error("Invalid telemetry payload: {reason}")]
    InvalidPayload { reason: String },

    /// Broker connect or receive failure (retried by the subscriber loop)
    #[error("Broker transport failure: {message}")]
    Transport { message: String },

    // ===== Authorization =====
    /// Guarded operation attempted without the required capability
    #[error("Operation '{action}' denied for actor {actor_id}")]
    Forbidden { action: String, actor_id: String },

    // ===== Generic =====
    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Persistence error (database layer)
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Conversion from serde_json::Error to TraceportError
impl From<serde_json::Error> for TraceportError {
    fn from(err: serde_json::Error) -> Self {
        TraceportError::Serialization {
            message: err.to_string(),
        }
    }
}
