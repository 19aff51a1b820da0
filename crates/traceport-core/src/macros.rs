//! Canonical logging macros
//!
//! These macros provide a structured, consistent way to log operations.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use traceport_core::log_op_start;
/// log_op_start!("apply_operational_delta");
/// log_op_start!("apply_operational_delta", product_id = "p123");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = traceport_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = traceport_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use traceport_core::log_op_end;
/// log_op_end!("apply_operational_delta", changed = true);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = traceport_core_types::schema::EVENT_END,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = traceport_core_types::schema::EVENT_END,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// # Example
///
/// ```
/// # use traceport_core::{log_op_error, TraceportError};
/// let err = TraceportError::ProductNotFound { product_id: "p1".to_string() };
/// log_op_error!("apply_operational_delta", err);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr) => {
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = traceport_core_types::schema::EVENT_END_ERROR,
            error = %$err,
        );
    };
    ($op:expr, $err:expr, $($field:tt)*) => {
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = traceport_core_types::schema::EVENT_END_ERROR,
            error = %$err,
            $($field)*
        );
    };
}
