//! Canonical logging macros
//!
//! These macros provide a structured, consistent way to log operation
//! boundaries. Callers must depend on `chartx-core-types` for the event names.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use chartx_core::log_op_start;
/// log_op_start!("reconcile");
/// log_op_start!("reconcile", operation_id = "0190c8f2-0000-7000-8000-000000000000");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = chartx_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = chartx_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use chartx_core::log_op_end;
/// log_op_end!("reconcile", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = chartx_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = chartx_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// The error expression is cloned, so it can be logged and then returned.
///
/// # Example
///
/// ```
/// # use chartx_core::log_op_error;
/// # use chartx_core::errors::ChartXError;
/// let err = ChartXError::MissingEmail;
/// log_op_error!("reconcile", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let cx_err: $crate::errors::CxError = ($err).clone().into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = chartx_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?cx_err.kind(),
            err_code = cx_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let cx_err: $crate::errors::CxError = ($err).clone().into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = chartx_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?cx_err.kind(),
            err_code = cx_err.code(),
            $($field)*
        );
    }};
}
