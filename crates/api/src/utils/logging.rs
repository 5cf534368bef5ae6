use std::time::Duration;

use coursehub_domain::{ApiError, CourseHubError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable switching log output to JSON lines
pub const LOG_JSON_ENV: &str = "COURSEHUB_LOG_JSON";

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG` (default `info`). Logs go to stderr so command output
/// on stdout stays machine-readable.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    let result = if json { builder.json().try_init() } else { builder.try_init() };
    if let Err(err) = result {
        warn!(error = %err, "tracing subscriber already installed");
    }
}

/// Whether JSON logging was requested through the environment
pub fn json_logging_requested() -> bool {
    std::env::var(LOG_JSON_ENV)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Log the outcome of a command execution with structured fields.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(
    command: &str,
    elapsed: Duration,
    success: bool,
    error_type: Option<&str>,
) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    if success {
        info!(command, duration_ms, "command_execution_success");
    } else {
        warn!(command, duration_ms, error_type, "command_execution_failure");
    }
}

/// Convert a `CourseHubError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &CourseHubError) -> &'static str {
    match error {
        CourseHubError::Config(_) => "config",
        CourseHubError::Storage(_) => "storage",
        CourseHubError::Api(api) => api_error_label(api),
        CourseHubError::InvalidInput(_) => "invalid_input",
        CourseHubError::Internal(_) => "internal",
    }
}

#[inline]
pub fn api_error_label(error: &ApiError) -> &'static str {
    match error {
        ApiError::Transport { .. } => "network",
        ApiError::Aborted => "aborted",
        ApiError::Unauthorized { .. } => "unauthorized",
        ApiError::Forbidden { .. } => "forbidden",
        ApiError::NotFound { .. } => "not_found",
        ApiError::Server { .. } => "server",
        ApiError::Rejected { .. } => "rejected",
        ApiError::InvalidResponse { .. } => "invalid_response",
        ApiError::Internal { .. } => "internal",
    }
}
