//! Conversions from external infrastructure errors into domain errors.

use coursehub_domain::{ApiError, CourseHubError};
use reqwest::Error as HttpError;
use serde_json::json;
use thiserror::Error;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct InfraError(pub CourseHubError);

impl From<InfraError> for CourseHubError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CourseHubError> for InfraError {
    fn from(value: CourseHubError) -> Self {
        Self(value)
    }
}

/// No HTTP response was received: the connection failed, timed out, or the
/// request never made it onto the wire.
pub fn is_transport_failure(err: &HttpError) -> bool {
    err.is_connect() || err.is_timeout() || err.is_request()
}

/// Diagnostics attached to transport errors as `details`
pub fn transport_details(err: &HttpError) -> serde_json::Value {
    json!({
        "error": err.to_string(),
        "connect": err.is_connect(),
        "timeout": err.is_timeout(),
    })
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ApiError */
/* -------------------------------------------------------------------------- */

/// Classify a reqwest failure as a client-facing error
pub fn api_error(err: HttpError) -> ApiError {
    if is_transport_failure(&err) {
        return ApiError::Transport {
            message: format!("http transport error: {err}"),
            details: Some(transport_details(&err)),
        };
    }

    if let Some(status) = err.status() {
        return ApiError::from_status(status.as_u16(), err.to_string(), None);
    }

    if err.is_decode() || err.is_body() {
        return ApiError::InvalidResponse { status: 0, message: err.to_string() };
    }

    ApiError::Internal { message: format!("http client error: {err}") }
}

impl From<HttpError> for InfraError {
    fn from(err: HttpError) -> Self {
        Self(CourseHubError::Api(api_error(err)))
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error / serde_json::Error → CourseHubError */
/* -------------------------------------------------------------------------- */

impl From<std::io::Error> for InfraError {
    fn from(err: std::io::Error) -> Self {
        Self(CourseHubError::Storage(format!("io error ({:?}): {err}", err.kind())))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(err: serde_json::Error) -> Self {
        Self(CourseHubError::Storage(format!("invalid stored JSON: {err}")))
    }
}
