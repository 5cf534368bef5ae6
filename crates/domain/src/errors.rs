//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Status code reported for failures where no HTTP response was received.
pub const NO_RESPONSE_STATUS: u16 = 0;

/// Status classes used by callers to branch on an [`ApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCategory {
    /// No response was received (connectivity failure) - retryable
    Transport,
    /// The caller cancelled the request
    Aborted,
    /// 401 - credentials missing, expired or rejected
    Authentication,
    /// 403 - authenticated but not allowed
    Authorization,
    /// 404
    NotFound,
    /// 5xx
    Server,
    /// Any other non-success status (validation failures and the like)
    Rejected,
    /// Success status, but the body did not decode into the expected shape
    InvalidResponse,
    /// Local failure before or after the exchange (storage, URL, encoding)
    Internal,
}

/// Typed error returned by every API client operation.
///
/// Each variant corresponds to one status class. `details` carries the raw
/// backend payload (or transport diagnostics) for passthrough only; callers
/// should branch on the variant or on [`ApiError::status`].
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiError {
    #[error("{message}")]
    Transport {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },

    #[error("Request aborted")]
    Aborted,

    #[error("Authentication failed: {message}")]
    Unauthorized {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },

    #[error("Permission denied: {message}")]
    Forbidden {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },

    #[error("Resource not found: {message}")]
    NotFound {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },

    #[error("Server error ({status}): {message}")]
    Server {
        status: u16,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },

    #[error("{message}")]
    Rejected {
        status: u16,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },

    #[error("Invalid response ({status}): {message}")]
    InvalidResponse { status: u16, message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ApiError {
    /// Build the error matching a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>, details: Option<Value>) -> Self {
        let message = message.into();
        match status {
            401 => Self::Unauthorized { message, details },
            403 => Self::Forbidden { message, details },
            404 => Self::NotFound { message, details },
            s if s >= 500 => Self::Server { status: s, message, details },
            s => Self::Rejected { status: s, message, details },
        }
    }

    /// HTTP status carried by this error (0 when no response was received)
    pub fn status(&self) -> u16 {
        match self {
            Self::Unauthorized { .. } => 401,
            Self::Forbidden { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::Server { status, .. }
            | Self::Rejected { status, .. }
            | Self::InvalidResponse { status, .. } => *status,
            Self::Transport { .. } | Self::Aborted | Self::Internal { .. } => NO_RESPONSE_STATUS,
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Transport { .. } => ApiErrorCategory::Transport,
            Self::Aborted => ApiErrorCategory::Aborted,
            Self::Unauthorized { .. } => ApiErrorCategory::Authentication,
            Self::Forbidden { .. } => ApiErrorCategory::Authorization,
            Self::NotFound { .. } => ApiErrorCategory::NotFound,
            Self::Server { .. } => ApiErrorCategory::Server,
            Self::Rejected { .. } => ApiErrorCategory::Rejected,
            Self::InvalidResponse { .. } => ApiErrorCategory::InvalidResponse,
            Self::Internal { .. } => ApiErrorCategory::Internal,
        }
    }

    /// Only transport failures are retried; a rejected request may already
    /// have had side effects on the server.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Human-readable message without the variant prefix
    pub fn message(&self) -> String {
        match self {
            Self::Transport { message, .. }
            | Self::Unauthorized { message, .. }
            | Self::Forbidden { message, .. }
            | Self::NotFound { message, .. }
            | Self::Server { message, .. }
            | Self::Rejected { message, .. }
            | Self::InvalidResponse { message, .. }
            | Self::Internal { message } => message.clone(),
            Self::Aborted => "Request aborted".to_string(),
        }
    }

    /// Raw payload attached to the error, if any
    pub fn details(&self) -> Option<&Value> {
        match self {
            Self::Transport { details, .. }
            | Self::Unauthorized { details, .. }
            | Self::Forbidden { details, .. }
            | Self::NotFound { details, .. }
            | Self::Server { details, .. }
            | Self::Rejected { details, .. } => details.as_ref(),
            Self::Aborted | Self::InvalidResponse { .. } | Self::Internal { .. } => None,
        }
    }
}

/// Main application error type for CourseHub
#[derive(Error, Debug)]
pub enum CourseHubError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CourseHubError> for ApiError {
    fn from(err: CourseHubError) -> Self {
        match err {
            CourseHubError::Api(inner) => inner,
            other => Self::Internal { message: other.to_string() },
        }
    }
}

/// Result type alias for CourseHub operations
pub type Result<T> = std::result::Result<T, CourseHubError>;
