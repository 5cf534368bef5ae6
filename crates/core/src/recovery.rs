//! What a caller should do about a failed request

use coursehub_domain::constants::LOGIN_ROUTE;
use coursehub_domain::ApiError;
use serde::Serialize;

/// Caller-side reaction to an [`ApiError`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RecoveryAction {
    /// Credential rejected: discard it and send the user to the login page
    RedirectToLogin { path: String },
    /// Authenticated but not allowed
    PermissionDenied,
    NotFound,
    /// Nothing reached the server
    CheckConnection,
    /// The caller cancelled the request itself
    Ignore,
    /// Show the error message to the user
    ShowMessage { message: String },
}

impl RecoveryAction {
    pub fn for_error(error: &ApiError) -> Self {
        match error {
            ApiError::Unauthorized { .. } => Self::RedirectToLogin { path: LOGIN_ROUTE.to_string() },
            ApiError::Forbidden { .. } => Self::PermissionDenied,
            ApiError::NotFound { .. } => Self::NotFound,
            ApiError::Transport { .. } => Self::CheckConnection,
            ApiError::Aborted => Self::Ignore,
            other => Self::ShowMessage { message: other.message() },
        }
    }

    /// Whether the stored token and user must be dropped
    pub fn clears_session(&self) -> bool {
        matches!(self, Self::RedirectToLogin { .. })
    }
}
