//! Port interfaces for persisted session state
//!
//! These traits define the boundary between the session and whatever plays
//! the role of browser local storage (a JSON file, memory, a keychain).

use async_trait::async_trait;
use coursehub_domain::{CurrentUser, Result};

/// Persistence for the bearer token
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the stored token, if any
    async fn load_token(&self) -> Result<Option<String>>;

    /// Persist a token, replacing any previous one
    async fn save_token(&self, token: &str) -> Result<()>;

    /// Remove the stored token; removing a missing token is not an error
    async fn clear_token(&self) -> Result<()>;
}

/// Persistence for the current user, so role-gated behaviour survives a
/// restart
#[async_trait]
pub trait CurrentUserStore: Send + Sync {
    /// Load the stored user, if any
    async fn load_user(&self) -> Result<Option<CurrentUser>>;

    /// Persist the current user
    async fn save_user(&self, user: &CurrentUser) -> Result<()>;

    /// Remove the stored user
    async fn clear_user(&self) -> Result<()>;
}
