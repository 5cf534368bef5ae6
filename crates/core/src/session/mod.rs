//! Authenticated session state
//!
//! Holds the bearer token and the current user in memory, backed by the
//! injected stores so both survive a restart. Every outbound request reads
//! the token from here; login, logout and authentication failures write it.

pub mod ports;

use std::sync::Arc;

use coursehub_domain::{ApiError, CurrentUser, Result};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::recovery::RecoveryAction;
use ports::{CredentialStore, CurrentUserStore};

/// Credential and current-user context shared by the client and callers
pub struct Session {
    credentials: Arc<dyn CredentialStore>,
    users: Arc<dyn CurrentUserStore>,
    token: RwLock<Option<String>>,
    user: RwLock<Option<CurrentUser>>,
}

impl Session {
    pub fn new(credentials: Arc<dyn CredentialStore>, users: Arc<dyn CurrentUserStore>) -> Self {
        Self { credentials, users, token: RwLock::new(None), user: RwLock::new(None) }
    }

    /// Load the persisted token and user into memory.
    ///
    /// Call once at startup; a session that was never initialized behaves
    /// as logged out.
    pub async fn initialize(&self) -> Result<()> {
        let token = self.credentials.load_token().await?;
        let user = self.users.load_user().await?;

        debug!(has_token = token.is_some(), has_user = user.is_some(), "session loaded");

        *self.token.write() = token;
        *self.user.write() = user;
        Ok(())
    }

    /// Current bearer token, if any
    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().is_some()
    }

    /// Persist a freshly issued token
    pub async fn store_token(&self, token: &str) -> Result<()> {
        self.credentials.save_token(token).await?;
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.user.read().clone()
    }

    pub async fn set_current_user(&self, user: CurrentUser) -> Result<()> {
        self.users.save_user(&user).await?;
        *self.user.write() = Some(user);
        Ok(())
    }

    /// Drop the token and the current user, in memory and in storage.
    ///
    /// Memory is cleared even when a store fails, so no further request
    /// carries the discarded token.
    pub async fn clear(&self) -> Result<()> {
        *self.token.write() = None;
        *self.user.write() = None;

        let token_result = self.credentials.clear_token().await;
        let user_result = self.users.clear_user().await;
        token_result?;
        user_result?;

        info!("session cleared");
        Ok(())
    }

    /// Decide how the caller should react to `error`, clearing the session
    /// when the credential was rejected.
    pub async fn handle_error(&self, error: &ApiError) -> RecoveryAction {
        let action = RecoveryAction::for_error(error);
        if action.clears_session() {
            if let Err(e) = self.clear().await {
                warn!(error = %e, "failed to clear session after authentication error");
            }
        }
        action
    }
}
