//! In-memory storage, for tests and ephemeral sessions

use async_trait::async_trait;
use coursehub_core::{CredentialStore, CurrentUserStore};
use coursehub_domain::{CurrentUser, Result};
use parking_lot::RwLock;

/// Volatile token and user storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    token: RwLock<Option<String>>,
    user: RwLock<Option<CurrentUser>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: RwLock::new(Some(token.into())), user: RwLock::new(None) }
    }
}

#[async_trait]
impl CredentialStore for MemoryStorage {
    async fn load_token(&self) -> Result<Option<String>> {
        Ok(self.token.read().clone())
    }

    async fn save_token(&self, token: &str) -> Result<()> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    async fn clear_token(&self) -> Result<()> {
        *self.token.write() = None;
        Ok(())
    }
}

#[async_trait]
impl CurrentUserStore for MemoryStorage {
    async fn load_user(&self) -> Result<Option<CurrentUser>> {
        Ok(self.user.read().clone())
    }

    async fn save_user(&self, user: &CurrentUser) -> Result<()> {
        *self.user.write() = Some(user.clone());
        Ok(())
    }

    async fn clear_user(&self) -> Result<()> {
        *self.user.write() = None;
        Ok(())
    }
}
