//! File-backed key/value storage
//!
//! One JSON object per file, standing in for browser local storage. The
//! bearer token lives under `token`, the current user under `user-storage`
//! in the `{ "state": { "user": .. }, "version": 0 }` envelope.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use coursehub_core::{CredentialStore, CurrentUserStore};
use coursehub_domain::constants::{TOKEN_STORAGE_KEY, USER_STORAGE_KEY};
use coursehub_domain::{CourseHubError, CurrentUser, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::errors::InfraError;

type Document = Map<String, Value>;

/// Persisted envelope of the current user
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedUser {
    state: UserState,
    #[serde(default)]
    version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserState {
    user: Option<CurrentUser>,
}

/// JSON file storage
pub struct LocalStorage {
    path: PathBuf,
    // serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a raw value
    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut document = self.read_document().await?;
        Ok(document.remove(key))
    }

    /// Write a raw value
    pub async fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        document.insert(key.to_string(), value);
        self.write_document(&document).await
    }

    /// Remove a key; missing keys are ignored
    pub async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        if document.remove(key).is_some() {
            self.write_document(&document).await?;
        }
        Ok(())
    }

    async fn read_document(&self) -> Result<Document> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(InfraError::from(e).into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::new());
        }

        match serde_json::from_slice::<Value>(&bytes).map_err(InfraError::from)? {
            Value::Object(map) => Ok(map),
            other => Err(CourseHubError::Storage(format!(
                "{} must hold a JSON object, found {}",
                self.path.display(),
                json_kind(&other)
            ))),
        }
    }

    #[instrument(skip(self, document), fields(path = %self.path.display()))]
    async fn write_document(&self, document: &Document) -> Result<()> {
        let data = serde_json::to_vec_pretty(document).map_err(InfraError::from)?;

        // Write to temporary file first for atomicity
        let temp_path = self.path.with_extension("tmp");
        if let Some(parent) = temp_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(InfraError::from)?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .await
            .map_err(InfraError::from)?;
        file.write_all(&data).await.map_err(InfraError::from)?;
        file.sync_all().await.map_err(InfraError::from)?;
        drop(file);

        fs::rename(&temp_path, &self.path).await.map_err(InfraError::from)?;
        debug!(keys = document.len(), bytes = data.len(), "storage persisted");
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl CredentialStore for LocalStorage {
    async fn load_token(&self) -> Result<Option<String>> {
        match self.get(TOKEN_STORAGE_KEY).await? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(token)) if token.is_empty() => Ok(None),
            Some(Value::String(token)) => Ok(Some(token)),
            Some(other) => Err(CourseHubError::Storage(format!(
                "stored token must be a string, found {}",
                json_kind(&other)
            ))),
        }
    }

    async fn save_token(&self, token: &str) -> Result<()> {
        self.set(TOKEN_STORAGE_KEY, Value::String(token.to_string())).await
    }

    async fn clear_token(&self) -> Result<()> {
        self.remove(TOKEN_STORAGE_KEY).await
    }
}

#[async_trait]
impl CurrentUserStore for LocalStorage {
    async fn load_user(&self) -> Result<Option<CurrentUser>> {
        let Some(value) = self.get(USER_STORAGE_KEY).await? else {
            return Ok(None);
        };
        let persisted: PersistedUser = serde_json::from_value(value).map_err(InfraError::from)?;
        Ok(persisted.state.user)
    }

    async fn save_user(&self, user: &CurrentUser) -> Result<()> {
        let persisted = PersistedUser { state: UserState { user: Some(user.clone()) }, version: 0 };
        let value = serde_json::to_value(&persisted).map_err(InfraError::from)?;
        self.set(USER_STORAGE_KEY, value).await
    }

    async fn clear_user(&self) -> Result<()> {
        let persisted = PersistedUser { state: UserState { user: None }, version: 0 };
        let value = serde_json::to_value(&persisted).map_err(InfraError::from)?;
        self.set(USER_STORAGE_KEY, value).await
    }
}
