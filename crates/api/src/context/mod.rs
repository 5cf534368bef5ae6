//! Application context - dependency injection container

use std::sync::Arc;

use coursehub_core::{DashboardAggregator, Session};
use coursehub_domain::{ClientConfig, Result};
use coursehub_infra::{config, ApiClient, LocalStorage};
use tracing::info;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: ClientConfig,
    pub storage: Arc<LocalStorage>,
    pub session: Arc<Session>,
    pub api: Arc<ApiClient>,
    pub dashboard: DashboardAggregator,
}

impl AppContext {
    /// Build the context from environment or config file.
    ///
    /// A missing base URL is fatal.
    pub async fn new() -> Result<Self> {
        let config = config::load()?;
        Self::from_config(config).await
    }

    /// Build the context from an explicit configuration and restore the
    /// persisted session.
    pub async fn from_config(config: ClientConfig) -> Result<Self> {
        let storage = Arc::new(LocalStorage::new(&config.storage.path));
        let session = Arc::new(Session::new(storage.clone(), storage.clone()));
        session.initialize().await?;

        let api = Arc::new(ApiClient::new(&config, session.clone())?);

        info!(
            base_url = %config.base_url,
            storage = %config.storage.path.display(),
            authenticated = session.is_authenticated(),
            "application context ready"
        );

        Ok(Self { config, storage, session, api, dashboard: DashboardAggregator::new() })
    }
}
