use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::auth::{
    ClerkClient, IdentityError, IdentityGate, IdentityProvider, SessionVerifier,
    StaticIdentityProvider,
};
use crate::config::{CalendarSettings, Config, ConfigError, IdentityConfig};
use crate::db::{MemoryStore, PgStore, Store, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("storage setup failed: {0}")]
    Store(#[from] StoreError),

    #[error("identity client setup failed: {0}")]
    Identity(#[from] IdentityError),

    #[error("invalid session key: {0}")]
    SessionKey(#[from] jsonwebtoken::errors::Error),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub gate: IdentityGate,
    pub sessions: SessionVerifier,
    pub calendar: CalendarSettings,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        identity: Arc<dyn IdentityProvider>,
        sessions: SessionVerifier,
        calendar: CalendarSettings,
    ) -> Self {
        Self {
            store,
            gate: IdentityGate::new(identity),
            sessions,
            calendar,
        }
    }

    /// Connects the configured store and identity provider.
    pub async fn from_config(config: &Config) -> Result<Self, StartupError> {
        let store: Arc<dyn Store> = match &config.database {
            Some(database) => {
                let store = PgStore::connect(database).await?;
                store.migrate().await?;
                Arc::new(store)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory store");
                Arc::new(MemoryStore::new())
            }
        };

        let identity: Arc<dyn IdentityProvider> = match &config.identity {
            IdentityConfig::Remote {
                api_url,
                secret_key,
                timeout_secs,
            } => {
                tracing::info!(api_url = %api_url, "Using remote identity provider");
                Arc::new(ClerkClient::new(
                    api_url.clone(),
                    secret_key.clone(),
                    Duration::from_secs(*timeout_secs),
                )?)
            }
            IdentityConfig::Static { admin_ids } => {
                tracing::info!(admins = admin_ids.len(), "Using static identity provider");
                Arc::new(StaticIdentityProvider::with_admins(admin_ids.iter().cloned()))
            }
        };

        let sessions = SessionVerifier::from_key(&config.session)?;

        Ok(Self::new(store, identity, sessions, config.calendar.clone()))
    }
}
