//! Core AvailIt functionality
//!
//! `AvailIt` owns the connection pool and a named registry of stores.

use sqlx::postgres::PgConnectOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::Duration;
use store_object::{GenericRecordStore, PgStore, TableMetadata};

use crate::errors::AvailItError;
use config::{AppConfig, DatabaseConfig, PagingConfig};

/// Connection settings for `config`. Credentials are passed as fields, never
/// spliced into a URL, so they need no escaping.
fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.username)
        .password(&config.password)
        .database(&config.database)
}

/// Coordinator that manages the database connection and the registered stores
pub struct AvailIt {
    pool: PgPool,
    paging: PagingConfig,
    stores: HashMap<String, Box<dyn std::any::Any + Send + Sync>>,
}

impl std::fmt::Debug for AvailIt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailIt")
            .field("paging", &self.paging)
            .field("stores", &self.stores.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AvailIt {
    /// Connect with the default paging limits
    pub async fn new(config: DatabaseConfig) -> Result<Self, AvailItError> {
        Self::connect(config, PagingConfig::default()).await
    }

    /// Connect using a loaded application configuration
    pub async fn from_config(config: AppConfig) -> Result<Self, AvailItError> {
        Self::connect(config.database, config.paging).await
    }

    async fn connect(config: DatabaseConfig, paging: PagingConfig) -> Result<Self, AvailItError> {
        let mut pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        let pool = pool_options.connect_with(connect_options(&config)).await?;
        tracing::info!(
            host = %config.host,
            database = %config.database,
            max_connections = config.max_connections,
            "connected to PostgreSQL"
        );

        Ok(Self::with_pool(pool, paging))
    }

    /// Wrap an existing pool
    pub fn with_pool(pool: PgPool, paging: PagingConfig) -> Self {
        Self {
            pool,
            paging,
            stores: HashMap::new(),
        }
    }

    /// Get database pool reference
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Paging limits for requests built from caller-supplied parameters
    pub fn paging(&self) -> &PagingConfig {
        &self.paging
    }

    /// A PostgreSQL store for `T` sharing this pool
    pub fn store<T: TableMetadata>(&self) -> PgStore<T> {
        PgStore::new(self.pool.clone())
    }

    /// Register a store under a name
    pub fn register_store<S>(&mut self, name: String, store: S) -> Result<(), AvailItError>
    where
        S: GenericRecordStore + 'static,
    {
        if self.stores.contains_key(&name) {
            return Err(AvailItError::StoreAlreadyRegistered(name));
        }

        crate::debug_log!("registering store '{}'", name);
        self.stores.insert(name, Box::new(store));
        Ok(())
    }

    /// Get a registered store by name and type
    pub fn get_store<S>(&self, name: &str) -> Result<&S, AvailItError>
    where
        S: GenericRecordStore + 'static,
    {
        self.stores
            .get(name)
            .and_then(|store| store.downcast_ref::<S>())
            .ok_or_else(|| AvailItError::StoreNotFound(name.to_string()))
    }

    /// Get a mutable reference to a registered store
    pub fn get_store_mut<S>(&mut self, name: &str) -> Result<&mut S, AvailItError>
    where
        S: GenericRecordStore + 'static,
    {
        self.stores
            .get_mut(name)
            .and_then(|store| store.downcast_mut::<S>())
            .ok_or_else(|| AvailItError::StoreNotFound(name.to_string()))
    }

    /// List all registered store names
    pub fn list_stores(&self) -> Vec<&String> {
        self.stores.keys().collect()
    }

    /// Remove a store by name
    pub fn unregister_store(&mut self, name: &str) -> Result<(), AvailItError> {
        self.stores
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| AvailItError::StoreNotFound(name.to_string()))
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), AvailItError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
