//! Store factory for runtime backend selection.
//!
//! This module picks the `FeatureStore` implementation from environment
//! configuration, so the same binary can run against memory, `PostgreSQL`,
//! or Redis.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `postgres` | `redis`
//! - `DATABASE_URL`: `PostgreSQL` connection URL (required when `STORAGE_MODE=postgres`)
//! - `REDIS_URL`: Redis connection URL (required when `STORAGE_MODE=redis`)
//!
//! # Example
//!
//! ```ignore
//! let config = RepositoryConfig::from_env()?;
//! let store = RepositoryFactory::new(config).create().await?;
//! let features = store.list_all().await?;
//! ```

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use super::{FeatureStore, InMemoryFeatureStore, PostgresFeatureStore, RedisFeatureStore};

// =============================================================================
// Configuration Types
// =============================================================================

/// Backend used to persist features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local storage. Suitable for testing and development.
    #[default]
    InMemory,
    /// Relational storage with a separate upvotes table.
    Postgres,
    /// Key-value storage with one hash and one set per feature.
    Redis,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    /// Parses a storage mode from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidStorageMode` if the string is not recognized.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "redis" | "kv" => Ok(Self::Redis),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Configuration for the store factory.
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfig {
    /// Which backend to use.
    pub storage_mode: StorageMode,
    /// `PostgreSQL` connection URL (required when `storage_mode` is `Postgres`).
    pub database_url: Option<String>,
    /// Redis connection URL (required when `storage_mode` is `Redis`).
    pub redis_url: Option<String>,
}

impl RepositoryConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RepositoryConfigBuilder {
        RepositoryConfigBuilder::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if:
    /// - `STORAGE_MODE` contains an invalid value
    /// - the URL required by the selected mode is missing
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let storage_mode = match env::var("STORAGE_MODE") {
            Ok(value) => value.parse()?,
            Err(env::VarError::NotPresent) => StorageMode::default(),
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigurationError::InvalidStorageMode(
                    "<non-UTF-8 value>".to_string(),
                ));
            }
        };

        let config = Self {
            storage_mode,
            database_url: non_empty_var("DATABASE_URL"),
            redis_url: non_empty_var("REDIS_URL"),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the URL for the selected mode is missing.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self.storage_mode {
            StorageMode::Postgres if self.database_url.is_none() => {
                Err(ConfigurationError::MissingDatabaseUrl)
            }
            StorageMode::Redis if self.redis_url.is_none() => {
                Err(ConfigurationError::MissingRedisUrl)
            }
            _ => Ok(()),
        }
    }
}

/// Reads an environment variable, treating empty/whitespace-only as unset.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Builder for `RepositoryConfig`.
///
/// # Example
///
/// ```
/// use feature_board::infrastructure::{RepositoryConfig, StorageMode};
///
/// let config = RepositoryConfig::builder()
///     .storage_mode(StorageMode::Redis)
///     .redis_url("redis://localhost:6379")
///     .build()
///     .unwrap();
/// assert_eq!(config.storage_mode, StorageMode::Redis);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfigBuilder {
    storage_mode: StorageMode,
    database_url: Option<String>,
    redis_url: Option<String>,
}

impl RepositoryConfigBuilder {
    /// Sets the storage mode.
    #[must_use]
    pub const fn storage_mode(mut self, mode: StorageMode) -> Self {
        self.storage_mode = mode;
        self
    }

    /// Sets the `PostgreSQL` database URL.
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Sets the Redis URL.
    #[must_use]
    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = Some(url.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid.
    pub fn build(self) -> Result<RepositoryConfig, ConfigurationError> {
        let config = RepositoryConfig {
            storage_mode: self.storage_mode,
            database_url: self.database_url,
            redis_url: self.redis_url,
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid storage mode value.
    #[error("Invalid storage mode: '{0}'. Expected 'in_memory', 'postgres' or 'redis'")]
    InvalidStorageMode(String),

    /// Missing `DATABASE_URL` when storage mode is Postgres.
    #[error("DATABASE_URL environment variable is required when STORAGE_MODE=postgres")]
    MissingDatabaseUrl,

    /// Missing `REDIS_URL` when storage mode is Redis.
    #[error("REDIS_URL environment variable is required when STORAGE_MODE=redis")]
    MissingRedisUrl,
}

/// Errors that can occur during factory initialization.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    DatabaseConnection(String),

    /// Redis connection error.
    #[error("Redis connection error: {0}")]
    RedisConnection(String),
}

// =============================================================================
// Repository Factory
// =============================================================================

/// Factory for creating the configured `FeatureStore`.
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    config: RepositoryConfig,
}

impl RepositoryFactory {
    /// Creates a new factory with the given configuration.
    #[must_use]
    pub const fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    /// Creates the store selected by the configuration.
    ///
    /// For `PostgreSQL` this also creates the schema if it is missing.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError` if the backend cannot be reached or prepared.
    pub async fn create(&self) -> Result<Arc<dyn FeatureStore>, FactoryError> {
        match self.config.storage_mode {
            StorageMode::InMemory => Ok(Arc::new(InMemoryFeatureStore::new())),
            StorageMode::Postgres => {
                let pool = self.create_postgres_pool().await?;
                let store = PostgresFeatureStore::new(pool);
                store
                    .ensure_schema()
                    .await
                    .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))?;
                Ok(Arc::new(store))
            }
            StorageMode::Redis => {
                let redis_url = self
                    .config
                    .redis_url
                    .as_ref()
                    .ok_or(ConfigurationError::MissingRedisUrl)?;
                let store = RedisFeatureStore::from_url(redis_url)
                    .map_err(|error| FactoryError::RedisConnection(error.to_string()))?;
                Ok(Arc::new(store))
            }
        }
    }

    /// Creates a `PostgreSQL` connection pool.
    async fn create_postgres_pool(&self) -> Result<PgPool, FactoryError> {
        let database_url = self
            .config
            .database_url
            .as_ref()
            .ok_or(ConfigurationError::MissingDatabaseUrl)?;

        PgPool::connect(database_url)
            .await
            .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================
