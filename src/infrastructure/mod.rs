//! Infrastructure module for external services.
//!
//! This module contains the storage trait, its in-memory, `PostgreSQL` and
//! Redis implementations, and the factory that selects one at startup.

pub mod factory;
pub mod in_memory;
pub mod postgres;
pub mod redis;
pub mod repository;

pub use factory::{
    ConfigurationError, FactoryError, RepositoryConfig, RepositoryConfigBuilder,
    RepositoryFactory, StorageMode,
};
pub use in_memory::InMemoryFeatureStore;
pub use postgres::PostgresFeatureStore;
pub use redis::RedisFeatureStore;
pub use repository::{FeatureStore, RepositoryError, StoreFuture};
