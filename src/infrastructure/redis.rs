//! Redis feature store.
//!
//! This module provides a key-value implementation of `FeatureStore` using
//! `deadpool-redis` for connection pooling. Multi-key writes run as Lua
//! scripts so each operation stays atomic on the server.
//!
//! # Key Design
//!
//! - Feature: `item:{id}` -> HASH (`id`, `title`, `created_at`)
//! - Upvote ledger: `upvotes:{id}` -> SET of upvote ids
//! - Feature index: `items:index` -> ZSET (score = creation time in ms)

use std::collections::HashMap;

use deadpool_redis::{Config, Pool, Runtime};
use futures::FutureExt;
use redis::AsyncCommands;

use crate::domain::{Feature, FeatureId, Timestamp, UpvoteId};
use crate::infrastructure::{FeatureStore, RepositoryError, StoreFuture};

// =============================================================================
// Redis Key Constants
// =============================================================================

/// Prefix for feature hashes.
const FEATURE_KEY_PREFIX: &str = "item:";

/// Prefix for upvote sets. Kept apart from `item:` so no feature id can
/// produce another feature's ledger key.
const UPVOTES_KEY_PREFIX: &str = "upvotes:";

/// Key for the feature index (sorted set).
const FEATURE_INDEX_KEY: &str = "items:index";

/// Inserts the hash only when the key is absent and indexes it.
/// Returns 1 when inserted, 0 when the id was taken.
const CREATE_SCRIPT: &str = r"
local key = KEYS[1]
local index_key = KEYS[2]
if redis.call('EXISTS', key) == 1 then
    return 0
end
redis.call('HSET', key, 'id', ARGV[1], 'title', ARGV[2], 'created_at', ARGV[3])
redis.call('ZADD', index_key, ARGV[4], ARGV[1])
return 1
";

/// Adds an upvote id to the ledger of an existing feature.
/// Returns -1 when the feature is missing, otherwise the SADD result.
const UPVOTE_SCRIPT: &str = r"
local key = KEYS[1]
local upvotes_key = KEYS[2]
if redis.call('EXISTS', key) == 0 then
    return -1
end
return redis.call('SADD', upvotes_key, ARGV[1])
";

/// Removes the feature, its ledger and its index entry.
/// Returns 1 = deleted, 0 = not found.
const DELETE_SCRIPT: &str = r"
local key = KEYS[1]
local upvotes_key = KEYS[2]
local index_key = KEYS[3]
local deleted = redis.call('DEL', key)
if deleted == 1 then
    redis.call('DEL', upvotes_key)
    redis.call('ZREM', index_key, ARGV[1])
    return 1
end
return 0
";

// =============================================================================
// Helper Functions
// =============================================================================

/// Generates the hash key for a feature.
fn feature_key(id: &FeatureId) -> String {
    format!("{FEATURE_KEY_PREFIX}{id}")
}

/// Generates the upvote set key for a feature.
fn upvotes_key(id: &FeatureId) -> String {
    format!("{UPVOTES_KEY_PREFIX}{id}")
}

/// Converts a timestamp to a score for the index.
#[allow(clippy::cast_precision_loss)]
fn timestamp_to_score(timestamp: &Timestamp) -> f64 {
    timestamp.timestamp_millis() as f64
}

fn cache_error(error: &impl std::fmt::Display) -> RepositoryError {
    RepositoryError::CacheError(error.to_string())
}

/// Rebuilds a feature from its hash fields and upvote set.
///
/// An empty hash means the key does not exist.
fn hash_to_feature(
    mut fields: HashMap<String, String>,
    upvotes: Vec<String>,
) -> Result<Option<Feature>, RepositoryError> {
    if fields.is_empty() {
        return Ok(None);
    }

    let mut take = |name: &str| {
        fields.remove(name).ok_or_else(|| {
            RepositoryError::SerializationError(format!("feature hash is missing '{name}'"))
        })
    };

    let id = take("id")?;
    let title = take("title")?;
    let created_at = take("created_at")?;
    let created_at = Timestamp::parse_rfc3339(&created_at).ok_or_else(|| {
        RepositoryError::SerializationError(format!("invalid created_at '{created_at}'"))
    })?;

    let feature = Feature::new(FeatureId::new(id), title, created_at)
        .with_upvotes(upvotes.into_iter().map(UpvoteId::new).collect());
    Ok(Some(feature))
}

// =============================================================================
// Redis Feature Store
// =============================================================================

/// Redis implementation of `FeatureStore`.
///
/// # Example
///
/// ```ignore
/// let store = RedisFeatureStore::from_url("redis://localhost:6379")?;
/// store.create(&feature).await?;
/// let features = store.list_all().await?;
/// ```
#[derive(Debug, Clone)]
pub struct RedisFeatureStore {
    pool: Pool,
}

impl RedisFeatureStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates a new store from a Redis URL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::CacheError` if the pool cannot be created.
    pub fn from_url(redis_url: &str) -> Result<Self, RepositoryError> {
        let config = Config::from_url(redis_url);
        let pool = config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|error| cache_error(&error))?;
        Ok(Self { pool })
    }
}

#[allow(clippy::significant_drop_tightening)]
impl FeatureStore for RedisFeatureStore {
    fn create(&self, feature: &Feature) -> StoreFuture<bool> {
        let pool = self.pool.clone();
        let key = feature_key(&feature.feature_id);
        let id = feature.feature_id.to_string();
        let title = feature.title.clone();
        let created_at = feature.created_at.to_rfc3339();
        let score = timestamp_to_score(&feature.created_at);

        async move {
            let mut connection = pool.get().await.map_err(|error| cache_error(&error))?;

            let inserted: i64 = redis::Script::new(CREATE_SCRIPT)
                .key(&key)
                .key(FEATURE_INDEX_KEY)
                .arg(&id)
                .arg(&title)
                .arg(&created_at)
                .arg(score)
                .invoke_async(&mut *connection)
                .await
                .map_err(|error| cache_error(&error))?;

            Ok(inserted == 1)
        }
        .boxed()
    }

    fn upsert_or_increment(&self, id: &FeatureId, upvote_id: &UpvoteId) -> StoreFuture<bool> {
        let pool = self.pool.clone();
        let feature_id = id.clone();
        let upvote_id = upvote_id.to_string();

        async move {
            let mut connection = pool.get().await.map_err(|error| cache_error(&error))?;

            let added: i64 = redis::Script::new(UPVOTE_SCRIPT)
                .key(feature_key(&feature_id))
                .key(upvotes_key(&feature_id))
                .arg(&upvote_id)
                .invoke_async(&mut *connection)
                .await
                .map_err(|error| cache_error(&error))?;

            match added {
                -1 => Err(RepositoryError::feature_not_found(&feature_id)),
                added => Ok(added == 1),
            }
        }
        .boxed()
    }

    fn delete(&self, id: &FeatureId) -> StoreFuture<bool> {
        let pool = self.pool.clone();
        let id = id.clone();

        async move {
            let mut connection = pool.get().await.map_err(|error| cache_error(&error))?;

            let deleted: i64 = redis::Script::new(DELETE_SCRIPT)
                .key(feature_key(&id))
                .key(upvotes_key(&id))
                .key(FEATURE_INDEX_KEY)
                .arg(id.as_str())
                .invoke_async(&mut *connection)
                .await
                .map_err(|error| cache_error(&error))?;

            Ok(deleted == 1)
        }
        .boxed()
    }

    fn find_by_id(&self, id: &FeatureId) -> StoreFuture<Option<Feature>> {
        let pool = self.pool.clone();
        let id = id.clone();

        async move {
            let mut connection = pool.get().await.map_err(|error| cache_error(&error))?;

            let (fields, upvotes): (HashMap<String, String>, Vec<String>) = redis::pipe()
                .hgetall(feature_key(&id))
                .smembers(upvotes_key(&id))
                .query_async(&mut *connection)
                .await
                .map_err(|error| cache_error(&error))?;

            hash_to_feature(fields, upvotes)
        }
        .boxed()
    }

    fn list_all(&self) -> StoreFuture<Vec<Feature>> {
        let pool = self.pool.clone();

        async move {
            let mut connection = pool.get().await.map_err(|error| cache_error(&error))?;

            let ids: Vec<String> = connection
                .zrange(FEATURE_INDEX_KEY, 0, -1)
                .await
                .map_err(|error| cache_error(&error))?;

            if ids.is_empty() {
                return Ok(Vec::new());
            }

            let ids: Vec<FeatureId> = ids.into_iter().map(FeatureId::new).collect();

            let mut hashes = redis::pipe();
            let mut ledgers = redis::pipe();
            for id in &ids {
                hashes.hgetall(feature_key(id));
                ledgers.smembers(upvotes_key(id));
            }

            let fields: Vec<HashMap<String, String>> = hashes
                .query_async(&mut *connection)
                .await
                .map_err(|error| cache_error(&error))?;
            let upvotes: Vec<Vec<String>> = ledgers
                .query_async(&mut *connection)
                .await
                .map_err(|error| cache_error(&error))?;

            // A feature deleted between the index read and the hash read
            // comes back as an empty hash and is skipped.
            let mut features = Vec::with_capacity(fields.len());
            for (fields, upvotes) in fields.into_iter().zip(upvotes) {
                if let Some(feature) = hash_to_feature(fields, upvotes)? {
                    features.push(feature);
                }
            }
            Ok(features)
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================
