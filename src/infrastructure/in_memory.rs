//! In-memory feature store.
//!
//! Suitable for tests, local development, and as the default backend when no
//! external store is configured.
//!
//! # Features
//!
//! - Thread-safe with `Arc<RwLock<...>>`
//! - Every operation takes the lock exactly once, so each write is atomic
//! - All operations return `StoreFuture` for deferred execution

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::RwLock;

use crate::domain::{Feature, FeatureId, UpvoteId};
use crate::infrastructure::{FeatureStore, RepositoryError, StoreFuture};

/// In-memory implementation of `FeatureStore`.
///
/// # Example
///
/// ```ignore
/// let store = InMemoryFeatureStore::new();
/// let feature = Feature::new(FeatureId::new("f1"), "Dark mode", Timestamp::now());
///
/// store.create(&feature).await?;
/// store.upsert_or_increment(&feature.feature_id, &UpvoteId::new("u1")).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryFeatureStore {
    features: Arc<RwLock<HashMap<FeatureId, Feature>>>,
}

impl InMemoryFeatureStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given features.
    #[must_use]
    pub fn with_features(features: impl IntoIterator<Item = Feature>) -> Self {
        let features = features
            .into_iter()
            .map(|feature| (feature.feature_id.clone(), feature))
            .collect();
        Self {
            features: Arc::new(RwLock::new(features)),
        }
    }
}

#[allow(clippy::significant_drop_tightening)]
impl FeatureStore for InMemoryFeatureStore {
    fn create(&self, feature: &Feature) -> StoreFuture<bool> {
        let features = Arc::clone(&self.features);
        let feature = feature.clone();
        async move {
            let mut guard = features.write().await;
            if guard.contains_key(&feature.feature_id) {
                return Ok(false);
            }
            guard.insert(feature.feature_id.clone(), feature);
            Ok(true)
        }
        .boxed()
    }

    fn upsert_or_increment(&self, id: &FeatureId, upvote_id: &UpvoteId) -> StoreFuture<bool> {
        let features = Arc::clone(&self.features);
        let id = id.clone();
        let upvote_id = upvote_id.clone();
        async move {
            let mut guard = features.write().await;
            let feature = guard
                .get_mut(&id)
                .ok_or_else(|| RepositoryError::feature_not_found(&id))?;
            Ok(feature.upvotes.insert(upvote_id))
        }
        .boxed()
    }

    fn delete(&self, id: &FeatureId) -> StoreFuture<bool> {
        let features = Arc::clone(&self.features);
        let id = id.clone();
        async move {
            let mut guard = features.write().await;
            Ok(guard.remove(&id).is_some())
        }
        .boxed()
    }

    fn find_by_id(&self, id: &FeatureId) -> StoreFuture<Option<Feature>> {
        let features = Arc::clone(&self.features);
        let id = id.clone();
        async move {
            let guard = features.read().await;
            Ok(guard.get(&id).cloned())
        }
        .boxed()
    }

    fn list_all(&self) -> StoreFuture<Vec<Feature>> {
        let features = Arc::clone(&self.features);
        async move {
            let guard = features.read().await;
            Ok(guard.values().cloned().collect())
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================
