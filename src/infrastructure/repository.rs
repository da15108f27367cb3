//! Storage trait for the feature board.
//!
//! This module defines the `FeatureStore` trait. Every method returns a
//! boxed, `'static` future so that implementations can be selected at
//! runtime and shared behind `Arc<dyn FeatureStore>`.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{Feature, FeatureId, UpvoteId};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Entity was not found.
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Key-value store error.
    #[error("Cache error: {0}")]
    CacheError(String),
}

impl RepositoryError {
    /// Creates a `NotFound` error for a feature id.
    #[must_use]
    pub fn feature_not_found(id: &FeatureId) -> Self {
        Self::NotFound(format!("feature {id}"))
    }
}

/// Deferred result of a store operation.
pub type StoreFuture<T> = BoxFuture<'static, Result<T, RepositoryError>>;

// =============================================================================
// Feature Store
// =============================================================================

/// Persistence contract for features and their upvote ledgers.
///
/// Implementations must make each method a single atomic write (or read)
/// against their backend; no multi-call transactions are expected.
///
/// # Example
///
/// ```ignore
/// let created = store.create(&feature).await?;
/// let counted = store.upsert_or_increment(&feature.feature_id, &upvote_id).await?;
/// let features = store.list_all().await?;
/// ```
pub trait FeatureStore: Send + Sync {
    /// Inserts a feature unless one with the same id already exists.
    ///
    /// Returns `Ok(true)` if the feature was inserted, `Ok(false)` if the id
    /// was already taken (the stored feature is left untouched).
    fn create(&self, feature: &Feature) -> StoreFuture<bool>;

    /// Records an upvote in the feature's ledger.
    ///
    /// Returns `Ok(true)` if the upvote was new, `Ok(false)` if the same
    /// upvote id had already been recorded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the feature does not exist.
    fn upsert_or_increment(&self, id: &FeatureId, upvote_id: &UpvoteId) -> StoreFuture<bool>;

    /// Deletes a feature together with its upvotes.
    ///
    /// Returns `Ok(true)` if the feature was deleted, `Ok(false)` if it didn't exist.
    fn delete(&self, id: &FeatureId) -> StoreFuture<bool>;

    /// Finds a feature by its ID.
    fn find_by_id(&self, id: &FeatureId) -> StoreFuture<Option<Feature>>;

    /// Lists every stored feature, in backend order.
    fn list_all(&self) -> StoreFuture<Vec<Feature>>;
}

// =============================================================================
// Tests
// =============================================================================
