//! `PostgreSQL` feature store.
//!
//! This module provides a relational implementation of `FeatureStore` using
//! `sqlx`. Upvotes live in their own table, keyed by feature and upvote id,
//! so a retried upvote hits the primary key and is ignored.
//!
//! # Features
//!
//! - Connection pooling with `sqlx::PgPool`
//! - Idempotent create via `ON CONFLICT DO NOTHING`
//! - Cascading delete of a feature's upvotes
//! - All operations return `StoreFuture` for deferred execution
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE features (
//!     id TEXT PRIMARY KEY,
//!     title TEXT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL
//! );
//!
//! CREATE TABLE upvotes (
//!     feature_id TEXT NOT NULL REFERENCES features(id) ON DELETE CASCADE,
//!     id TEXT NOT NULL,
//!     PRIMARY KEY (feature_id, id)
//! );
//! ```

use chrono::{DateTime, Utc};
use futures::FutureExt;
use sqlx::PgPool;

use crate::domain::{Feature, FeatureId, Timestamp, UpvoteId};
use crate::infrastructure::{FeatureStore, RepositoryError, StoreFuture};

/// Statements that create the schema if it does not exist yet.
const SCHEMA_STATEMENTS: [&str; 2] = [
    "CREATE TABLE IF NOT EXISTS features (\
         id TEXT PRIMARY KEY, \
         title TEXT NOT NULL, \
         created_at TIMESTAMPTZ NOT NULL\
     )",
    "CREATE TABLE IF NOT EXISTS upvotes (\
         feature_id TEXT NOT NULL REFERENCES features(id) ON DELETE CASCADE, \
         id TEXT NOT NULL, \
         PRIMARY KEY (feature_id, id)\
     )",
];

/// Inserts an upvote only if its feature exists.
///
/// Returns `(feature_exists, inserted)`. The existence check runs in the same
/// statement, so a duplicate upvote id never hides a missing feature.
const UPSERT_UPVOTE: &str = "WITH target AS (SELECT id FROM features WHERE id = $1), \
     inserted AS ( \
         INSERT INTO upvotes (feature_id, id) SELECT id, $2 FROM target \
         ON CONFLICT (feature_id, id) DO NOTHING \
         RETURNING id \
     ) \
     SELECT EXISTS (SELECT 1 FROM target), EXISTS (SELECT 1 FROM inserted)";

/// Selects features with their upvote ids aggregated into an array.
const SELECT_FEATURES: &str = "SELECT f.id, f.title, f.created_at, \
         COALESCE(array_agg(u.id ORDER BY u.id) FILTER (WHERE u.id IS NOT NULL), '{}') AS upvotes \
     FROM features f \
     LEFT JOIN upvotes u ON u.feature_id = f.id";

/// Row shape returned by `SELECT_FEATURES`.
type FeatureRow = (String, String, DateTime<Utc>, Vec<String>);

fn row_to_feature((id, title, created_at, upvotes): FeatureRow) -> Feature {
    Feature::new(
        FeatureId::new(id),
        title,
        Timestamp::from_datetime(created_at),
    )
    .with_upvotes(upvotes.into_iter().map(UpvoteId::new).collect())
}

fn database_error(error: &sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(error.to_string())
}

/// `PostgreSQL` implementation of `FeatureStore`.
///
/// # Example
///
/// ```ignore
/// let pool = PgPool::connect("postgres://localhost/board").await?;
/// let store = PostgresFeatureStore::new(pool);
/// store.ensure_schema().await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresFeatureStore {
    pool: PgPool,
}

impl PostgresFeatureStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `features` and `upvotes` tables if they are missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if any statement fails.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|error| database_error(&error))?;
        }
        tracing::debug!("Feature board schema is ready");
        Ok(())
    }
}

impl FeatureStore for PostgresFeatureStore {
    fn create(&self, feature: &Feature) -> StoreFuture<bool> {
        let pool = self.pool.clone();
        let feature = feature.clone();
        async move {
            let result = sqlx::query(
                "INSERT INTO features (id, title, created_at) VALUES ($1, $2, $3) \
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(feature.feature_id.as_str())
            .bind(&feature.title)
            .bind(*feature.created_at.as_datetime())
            .execute(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            Ok(result.rows_affected() == 1)
        }
        .boxed()
    }

    fn upsert_or_increment(&self, id: &FeatureId, upvote_id: &UpvoteId) -> StoreFuture<bool> {
        let pool = self.pool.clone();
        let id = id.clone();
        let upvote_id = upvote_id.clone();
        async move {
            let result: Result<(bool, bool), _> = sqlx::query_as(UPSERT_UPVOTE)
                .bind(id.as_str())
                .bind(upvote_id.as_str())
                .fetch_one(&pool)
                .await;

            match result {
                Ok((true, inserted)) => Ok(inserted),
                Ok((false, _)) => Err(RepositoryError::feature_not_found(&id)),
                // The feature was deleted between the check and the insert.
                Err(sqlx::Error::Database(error)) if error.is_foreign_key_violation() => {
                    Err(RepositoryError::feature_not_found(&id))
                }
                Err(error) => Err(database_error(&error)),
            }
        }
        .boxed()
    }

    fn delete(&self, id: &FeatureId) -> StoreFuture<bool> {
        let pool = self.pool.clone();
        let id = id.clone();
        async move {
            let result = sqlx::query("DELETE FROM features WHERE id = $1")
                .bind(id.as_str())
                .execute(&pool)
                .await
                .map_err(|error| database_error(&error))?;

            Ok(result.rows_affected() > 0)
        }
        .boxed()
    }

    fn find_by_id(&self, id: &FeatureId) -> StoreFuture<Option<Feature>> {
        let pool = self.pool.clone();
        let id = id.clone();
        async move {
            let query = format!("{SELECT_FEATURES} WHERE f.id = $1 GROUP BY f.id");
            let row: Option<FeatureRow> = sqlx::query_as(&query)
                .bind(id.as_str())
                .fetch_optional(&pool)
                .await
                .map_err(|error| database_error(&error))?;

            Ok(row.map(row_to_feature))
        }
        .boxed()
    }

    fn list_all(&self) -> StoreFuture<Vec<Feature>> {
        let pool = self.pool.clone();
        async move {
            let query = format!("{SELECT_FEATURES} GROUP BY f.id ORDER BY f.created_at, f.id");
            let rows: Vec<FeatureRow> = sqlx::query_as(&query)
                .fetch_all(&pool)
                .await
                .map_err(|error| database_error(&error))?;

            Ok(rows.into_iter().map(row_to_feature).collect())
        }
        .boxed()
    }
}
