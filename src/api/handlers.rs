//! HTTP handlers for the feature board.
//!
//! This module contains the mutation endpoint, the read path, the optimistic
//! preview, and the health check.

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{
        State,
        rejection::{FormRejection, JsonRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::dto::{
    FeatureListResponse, FeatureResponse, FeatureViewListResponse, FeatureViewResponse,
    MutationResponse, PreviewRequest, parse_mutation,
};
use super::error::ApiErrorResponse;
use crate::domain::{Feature, FeatureId, Mutation, SubmissionFields, Timestamp};
use crate::infrastructure::{FeatureStore, RepositoryError};
use crate::view::{build_view, sort_for_display};

// =============================================================================
// Application State
// =============================================================================

/// Application state shared across all handlers.
///
/// The store is a trait object so the backend can be chosen at startup by
/// `RepositoryFactory`.
#[derive(Clone)]
pub struct AppState {
    /// Feature storage.
    pub store: Arc<dyn FeatureStore>,
}

impl AppState {
    /// Creates a new `AppState` around an initialized store.
    #[must_use]
    pub fn new(store: Arc<dyn FeatureStore>) -> Self {
        Self { store }
    }
}

// =============================================================================
// POST / and POST /features Handler
// =============================================================================

/// Applies a submitted form to the board.
///
/// # Request Body
///
/// Form-encoded `intent`, `id`, `title` (or `feature`), and `upvoteId`.
///
/// # Response
///
/// - **200 OK**: `MutationResponse`; `applied` is `false` for a duplicate
///   feature id or upvote id
/// - **204 No Content**: absent or unknown intent, nothing written
/// - **400 Bad Request**: Validation error listing every bad field, or a
///   `body` error when the form cannot be decoded
/// - **404 Not Found**: upvote or delete of an unknown feature
/// - **500 Internal Server Error**: Storage error
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for validation, not-found, and storage
/// failures.
pub async fn submit_mutation(
    State(state): State<AppState>,
    form: Result<Form<SubmissionFields>, FormRejection>,
) -> Result<Response, ApiErrorResponse> {
    let Form(fields) = form?;
    let Some(mutation) = parse_mutation(&fields)? else {
        tracing::debug!(intent = ?fields.intent, "Ignoring submission without a known intent");
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let response = apply_mutation(state.store.as_ref(), mutation).await?;
    tracing::info!(
        intent = %response.intent,
        feature_id = %response.feature_id,
        applied = response.applied,
        "Mutation handled"
    );

    Ok(Json(response).into_response())
}

async fn apply_mutation(
    store: &dyn FeatureStore,
    mutation: Mutation,
) -> Result<MutationResponse, RepositoryError> {
    let intent = mutation.intent();

    let (feature_id, applied) = match mutation {
        Mutation::CreateFeature { feature_id, title } => {
            let feature_id = feature_id.unwrap_or_else(FeatureId::generate);
            let feature = Feature::new(feature_id.clone(), title, Timestamp::now());
            (feature_id, store.create(&feature).await?)
        }
        Mutation::Upvote {
            feature_id,
            upvote_id,
        } => {
            let applied = store.upsert_or_increment(&feature_id, &upvote_id).await?;
            (feature_id, applied)
        }
        Mutation::Delete { feature_id } => {
            if !store.delete(&feature_id).await? {
                return Err(RepositoryError::feature_not_found(&feature_id));
            }
            return Ok(MutationResponse {
                intent: intent.to_string(),
                feature_id: feature_id.to_string(),
                applied: true,
                feature: None,
            });
        }
    };

    let feature = store.find_by_id(&feature_id).await?;

    Ok(MutationResponse {
        intent: intent.to_string(),
        feature_id: feature_id.to_string(),
        applied,
        feature: feature.map(FeatureResponse::from),
    })
}

// =============================================================================
// GET / and GET /features Handler
// =============================================================================

/// Lists every stored feature in display order.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] if the store cannot be read.
pub async fn list_features(
    State(state): State<AppState>,
) -> Result<Json<FeatureListResponse>, ApiErrorResponse> {
    let features = state.store.list_all().await?;

    let features = sort_for_display(features)
        .iter()
        .map(FeatureResponse::from)
        .collect();

    Ok(Json(FeatureListResponse { features }))
}

// =============================================================================
// POST /features/preview Handler
// =============================================================================

/// Renders the optimistic view of the stored board with the given pending
/// mutations overlaid. Nothing is written.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] if the body is not valid JSON or the store
/// cannot be read.
pub async fn preview_features(
    State(state): State<AppState>,
    request: Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<Json<FeatureViewListResponse>, ApiErrorResponse> {
    let Json(request) = request?;
    let now = Timestamp::now();
    let pending: Vec<_> = request
        .pending
        .into_iter()
        .filter_map(|dto| dto.into_pending(&now))
        .collect();

    let confirmed = state.store.list_all().await?;
    let features = sort_for_display(build_view(&confirmed, &pending))
        .iter()
        .map(FeatureViewResponse::from)
        .collect();

    Ok(Json(FeatureViewListResponse { features }))
}

// =============================================================================
// GET /health Handler
// =============================================================================

/// Health check response body.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check endpoint.
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UpvoteId;
    use crate::infrastructure::InMemoryFeatureStore;
    use rstest::rstest;

    fn store() -> InMemoryFeatureStore {
        InMemoryFeatureStore::new()
    }

    #[rstest]
    #[tokio::test]
    async fn test_apply_create_generates_missing_id() {
        let store = store();
        let mutation = Mutation::CreateFeature {
            feature_id: None,
            title: "Dark mode".to_string(),
        };

        let response = apply_mutation(&store, mutation).await.unwrap();

        assert!(response.applied);
        assert!(!response.feature_id.is_empty());
        assert_eq!(
            response.feature.map(|feature| feature.title),
            Some("Dark mode".to_string())
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_apply_duplicate_create_reports_stored_feature() {
        let store = store();
        let create = |title: &str| Mutation::CreateFeature {
            feature_id: Some(FeatureId::new("abc")),
            title: title.to_string(),
        };

        apply_mutation(&store, create("First")).await.unwrap();
        let response = apply_mutation(&store, create("Second")).await.unwrap();

        assert!(!response.applied);
        assert_eq!(response.feature.unwrap().title, "First");
    }

    #[rstest]
    #[tokio::test]
    async fn test_apply_upvote_returns_new_score() {
        let store = store();
        store
            .create(&Feature::new(FeatureId::new("f1"), "Dark mode", Timestamp::now()))
            .await
            .unwrap();
        let upvote = || Mutation::Upvote {
            feature_id: FeatureId::new("f1"),
            upvote_id: UpvoteId::new("u1"),
        };

        let first = apply_mutation(&store, upvote()).await.unwrap();
        let retry = apply_mutation(&store, upvote()).await.unwrap();

        assert!(first.applied);
        assert!(!retry.applied);
        assert_eq!(retry.feature.unwrap().score, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_apply_delete_missing_is_not_found() {
        let result = apply_mutation(
            &store(),
            Mutation::Delete {
                feature_id: FeatureId::new("ghost"),
            },
        )
        .await;

        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_health_check() {
        let Json(response) = health_check().await;
        assert_eq!(response.status, "healthy");
    }
}
