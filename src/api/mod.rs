//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod dto;
pub mod error;
pub mod handlers;

use axum::Router;
use axum::routing::{get, post};

pub use dto::{
    FeatureListResponse, FeatureResponse, FeatureViewListResponse, FeatureViewResponse,
    MutationResponse, PendingMutationDto, PreviewRequest, parse_mutation,
};
pub use error::{ApiError, ApiErrorResponse, FieldError, ValidationError};
pub use handlers::{
    AppState, HealthResponse, health_check, list_features, preview_features, submit_mutation,
};

/// Builds the application router.
///
/// Middleware (tracing, CORS) is layered on by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(list_features).post(submit_mutation))
        .route("/features", get(list_features).post(submit_mutation))
        .route("/features/preview", post(preview_features))
        .with_state(state)
}
