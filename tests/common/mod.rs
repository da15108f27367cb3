//! Common test helpers for integration tests.
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate, and not every file uses every
//! helper.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, header};
use http_body_util::BodyExt;

use feature_board::api::AppState;
use feature_board::domain::{Feature, FeatureId, SubmissionFields, Timestamp, UpvoteId};
use feature_board::infrastructure::InMemoryFeatureStore;

// =============================================================================
// AppState Creation Helpers
// =============================================================================

/// Creates a test `AppState` backed by an empty in-memory store.
pub fn create_test_app_state() -> AppState {
    AppState::new(Arc::new(InMemoryFeatureStore::new()))
}

/// Creates a test `AppState` pre-populated with the given features.
pub fn create_test_app_state_with(features: Vec<Feature>) -> AppState {
    AppState::new(Arc::new(InMemoryFeatureStore::with_features(features)))
}

// =============================================================================
// Fixtures
// =============================================================================

/// Parses an RFC 3339 timestamp.
pub fn at(value: &str) -> Timestamp {
    Timestamp::parse_rfc3339(value).expect("valid RFC 3339 timestamp")
}

/// Builds a feature with the given upvote ids.
pub fn feature(id: &str, title: &str, created_at: &str, upvotes: &[&str]) -> Feature {
    let ledger = upvotes.iter().map(|upvote| UpvoteId::new(*upvote)).collect();
    Feature::new(FeatureId::new(id), title, at(created_at)).with_upvotes(ledger)
}

pub fn create_fields(id: &str, title: &str) -> SubmissionFields {
    SubmissionFields::with_intent("feature").id(id).title(title)
}

pub fn upvote_fields(id: &str, upvote_id: &str) -> SubmissionFields {
    SubmissionFields::with_intent("upvote").id(id).upvote_id(upvote_id)
}

pub fn delete_fields(id: &str) -> SubmissionFields {
    SubmissionFields::with_intent("delete").id(id)
}

// =============================================================================
// HTTP Helpers
// =============================================================================

/// Builds a form-encoded POST request.
pub fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

/// Builds a JSON POST request.
pub fn json_request(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

/// Builds a GET request.
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

/// Collects a response body as JSON.
pub async fn body_json(body: Body) -> serde_json::Value {
    let bytes = body
        .collect()
        .await
        .expect("readable body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("JSON body")
}
