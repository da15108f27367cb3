//! Integration tests for the mutation and read handlers.
//!
//! Handlers are called directly with extracted arguments, against the
//! in-memory store.

mod common;

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use rstest::rstest;

use common::{
    create_fields, create_test_app_state, create_test_app_state_with, delete_fields, feature,
    upvote_fields,
};
use feature_board::api::{
    ApiError, AppState, MutationResponse, list_features, submit_mutation,
};
use feature_board::domain::SubmissionFields;

async fn submit(state: &AppState, fields: SubmissionFields) -> (StatusCode, Vec<u8>) {
    let response = match submit_mutation(State(state.clone()), Ok(Form(fields))).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    };
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec();
    (status, bytes)
}

async fn submit_ok(state: &AppState, fields: SubmissionFields) -> MutationResponse {
    let (status, body) = submit(state, fields).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

async fn submit_err(state: &AppState, fields: SubmissionFields) -> (StatusCode, ApiError) {
    let (status, body) = submit(state, fields).await;
    (status, serde_json::from_slice(&body).unwrap())
}

// =============================================================================
// Ledger Scenario
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_create_upvote_and_retry_scenario() {
    let state = create_test_app_state();

    let created = submit_ok(&state, create_fields("f1", "Dark mode")).await;
    assert!(created.applied);
    assert_eq!(created.feature.as_ref().map(|feature| feature.score), Some(0));

    let upvoted = submit_ok(&state, upvote_fields("f1", "u1")).await;
    assert!(upvoted.applied);
    assert_eq!(upvoted.feature.as_ref().map(|feature| feature.score), Some(1));

    let retried = submit_ok(&state, upvote_fields("f1", "u1")).await;
    assert!(!retried.applied);
    assert_eq!(retried.feature.as_ref().map(|feature| feature.score), Some(1));

    let listed = list_features(State(state.clone())).await.unwrap().0;
    assert_eq!(listed.features.len(), 1);
    assert_eq!(listed.features[0].upvotes, vec!["u1"]);
}

// =============================================================================
// POST /features Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_create_same_id_twice_stores_one_feature() {
    let state = create_test_app_state();

    submit_ok(&state, create_fields("abc", "First")).await;
    let duplicate = submit_ok(&state, create_fields("abc", "Second")).await;

    assert!(!duplicate.applied);
    let listed = list_features(State(state.clone())).await.unwrap().0;
    assert_eq!(listed.features.len(), 1);
    assert_eq!(listed.features[0].title, "First");
}

#[rstest]
#[tokio::test]
async fn test_create_without_id_generates_one() {
    let state = create_test_app_state();

    let created = submit_ok(
        &state,
        SubmissionFields::with_intent("feature").title("Keyboard shortcuts"),
    )
    .await;

    assert!(!created.feature_id.is_empty());
    assert_eq!(
        created.feature.map(|feature| feature.id),
        Some(created.feature_id)
    );
}

#[rstest]
#[tokio::test]
async fn test_delete_removes_feature() {
    let state = create_test_app_state_with(vec![feature(
        "f1",
        "Dark mode",
        "2024-01-01T00:00:00Z",
        &["u1", "u2"],
    )]);

    let deleted = submit_ok(&state, delete_fields("f1")).await;

    assert!(deleted.applied);
    assert!(deleted.feature.is_none());
    let listed = list_features(State(state.clone())).await.unwrap().0;
    assert!(listed.features.is_empty());
}

#[rstest]
#[case(delete_fields("ghost"))]
#[case(upvote_fields("ghost", "u1"))]
#[tokio::test]
async fn test_unknown_feature_is_not_found(#[case] fields: SubmissionFields) {
    let state = create_test_app_state();

    let (status, error) = submit_err(&state, fields).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error.code, "NOT_FOUND");
}

#[rstest]
#[case(SubmissionFields::with_intent("feature").title("   "), vec!["title"])]
#[case(SubmissionFields::with_intent("feature").title("x".repeat(151)), vec!["title"])]
#[case(SubmissionFields::with_intent("upvote"), vec!["id", "upvoteId"])]
#[case(SubmissionFields::with_intent("delete"), vec!["id"])]
#[tokio::test]
async fn test_invalid_submission_is_rejected(
    #[case] fields: SubmissionFields,
    #[case] expected_fields: Vec<&str>,
) {
    let state = create_test_app_state();

    let (status, error) = submit_err(&state, fields).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error.code, "VALIDATION_ERROR");
    let reported: Vec<String> = error
        .details
        .unwrap_or_default()
        .into_iter()
        .map(|detail| detail.field)
        .collect();
    assert_eq!(reported, expected_fields);
}

#[rstest]
#[case(SubmissionFields::default())]
#[case(SubmissionFields::with_intent("subscribe").id("f1"))]
#[tokio::test]
async fn test_unknown_intent_writes_nothing(#[case] fields: SubmissionFields) {
    let state = create_test_app_state();

    let (status, body) = submit(&state, fields).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
    let listed = list_features(State(state.clone())).await.unwrap().0;
    assert!(listed.features.is_empty());
}

// =============================================================================
// GET /features Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_list_features_in_display_order() {
    let state = create_test_app_state_with(vec![
        feature("quiet", "Quiet", "2024-01-01T00:00:00Z", &[]),
        feature("newer", "Newer", "2024-01-03T00:00:00Z", &["u1"]),
        feature("popular", "Popular", "2024-01-04T00:00:00Z", &["u1", "u2"]),
        feature("older", "Older", "2024-01-02T00:00:00Z", &["u3"]),
    ]);

    let listed = list_features(State(state)).await.unwrap().0;

    let ids: Vec<&str> = listed
        .features
        .iter()
        .map(|feature| feature.id.as_str())
        .collect();
    assert_eq!(ids, vec!["popular", "older", "newer", "quiet"]);
}
