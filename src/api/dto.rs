//! Data Transfer Objects for API requests and responses.
//!
//! This module also holds the validation that turns raw submitted fields into
//! a [`Mutation`]. Every invalid field is reported, not just the first.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Feature, FeatureId, Intent, MAX_TITLE_LENGTH, Mutation, SubmissionFields, Timestamp, UpvoteId,
};
use crate::view::{FeatureView, PendingMutation};

use super::error::{FieldError, ValidationError};

// =============================================================================
// Validation
// =============================================================================

/// Validates a feature title.
///
/// # Validation Rules
///
/// - Title is trimmed
/// - Title must not be empty
/// - Title must not exceed 150 characters
///
/// # Errors
///
/// Returns a `ValidationError` on the `title` field.
pub fn validate_title(title: Option<&str>) -> Result<String, ValidationError> {
    let title = title.map(str::trim).unwrap_or_default();

    if title.is_empty() {
        return Err(ValidationError::single("title", "Title is required"));
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::single(
            "title",
            format!("Title must not exceed {MAX_TITLE_LENGTH} characters"),
        ));
    }

    Ok(title.to_string())
}

/// Validates a required identifier field.
///
/// # Errors
///
/// Returns a `ValidationError` on `field` if the value is missing or blank.
pub fn validate_required(field: &str, value: Option<&str>) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ValidationError::single(field, format!("{field} is required"))),
    }
}

fn collect<T>(result: Result<T, ValidationError>, errors: &mut Vec<FieldError>) -> Option<T> {
    result.map_err(|error| errors.extend(error.errors)).ok()
}

/// Turns submitted fields into a validated mutation.
///
/// Returns `Ok(None)` when the intent is absent or unrecognized; the caller
/// should then do nothing.
///
/// # Errors
///
/// Returns a `ValidationError` listing every missing or invalid field of the
/// selected intent.
pub fn parse_mutation(fields: &SubmissionFields) -> Result<Option<Mutation>, ValidationError> {
    let Some(intent) = fields.parsed_intent() else {
        return Ok(None);
    };

    let mut errors = Vec::new();
    let mutation = match intent {
        Intent::Feature => {
            let title = collect(validate_title(fields.title.as_deref()), &mut errors);
            let feature_id = fields
                .id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(FeatureId::new);
            title.map(|title| Mutation::CreateFeature { feature_id, title })
        }
        Intent::Upvote => {
            let feature_id = collect(validate_required("id", fields.id.as_deref()), &mut errors);
            let upvote_id = collect(
                validate_required("upvoteId", fields.upvote_id.as_deref()),
                &mut errors,
            );
            feature_id
                .zip(upvote_id)
                .map(|(feature_id, upvote_id)| Mutation::Upvote {
                    feature_id: FeatureId::new(feature_id),
                    upvote_id: UpvoteId::new(upvote_id),
                })
        }
        Intent::Delete => collect(validate_required("id", fields.id.as_deref()), &mut errors)
            .map(|feature_id| Mutation::Delete {
                feature_id: FeatureId::new(feature_id),
            }),
    };

    match mutation {
        Some(mutation) if errors.is_empty() => Ok(Some(mutation)),
        _ => Err(ValidationError::new(errors)),
    }
}

// =============================================================================
// Feature DTOs
// =============================================================================

/// Response DTO for a stored feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureResponse {
    /// Feature ID.
    pub id: String,
    /// Title of the feature.
    pub title: String,
    /// Number of distinct upvotes.
    pub score: usize,
    /// Upvote ids in the feature's ledger.
    pub upvotes: Vec<String>,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}

impl From<&Feature> for FeatureResponse {
    fn from(feature: &Feature) -> Self {
        Self {
            id: feature.feature_id.to_string(),
            title: feature.title.clone(),
            score: feature.score(),
            upvotes: feature.upvotes.iter().map(ToString::to_string).collect(),
            created_at: feature.created_at.to_rfc3339(),
        }
    }
}

impl From<Feature> for FeatureResponse {
    fn from(feature: Feature) -> Self {
        Self::from(&feature)
    }
}

/// Response body of the read path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureListResponse {
    /// Every stored feature, in display order.
    pub features: Vec<FeatureResponse>,
}

/// Response DTO for an entry of the optimistic view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureViewResponse {
    pub id: String,
    pub title: String,
    pub score: usize,
    pub upvotes: Vec<String>,
    pub created_at: String,
    /// `true` if the feature has not been confirmed yet.
    pub provisional: bool,
}

impl From<&FeatureView> for FeatureViewResponse {
    fn from(view: &FeatureView) -> Self {
        Self {
            id: view.feature_id.to_string(),
            title: view.title.clone(),
            score: view.score(),
            upvotes: view.upvotes.iter().map(ToString::to_string).collect(),
            created_at: view.created_at.to_rfc3339(),
            provisional: view.provisional,
        }
    }
}

/// Response body of the preview endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureViewListResponse {
    pub features: Vec<FeatureViewResponse>,
}

// =============================================================================
// Mutation DTOs
// =============================================================================

/// Response DTO for an applied (or ignored) mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResponse {
    /// The intent that was handled.
    pub intent: String,
    /// The targeted feature id (server-generated for new features without one).
    pub feature_id: String,
    /// `false` when the write was a no-op (duplicate id or upvote).
    pub applied: bool,
    /// The stored feature after the write. Absent for deletes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<FeatureResponse>,
}

/// A pending mutation as sent to the preview endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PendingMutationDto {
    /// The raw submission fields.
    #[serde(flatten)]
    pub fields: SubmissionFields,
    /// When the client submitted the form (RFC 3339).
    #[serde(default)]
    pub submitted_at: Option<String>,
}

impl PendingMutationDto {
    /// Converts to a pending mutation, using `now` when the client sent no
    /// usable submission time. Unknown intents yield `None`.
    #[must_use]
    pub fn into_pending(self, now: &Timestamp) -> Option<PendingMutation> {
        let submitted_at = self
            .submitted_at
            .as_deref()
            .and_then(Timestamp::parse_rfc3339)
            .unwrap_or_else(|| now.clone());
        PendingMutation::from_fields(&self.fields, submitted_at)
    }
}

/// Request body of the preview endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub pending: Vec<PendingMutationDto>,
}

// =============================================================================
// Tests
// =============================================================================
