//! Validated board mutations.
//!
//! The `intent` field of a submission selects one of these variants. Each
//! variant carries only the fields it needs, so a constructed `Mutation` can
//! no longer be missing anything.

use serde::Deserialize;

use super::feature::{FeatureId, UpvoteId};

/// Raw named fields of a submitted form.
///
/// Every field is optional here; turning them into a [`Mutation`] is where
/// required fields are enforced. `feature` is accepted as an alias of
/// `title`, and `upvote_id` as an alias of `upvoteId`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubmissionFields {
    /// The intent tag (`feature`, `upvote`, `delete`).
    #[serde(default)]
    pub intent: Option<String>,
    /// Feature id (client-generated for `feature`, the target otherwise).
    #[serde(default)]
    pub id: Option<String>,
    /// Feature title.
    #[serde(default, alias = "feature")]
    pub title: Option<String>,
    /// Client-generated upvote id.
    #[serde(default, rename = "upvoteId", alias = "upvote_id")]
    pub upvote_id: Option<String>,
    /// Client-side creation time, used only for optimistic rendering.
    #[serde(default)]
    pub created_at: Option<String>,
}

impl SubmissionFields {
    /// Creates fields carrying only an intent tag.
    #[must_use]
    pub fn with_intent(intent: impl Into<String>) -> Self {
        Self {
            intent: Some(intent.into()),
            ..Self::default()
        }
    }

    /// Sets the `id` field.
    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..self
        }
    }

    /// Sets the `title` field.
    #[must_use]
    pub fn title(self, title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..self
        }
    }

    /// Sets the `upvoteId` field.
    #[must_use]
    pub fn upvote_id(self, upvote_id: impl Into<String>) -> Self {
        Self {
            upvote_id: Some(upvote_id.into()),
            ..self
        }
    }

    /// Returns the parsed intent, or `None` when absent or unrecognized.
    #[must_use]
    pub fn parsed_intent(&self) -> Option<Intent> {
        self.intent.as_deref().and_then(Intent::parse)
    }
}

/// The `intent` tag of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Create a new feature.
    Feature,
    /// Upvote an existing feature.
    Upvote,
    /// Delete a feature and its upvotes.
    Delete,
}

impl Intent {
    /// Parses an intent tag. Unknown tags yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "feature" => Some(Self::Feature),
            "upvote" => Some(Self::Upvote),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// The wire name of the intent.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Upvote => "upvote",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A validated write against the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Create a feature. Without an id the server generates one.
    CreateFeature {
        feature_id: Option<FeatureId>,
        title: String,
    },
    /// Record an upvote in the feature's ledger.
    Upvote {
        feature_id: FeatureId,
        upvote_id: UpvoteId,
    },
    /// Remove a feature and its upvotes.
    Delete { feature_id: FeatureId },
}

impl Mutation {
    /// Returns the intent this mutation was built from.
    #[must_use]
    pub const fn intent(&self) -> Intent {
        match self {
            Self::CreateFeature { .. } => Intent::Feature,
            Self::Upvote { .. } => Intent::Upvote,
            Self::Delete { .. } => Intent::Delete,
        }
    }

    /// Returns the targeted feature id, if already known.
    #[must_use]
    pub const fn feature_id(&self) -> Option<&FeatureId> {
        match self {
            Self::CreateFeature { feature_id, .. } => feature_id.as_ref(),
            Self::Upvote { feature_id, .. } | Self::Delete { feature_id } => Some(feature_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("feature", Some(Intent::Feature))]
    #[case("upvote", Some(Intent::Upvote))]
    #[case(" delete ", Some(Intent::Delete))]
    #[case("Delete", None)]
    #[case("email", None)]
    #[case("", None)]
    fn test_intent_parse(#[case] input: &str, #[case] expected: Option<Intent>) {
        assert_eq!(Intent::parse(input), expected);
    }

    #[rstest]
    fn test_mutation_intent_and_target() {
        let mutation = Mutation::Upvote {
            feature_id: FeatureId::new("f1"),
            upvote_id: UpvoteId::new("u1"),
        };
        assert_eq!(mutation.intent(), Intent::Upvote);
        assert_eq!(mutation.feature_id(), Some(&FeatureId::new("f1")));

        let create = Mutation::CreateFeature {
            feature_id: None,
            title: "Dark mode".to_string(),
        };
        assert_eq!(create.intent().as_str(), "feature");
        assert!(create.feature_id().is_none());
    }

    #[rstest]
    fn test_submission_fields_accept_wire_names() {
        let fields: SubmissionFields = serde_json::from_str(
            r#"{"intent":"upvote","id":"f1","upvoteId":"u1"}"#,
        )
        .unwrap();

        assert_eq!(fields.parsed_intent(), Some(Intent::Upvote));
        assert_eq!(fields.upvote_id.as_deref(), Some("u1"));
    }

    #[rstest]
    fn test_submission_fields_accept_feature_alias_for_title() {
        let fields: SubmissionFields =
            serde_json::from_str(r#"{"intent":"feature","feature":"Dark mode"}"#).unwrap();

        assert_eq!(fields.title.as_deref(), Some("Dark mode"));
    }

    #[rstest]
    fn test_submission_fields_builder() {
        let fields = SubmissionFields::with_intent("delete").id("f1");
        assert_eq!(fields.parsed_intent(), Some(Intent::Delete));
        assert_eq!(fields.id.as_deref(), Some("f1"));
        assert!(fields.title.is_none());
    }
}
