//! Client-side pending mutations.
//!
//! A pending mutation is a submitted form whose request has not settled yet.
//! Unlike [`Mutation`](crate::domain::Mutation) it is built leniently:
//! a missing field becomes an empty string rather than an error, and every
//! known intent yields an entry.

use crate::domain::{FeatureId, Intent, SubmissionFields, Timestamp, UpvoteId};

/// An in-flight mutation as seen by the optimistic view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingMutation {
    /// A feature that has been requested but not confirmed.
    CreateFeature {
        feature_id: FeatureId,
        title: String,
        /// Creation time supplied by the client, if any.
        created_at: Option<Timestamp>,
        /// When the form was submitted; stands in for `created_at`.
        submitted_at: Timestamp,
    },
    /// An upvote that has been sent but not confirmed.
    Upvote {
        feature_id: FeatureId,
        upvote_id: UpvoteId,
    },
    /// A delete that has been sent but not confirmed.
    Delete { feature_id: FeatureId },
}

impl PendingMutation {
    /// Creates a pending feature creation.
    #[must_use]
    pub fn create(
        feature_id: impl Into<String>,
        title: impl Into<String>,
        submitted_at: Timestamp,
    ) -> Self {
        Self::CreateFeature {
            feature_id: FeatureId::new(feature_id),
            title: title.into(),
            created_at: None,
            submitted_at,
        }
    }

    /// Creates a pending upvote.
    #[must_use]
    pub fn upvote(feature_id: impl Into<String>, upvote_id: impl Into<String>) -> Self {
        Self::Upvote {
            feature_id: FeatureId::new(feature_id),
            upvote_id: UpvoteId::new(upvote_id),
        }
    }

    /// Creates a pending delete.
    #[must_use]
    pub fn delete(feature_id: impl Into<String>) -> Self {
        Self::Delete {
            feature_id: FeatureId::new(feature_id),
        }
    }

    /// Builds a pending mutation from raw submitted fields.
    ///
    /// Returns `None` for an absent or unknown intent. Text fields are trimmed
    /// the same way the server trims them, missing fields are coerced to
    /// empty strings and an unparsable `created_at` is dropped, so this never
    /// fails.
    #[must_use]
    pub fn from_fields(fields: &SubmissionFields, submitted_at: Timestamp) -> Option<Self> {
        let text = |value: &Option<String>| {
            value.as_deref().map(str::trim).unwrap_or_default().to_string()
        };

        let pending = match fields.parsed_intent()? {
            Intent::Feature => Self::CreateFeature {
                feature_id: FeatureId::new(text(&fields.id)),
                title: text(&fields.title),
                created_at: fields
                    .created_at
                    .as_deref()
                    .and_then(Timestamp::parse_rfc3339),
                submitted_at,
            },
            Intent::Upvote => Self::Upvote {
                feature_id: FeatureId::new(text(&fields.id)),
                upvote_id: UpvoteId::new(text(&fields.upvote_id)),
            },
            Intent::Delete => Self::Delete {
                feature_id: FeatureId::new(text(&fields.id)),
            },
        };
        Some(pending)
    }

    /// The intent this mutation came from.
    #[must_use]
    pub const fn intent(&self) -> Intent {
        match self {
            Self::CreateFeature { .. } => Intent::Feature,
            Self::Upvote { .. } => Intent::Upvote,
            Self::Delete { .. } => Intent::Delete,
        }
    }

    /// The feature this mutation targets.
    #[must_use]
    pub const fn feature_id(&self) -> &FeatureId {
        match self {
            Self::CreateFeature { feature_id, .. }
            | Self::Upvote { feature_id, .. }
            | Self::Delete { feature_id } => feature_id,
        }
    }
}
