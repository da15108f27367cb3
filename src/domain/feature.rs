//! Feature domain model.
//!
//! A feature is a titled request on the board. Its score is derived from the
//! set of distinct upvote ids recorded against it, so a retried upvote can
//! never be counted twice.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Opaque identifier for a feature.
///
/// Identifiers may be generated by the client (to support optimistic
/// rendering) or by the server, so the only requirement is uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(String);

impl FeatureId {
    /// Creates a `FeatureId` from an existing string.
    ///
    /// This is a pure function - no validation beyond what the caller has
    /// already done.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a new server-side `FeatureId` from a time-ordered UUID (v7).
    ///
    /// **Note**: This is an impure function (side effect: time + random).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Client-generated identifier of a single upvote.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpvoteId(String);

impl UpvoteId {
    /// Creates an `UpvoteId` from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a random `UpvoteId` (v4).
    ///
    /// **Note**: This is an impure function. Clients normally supply their own.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UpvoteId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for UpvoteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A timestamp wrapper for `DateTime<Utc>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time as a `Timestamp`.
    ///
    /// **Note**: This is an impure function (side effect: system clock).
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Parses an RFC 3339 string, as sent by browsers via `toISOString()`.
    #[must_use]
    pub fn parse_rfc3339(value: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(value.trim())
            .ok()
            .map(|datetime| Self(datetime.with_timezone(&Utc)))
    }

    /// Formats the timestamp as RFC 3339 with millisecond precision.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }

    /// Milliseconds since the UNIX epoch.
    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

// =============================================================================
// Feature
// =============================================================================

/// Maximum length of a feature title, in characters.
pub const MAX_TITLE_LENGTH: usize = 150;

/// A feature request on the board.
///
/// # Examples
///
/// ```
/// use feature_board::domain::{Feature, FeatureId, Timestamp, UpvoteId};
///
/// let feature = Feature::new(FeatureId::new("f1"), "Dark mode", Timestamp::now())
///     .with_upvote(UpvoteId::new("u1"))
///     .with_upvote(UpvoteId::new("u1"));
///
/// assert_eq!(feature.score(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    /// Unique identifier for the feature.
    pub feature_id: FeatureId,
    /// Title as submitted (already trimmed and length-checked).
    pub title: String,
    /// Ledger of distinct upvote ids.
    pub upvotes: BTreeSet<UpvoteId>,
    /// Timestamp when the feature was created.
    pub created_at: Timestamp,
}

impl Feature {
    /// Creates a new feature with an empty upvote ledger.
    ///
    /// This is a pure function. Use `FeatureId::generate()` and
    /// `Timestamp::now()` at the edge to create the parameters.
    #[must_use]
    pub fn new(feature_id: FeatureId, title: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            feature_id,
            title: title.into(),
            upvotes: BTreeSet::new(),
            created_at,
        }
    }

    /// Returns a new feature with the given upvote ledger (replacing the existing one).
    #[must_use]
    pub fn with_upvotes(self, upvotes: BTreeSet<UpvoteId>) -> Self {
        Self { upvotes, ..self }
    }

    /// Returns a new feature with the given upvote recorded.
    ///
    /// If the upvote id is already present, the feature is returned unchanged.
    #[must_use]
    pub fn with_upvote(mut self, upvote_id: UpvoteId) -> Self {
        self.upvotes.insert(upvote_id);
        self
    }

    /// Returns `true` if the given upvote id is already in the ledger.
    #[must_use]
    pub fn has_upvote(&self, upvote_id: &UpvoteId) -> bool {
        self.upvotes.contains(upvote_id)
    }

    /// The feature's score: the number of distinct upvotes.
    #[must_use]
    pub fn score(&self) -> usize {
        self.upvotes.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
