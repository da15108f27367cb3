//! Display ordering of the board.
//!
//! Features are shown by score (highest first), then by creation time
//! (oldest first), then by id. The id tie-break makes the order total, so
//! sorting an already-sorted list is a no-op.

use std::cmp::Ordering;

use crate::domain::{Feature, FeatureId, Timestamp};

use super::overlay::FeatureView;

/// The fields an entry is ranked by.
pub trait DisplayRank {
    /// Number of distinct upvotes.
    fn rank_score(&self) -> usize;
    /// Creation time.
    fn rank_created_at(&self) -> &Timestamp;
    /// Identifier, the final tie-break.
    fn rank_id(&self) -> &FeatureId;
}

impl DisplayRank for Feature {
    fn rank_score(&self) -> usize {
        self.score()
    }

    fn rank_created_at(&self) -> &Timestamp {
        &self.created_at
    }

    fn rank_id(&self) -> &FeatureId {
        &self.feature_id
    }
}

impl DisplayRank for FeatureView {
    fn rank_score(&self) -> usize {
        self.score()
    }

    fn rank_created_at(&self) -> &Timestamp {
        &self.created_at
    }

    fn rank_id(&self) -> &FeatureId {
        &self.feature_id
    }
}

/// Compares two entries in display order.
#[must_use]
pub fn display_order<T: DisplayRank>(left: &T, right: &T) -> Ordering {
    right
        .rank_score()
        .cmp(&left.rank_score())
        .then_with(|| left.rank_created_at().cmp(right.rank_created_at()))
        .then_with(|| left.rank_id().cmp(right.rank_id()))
}

/// Sorts entries into display order.
#[must_use]
pub fn sort_for_display<T: DisplayRank>(mut entries: Vec<T>) -> Vec<T> {
    entries.sort_by(display_order);
    entries
}
