//! Domain module for the feature board.
//!
//! This module contains the feature model, its value objects, and the
//! validated mutation type.

pub mod feature;
pub mod mutation;

pub use feature::{Feature, FeatureId, MAX_TITLE_LENGTH, Timestamp, UpvoteId};
pub use mutation::{Intent, Mutation, SubmissionFields};
