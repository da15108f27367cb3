//! Optimistic rendering of the board.
//!
//! This module contains the pending mutation model, the pure overlay that
//! merges it with confirmed features, the display ordering, and the client
//! tracker that drives both.

pub mod ordering;
pub mod overlay;
pub mod pending;
pub mod tracker;

pub use ordering::{DisplayRank, display_order, sort_for_display};
pub use overlay::{FeatureView, build_view};
pub use pending::PendingMutation;
pub use tracker::{MutationState, OptimisticBoard, PendingMutations, SubmissionKey};
