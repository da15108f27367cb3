//! Client-side bookkeeping of in-flight submissions.
//!
//! A submission is `InFlight` from the moment the form is sent until its
//! request settles. Settling happens on success and failure alike: either
//! way the overlay entry goes away and the next refreshed snapshot is
//! authoritative. A failed mutation is therefore rolled back silently.

use std::collections::BTreeMap;

use crate::domain::Feature;

use super::ordering::sort_for_display;
use super::overlay::{FeatureView, build_view};
use super::pending::PendingMutation;

/// Handle returned by [`PendingMutations::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmissionKey(u64);

/// Lifecycle of a tracked submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    InFlight,
    Settled,
}

#[derive(Debug, Clone)]
struct TrackedMutation {
    mutation: PendingMutation,
    state: MutationState,
}

// =============================================================================
// Pending Mutations
// =============================================================================

/// The set of submissions a client has sent.
#[derive(Debug, Clone, Default)]
pub struct PendingMutations {
    next_key: u64,
    entries: BTreeMap<SubmissionKey, TrackedMutation>,
}

impl PendingMutations {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a submitted mutation as in flight.
    pub fn submit(&mut self, mutation: PendingMutation) -> SubmissionKey {
        let key = SubmissionKey(self.next_key);
        self.next_key += 1;
        self.entries.insert(
            key,
            TrackedMutation {
                mutation,
                state: MutationState::InFlight,
            },
        );
        key
    }

    /// Marks a submission as settled.
    ///
    /// Returns `false` if the key is unknown or was already settled.
    pub fn settle(&mut self, key: SubmissionKey) -> bool {
        match self.entries.get_mut(&key) {
            Some(tracked) if tracked.state == MutationState::InFlight => {
                tracked.state = MutationState::Settled;
                true
            }
            _ => false,
        }
    }

    /// Returns the state of a submission, if it is still tracked.
    #[must_use]
    pub fn state(&self, key: SubmissionKey) -> Option<MutationState> {
        self.entries.get(&key).map(|tracked| tracked.state)
    }

    /// In-flight mutations in submission order.
    #[must_use]
    pub fn in_flight(&self) -> Vec<PendingMutation> {
        self.entries
            .values()
            .filter(|tracked| tracked.state == MutationState::InFlight)
            .map(|tracked| tracked.mutation.clone())
            .collect()
    }

    /// Forgets every settled submission.
    pub fn prune_settled(&mut self) {
        self.entries
            .retain(|_, tracked| tracked.state == MutationState::InFlight);
    }

    /// Number of tracked submissions, settled or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Optimistic Board
// =============================================================================

/// The last confirmed snapshot paired with the client's pending submissions.
///
/// # Examples
///
/// ```
/// use feature_board::domain::Timestamp;
/// use feature_board::view::{OptimisticBoard, PendingMutation};
///
/// let mut board = OptimisticBoard::new();
/// let key = board.submit(PendingMutation::create("f1", "Dark mode", Timestamp::now()));
/// assert!(board.render()[0].provisional);
///
/// board.settle(key);
/// assert!(board.render().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct OptimisticBoard {
    snapshot: Vec<Feature>,
    pending: PendingMutations,
}

impl OptimisticBoard {
    /// Creates a board with an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a board from a confirmed snapshot.
    #[must_use]
    pub fn with_snapshot(snapshot: Vec<Feature>) -> Self {
        Self {
            snapshot,
            pending: PendingMutations::new(),
        }
    }

    /// Tracks a newly submitted mutation.
    pub fn submit(&mut self, mutation: PendingMutation) -> SubmissionKey {
        self.pending.submit(mutation)
    }

    /// Settles a submission, whatever its outcome.
    pub fn settle(&mut self, key: SubmissionKey) -> bool {
        self.pending.settle(key)
    }

    /// Replaces the confirmed snapshot and forgets settled submissions.
    pub fn refresh(&mut self, snapshot: Vec<Feature>) {
        self.snapshot = snapshot;
        self.pending.prune_settled();
    }

    /// The tracked submissions.
    #[must_use]
    pub const fn pending(&self) -> &PendingMutations {
        &self.pending
    }

    /// The last confirmed snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &[Feature] {
        &self.snapshot
    }

    /// The optimistic view in display order.
    #[must_use]
    pub fn render(&self) -> Vec<FeatureView> {
        sort_for_display(build_view(&self.snapshot, &self.pending.in_flight()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureId, Timestamp, UpvoteId};
    use rstest::rstest;

    fn confirmed(id: &str) -> Feature {
        Feature::new(FeatureId::new(id), "Dark mode", Timestamp::now())
    }

    #[rstest]
    fn test_submit_then_settle() {
        let mut pending = PendingMutations::new();
        let key = pending.submit(PendingMutation::delete("f1"));

        assert_eq!(pending.state(key), Some(MutationState::InFlight));
        assert!(pending.settle(key));
        assert_eq!(pending.state(key), Some(MutationState::Settled));
        assert!(!pending.settle(key));
        assert!(pending.in_flight().is_empty());
    }

    #[rstest]
    fn test_in_flight_keeps_submission_order() {
        let mut pending = PendingMutations::new();
        pending.submit(PendingMutation::upvote("f1", "u1"));
        let middle = pending.submit(PendingMutation::upvote("f1", "u2"));
        pending.submit(PendingMutation::delete("f2"));
        pending.settle(middle);

        assert_eq!(
            pending.in_flight(),
            vec![
                PendingMutation::upvote("f1", "u1"),
                PendingMutation::delete("f2"),
            ]
        );
    }

    #[rstest]
    fn test_prune_settled_keeps_in_flight() {
        let mut pending = PendingMutations::new();
        let settled = pending.submit(PendingMutation::delete("f1"));
        let flying = pending.submit(PendingMutation::delete("f2"));
        pending.settle(settled);

        pending.prune_settled();

        assert_eq!(pending.len(), 1);
        assert_eq!(pending.state(settled), None);
        assert_eq!(pending.state(flying), Some(MutationState::InFlight));
    }

    #[rstest]
    fn test_settle_unknown_key() {
        let mut pending = PendingMutations::new();
        assert!(!pending.settle(SubmissionKey(42)));
    }

    #[rstest]
    fn test_failed_delete_is_rolled_back_on_settle() {
        let mut board = OptimisticBoard::with_snapshot(vec![confirmed("f1")]);
        let key = board.submit(PendingMutation::delete("f1"));
        assert!(board.render().is_empty());

        board.settle(key);

        assert_eq!(board.render().len(), 1);
    }

    #[rstest]
    fn test_refresh_replaces_snapshot_and_prunes() {
        let mut board = OptimisticBoard::new();
        let key = board.submit(PendingMutation::upvote("f1", "u1"));
        board.submit(PendingMutation::upvote("f1", "u2"));
        board.settle(key);

        board.refresh(vec![confirmed("f1").with_upvote(UpvoteId::new("u1"))]);

        assert_eq!(board.pending().len(), 1);
        assert_eq!(board.snapshot().len(), 1);
        assert_eq!(board.render()[0].score(), 2);
    }
}
