//! Merges confirmed features with pending mutations.
//!
//! The overlay is a pure function of two slices: it never touches the store
//! and running it twice over the same inputs yields the same view.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::domain::{Feature, FeatureId, Timestamp, UpvoteId};

use super::pending::PendingMutation;

// =============================================================================
// Feature View
// =============================================================================

/// A feature as rendered by a client, confirmed or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureView {
    /// Feature identifier.
    pub feature_id: FeatureId,
    /// Feature title.
    pub title: String,
    /// Confirmed upvotes united with pending ones.
    pub upvotes: BTreeSet<UpvoteId>,
    /// Stored creation time, or the client-side one for provisional entries.
    pub created_at: Timestamp,
    /// `true` if the feature exists only as a pending creation.
    pub provisional: bool,
}

impl FeatureView {
    /// The displayed score.
    #[must_use]
    pub fn score(&self) -> usize {
        self.upvotes.len()
    }
}

impl From<&Feature> for FeatureView {
    fn from(feature: &Feature) -> Self {
        Self {
            feature_id: feature.feature_id.clone(),
            title: feature.title.clone(),
            upvotes: feature.upvotes.clone(),
            created_at: feature.created_at.clone(),
            provisional: false,
        }
    }
}

// =============================================================================
// Overlay
// =============================================================================

/// Builds the optimistic view of the board.
///
/// Pending creations whose id is unknown become provisional entries; pending
/// upvotes are united into the target's ledger (so an upvote that has
/// already been confirmed does not count twice) and are dropped when the
/// target is unknown; pending deletes remove their target last.
///
/// The result is keyed by id, not in display order. Pass it through
/// [`sort_for_display`](super::ordering::sort_for_display) before rendering.
#[must_use]
pub fn build_view(confirmed: &[Feature], pending: &[PendingMutation]) -> Vec<FeatureView> {
    let mut entries: BTreeMap<FeatureId, FeatureView> = confirmed
        .iter()
        .map(|feature| (feature.feature_id.clone(), FeatureView::from(feature)))
        .collect();

    let deleted: HashSet<&FeatureId> = pending
        .iter()
        .filter_map(|mutation| match mutation {
            PendingMutation::Delete { feature_id } => Some(feature_id),
            _ => None,
        })
        .collect();

    for mutation in pending {
        if let PendingMutation::CreateFeature {
            feature_id,
            title,
            created_at,
            submitted_at,
        } = mutation
        {
            entries
                .entry(feature_id.clone())
                .or_insert_with(|| FeatureView {
                    feature_id: feature_id.clone(),
                    title: title.clone(),
                    upvotes: BTreeSet::new(),
                    created_at: created_at.clone().unwrap_or_else(|| submitted_at.clone()),
                    provisional: true,
                });
        }
    }

    for mutation in pending {
        if let PendingMutation::Upvote {
            feature_id,
            upvote_id,
        } = mutation
            && let Some(entry) = entries.get_mut(feature_id)
        {
            entry.upvotes.insert(upvote_id.clone());
        }
    }

    entries
        .into_values()
        .filter(|entry| !deleted.contains(&entry.feature_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SubmissionFields;
    use rstest::rstest;

    fn at(value: &str) -> Timestamp {
        Timestamp::parse_rfc3339(value).unwrap()
    }

    fn confirmed(id: &str, upvotes: &[&str]) -> Feature {
        let ledger = upvotes.iter().map(|upvote| UpvoteId::new(*upvote)).collect();
        Feature::new(FeatureId::new(id), format!("Feature {id}"), at("2024-01-01T00:00:00Z"))
            .with_upvotes(ledger)
    }

    fn find<'a>(view: &'a [FeatureView], id: &str) -> Option<&'a FeatureView> {
        view.iter().find(|entry| entry.feature_id.as_str() == id)
    }

    #[rstest]
    fn test_empty_pending_mirrors_confirmed() {
        let features = vec![confirmed("f1", &["u1"]), confirmed("f2", &[])];

        let view = build_view(&features, &[]);

        assert_eq!(view.len(), 2);
        assert!(view.iter().all(|entry| !entry.provisional));
        assert_eq!(find(&view, "f1").map(FeatureView::score), Some(1));
    }

    #[rstest]
    fn test_pending_create_becomes_provisional() {
        let submitted_at = at("2024-02-01T12:00:00Z");
        let pending = vec![PendingMutation::create("f9", "Offline mode", submitted_at.clone())];

        let view = build_view(&[], &pending);

        let entry = find(&view, "f9").unwrap();
        assert!(entry.provisional);
        assert_eq!(entry.title, "Offline mode");
        assert_eq!(entry.score(), 0);
        assert_eq!(entry.created_at, submitted_at);
    }

    #[rstest]
    fn test_pending_create_prefers_client_timestamp() {
        let pending = vec![PendingMutation::CreateFeature {
            feature_id: FeatureId::new("f9"),
            title: "Offline mode".to_string(),
            created_at: Some(at("2024-02-01T11:00:00Z")),
            submitted_at: at("2024-02-01T12:00:00Z"),
        }];

        let view = build_view(&[], &pending);

        assert_eq!(view[0].created_at, at("2024-02-01T11:00:00Z"));
    }

    #[rstest]
    fn test_pending_create_for_confirmed_id_keeps_confirmed_entry() {
        let features = vec![confirmed("f1", &["u1"])];
        let pending = vec![PendingMutation::create("f1", "Other title", Timestamp::now())];

        let view = build_view(&features, &pending);

        assert_eq!(view.len(), 1);
        assert!(!view[0].provisional);
        assert_eq!(view[0].title, "Feature f1");
    }

    #[rstest]
    #[case(&["u1"], &["u1"], 1)]
    #[case(&["u1"], &["u2"], 2)]
    #[case(&[], &["u1", "u1"], 1)]
    #[case(&["u1", "u2"], &["u2", "u3"], 3)]
    fn test_pending_upvotes_are_united(
        #[case] confirmed_upvotes: &[&str],
        #[case] pending_upvotes: &[&str],
        #[case] expected: usize,
    ) {
        let features = vec![confirmed("f1", confirmed_upvotes)];
        let pending: Vec<_> = pending_upvotes
            .iter()
            .map(|upvote| PendingMutation::upvote("f1", *upvote))
            .collect();

        let view = build_view(&features, &pending);

        assert_eq!(view[0].score(), expected);
    }

    #[rstest]
    fn test_pending_upvote_on_provisional_entry() {
        let pending = vec![
            PendingMutation::upvote("f9", "u1"),
            PendingMutation::create("f9", "Offline mode", Timestamp::now()),
        ];

        let view = build_view(&[], &pending);

        assert_eq!(view[0].score(), 1);
    }

    #[rstest]
    fn test_padded_submission_lines_up_with_stored_feature() {
        let features = vec![confirmed("f1", &[])];
        let fields = SubmissionFields::with_intent("upvote").id(" f1 ").upvote_id(" u1");
        let pending: Vec<_> = PendingMutation::from_fields(&fields, Timestamp::now())
            .into_iter()
            .collect();

        let view = build_view(&features, &pending);

        assert_eq!(view.len(), 1);
        assert_eq!(view[0].score(), 1);
        assert!(view[0].upvotes.contains(&UpvoteId::new("u1")));
    }

    #[rstest]
    fn test_pending_upvote_on_unknown_id_is_dropped() {
        let view = build_view(&[], &[PendingMutation::upvote("ghost", "u1")]);
        assert!(view.is_empty());
    }

    #[rstest]
    fn test_pending_delete_removes_confirmed_and_provisional() {
        let features = vec![confirmed("f1", &[]), confirmed("f2", &[])];
        let pending = vec![
            PendingMutation::delete("f1"),
            PendingMutation::delete("f9"),
            PendingMutation::create("f9", "Offline mode", Timestamp::now()),
        ];

        let view = build_view(&features, &pending);

        assert_eq!(view.len(), 1);
        assert_eq!(view[0].feature_id.as_str(), "f2");
    }

    #[rstest]
    fn test_degenerate_pending_create_is_rendered() {
        let view = build_view(&[], &[PendingMutation::create("", "", Timestamp::now())]);

        assert_eq!(view.len(), 1);
        assert!(view[0].title.is_empty());
    }

    #[rstest]
    fn test_build_view_is_deterministic() {
        let features = vec![confirmed("f1", &["u1"]), confirmed("f2", &[])];
        let pending = vec![
            PendingMutation::upvote("f2", "u7"),
            PendingMutation::create("f3", "New", at("2024-03-01T00:00:00Z")),
        ];

        assert_eq!(build_view(&features, &pending), build_view(&features, &pending));
    }
}
