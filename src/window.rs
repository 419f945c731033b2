//! Time-window agreement
//!
//! Discrete behaviors: each observer's occurrences are matched one-to-one
//! against the other observer's occurrences within a tolerance of
//! `threshold` intervals, giving one score per direction.
//!
//! Continuous behaviors: the sets of intervals each observer had the behavior
//! "on" are compared with the Jaccard index.

use crate::types::{
    key_union, BehaviorKey, ContinuousWindowResult, IntervalMultiset, PartitionedStream,
    TimeWindowResult,
};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Fraction of `seconds` that find a partner in `comparison_pool` within `threshold` intervals.
///
/// Occurrences are taken in ascending interval order. Each one claims the first
/// pool entry (in ascending order) inside `[s - threshold, s + threshold]`, and a
/// claimed entry cannot be claimed again. Returns `None` when `seconds` is empty.
pub fn match_fraction(
    seconds: &IntervalMultiset,
    comparison_pool: &IntervalMultiset,
    threshold: u32,
) -> Option<f64> {
    if seconds.is_empty() {
        return None;
    }

    let mut pool = comparison_pool.frequencies().clone();
    let mut matched = 0usize;

    for s in seconds.iter() {
        let window = s.saturating_sub(threshold)..=s.saturating_add(threshold);
        let Some(&candidate) = pool.range(window).next().map(|(index, _)| index) else {
            continue;
        };

        if let Some(remaining) = pool.get_mut(&candidate) {
            *remaining -= 1;
            if *remaining == 0 {
                pool.remove(&candidate);
            }
        }
        matched += 1;
    }

    Some(matched as f64 / seconds.len() as f64)
}

/// Directional window agreement for every discrete behavior recorded by either observer
pub fn window_agreement_discrete(
    a: &PartitionedStream,
    b: &PartitionedStream,
    threshold: u32,
) -> BTreeMap<BehaviorKey, TimeWindowResult> {
    let results: BTreeMap<_, _> = key_union(a, b)
        .into_iter()
        .map(|key| {
            let occurrences_a = a.intervals(key);
            let occurrences_b = b.intervals(key);

            let result = TimeWindowResult {
                score_a_to_b: match_fraction(occurrences_a, occurrences_b, threshold),
                score_b_to_a: match_fraction(occurrences_b, occurrences_a, threshold),
            };
            trace!(
                behavior = %key,
                a_to_b = ?result.score_a_to_b,
                b_to_a = ?result.score_b_to_a,
                "matched occurrences"
            );
            (key.clone(), result)
        })
        .collect();

    debug!(
        behaviors = results.len(),
        threshold, "computed discrete window agreement"
    );
    results
}

/// Jaccard index of the intervals touched by each side, `None` when neither touched any
pub fn jaccard_index(a: &IntervalMultiset, b: &IntervalMultiset) -> Option<f64> {
    let set_a = a.distinct();
    let set_b = b.distinct();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return None;
    }
    let intersection = set_a.intersection(&set_b).count();

    Some(intersection as f64 / union as f64)
}

/// Interval-overlap agreement for every continuous behavior recorded by either observer.
///
/// A behavior neither observer recorded has no defined score and is left out.
pub fn window_agreement_continuous(
    a: &PartitionedStream,
    b: &PartitionedStream,
) -> BTreeMap<BehaviorKey, ContinuousWindowResult> {
    let mut results = BTreeMap::new();

    for key in key_union(a, b) {
        match jaccard_index(a.intervals(key), b.intervals(key)) {
            Some(score) => {
                trace!(behavior = %key, score, "scored interval overlap");
                results.insert(key.clone(), score);
            }
            None => warn!(behavior = %key, "no occurrences on either side, skipping"),
        }
    }

    debug!(
        behaviors = results.len(),
        "computed continuous window agreement"
    );
    results
}
