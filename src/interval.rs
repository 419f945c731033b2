//! Interval-by-interval agreement
//!
//! Compares how many occurrences each observer recorded in every interval of
//! the session, for every behavior either observer recorded.

use crate::types::{key_union, BehaviorKey, IntervalAgreementResult, PartitionedStream};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Score 1 when both observers counted the same number of occurrences
pub fn exact_comparison(x: u32, y: u32) -> f64 {
    if x == y {
        1.0
    } else {
        0.0
    }
}

/// Ratio of the smaller count to the larger one.
///
/// Two zero counts agree perfectly; a zero against any occurrence does not agree at all.
pub fn partial_comparison(x: u32, y: u32) -> f64 {
    if x == y {
        return 1.0;
    }
    if x == 0 || y == 0 {
        return 0.0;
    }
    f64::from(x.min(y)) / f64::from(x.max(y))
}

/// Exact agreement for every behavior recorded by either observer
pub fn exact_agreement(
    a: &PartitionedStream,
    b: &PartitionedStream,
) -> BTreeMap<BehaviorKey, IntervalAgreementResult> {
    interval_agreement(a, b, exact_comparison)
}

/// Partial agreement for every behavior recorded by either observer
pub fn partial_agreement(
    a: &PartitionedStream,
    b: &PartitionedStream,
) -> BTreeMap<BehaviorKey, IntervalAgreementResult> {
    interval_agreement(a, b, partial_comparison)
}

fn interval_agreement<F>(
    a: &PartitionedStream,
    b: &PartitionedStream,
    compare: F,
) -> BTreeMap<BehaviorKey, IntervalAgreementResult>
where
    F: Fn(u32, u32) -> f64,
{
    // The shorter session is zero-padded to the longer one
    let num_intervals = a.total_intervals.max(b.total_intervals);

    let results: BTreeMap<_, _> = key_union(a, b)
        .into_iter()
        .map(|key| {
            let intervals1 = a.intervals(key);
            let intervals2 = b.intervals(key);

            let counts1: Vec<u32> = (0..num_intervals).map(|i| intervals1.count(i)).collect();
            let counts2: Vec<u32> = (0..num_intervals).map(|i| intervals2.count(i)).collect();
            let scores: Vec<f64> = counts1
                .iter()
                .zip(&counts2)
                .map(|(&x, &y)| compare(x, y))
                .collect();

            let result = IntervalAgreementResult::new(key.clone(), counts1, counts2, scores);
            trace!(behavior = %key, average = result.average_score(), "scored intervals");
            (key.clone(), result)
        })
        .collect();

    debug!(
        behaviors = results.len(),
        num_intervals, "computed interval agreement"
    );
    results
}
