//! Interval partitioning
//!
//! Discretizes one observer's per-behavior event stream into fixed-width
//! intervals. Discrete occurrences land in exactly one interval; continuous
//! occurrences are expanded into every interval they overlap, so downstream
//! metrics can compare per-interval presence.

use crate::error::IoaError;
use crate::types::{BehaviorKey, IntervalIndex, IntervalMultiset, PartitionedStream, StartEndTimes};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// An occurrence that can be placed on the session timeline.
pub trait IntervalSource {
    /// Inclusive `(start, end)` offsets in session millis covered by this occurrence
    fn span_millis(&self) -> (u64, u64);
}

impl IntervalSource for u64 {
    fn span_millis(&self) -> (u64, u64) {
        (*self, *self)
    }
}

impl IntervalSource for StartEndTimes {
    fn span_millis(&self) -> (u64, u64) {
        (self.start, self.end)
    }
}

/// Either kind of occurrence, for streams that mix discrete and continuous behaviors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    Discrete(u64),
    Continuous(StartEndTimes),
}

impl IntervalSource for Occurrence {
    fn span_millis(&self) -> (u64, u64) {
        match self {
            Occurrence::Discrete(t) => t.span_millis(),
            Occurrence::Continuous(span) => span.span_millis(),
        }
    }
}

/// Number of bins needed to cover `total_duration_millis`, never fewer than one
pub fn total_intervals(
    total_duration_millis: u64,
    bin_width_millis: u64,
) -> Result<u32, IoaError> {
    if bin_width_millis == 0 {
        return Err(IoaError::InvalidBinWidth(bin_width_millis));
    }
    let bins = total_duration_millis.div_ceil(bin_width_millis).max(1);
    u32::try_from(bins).map_err(|_| {
        IoaError::InvalidConfig(format!(
            "{} ms session split into {} ms bins yields too many intervals",
            total_duration_millis, bin_width_millis
        ))
    })
}

/// Partition a per-behavior stream into interval multisets.
///
/// Behaviors with no occurrences get no entry. Indices that fall past the last
/// bin (an occurrence stamped at or after the session end) are clamped into it.
pub fn partition<T: IntervalSource>(
    stream: &BTreeMap<BehaviorKey, Vec<T>>,
    total_duration_millis: u64,
    bin_width_millis: u64,
) -> Result<PartitionedStream, IoaError> {
    let total_intervals = total_intervals(total_duration_millis, bin_width_millis)?;
    let last = total_intervals - 1;
    let to_index = |millis: u64| -> IntervalIndex {
        u32::try_from(millis / bin_width_millis).map_or(last, |index| index.min(last))
    };

    let mut intervals_by_key = BTreeMap::new();
    for (key, occurrences) in stream {
        if occurrences.is_empty() {
            continue;
        }

        let mut multiset = IntervalMultiset::new();
        for occurrence in occurrences {
            let (start, end) = occurrence.span_millis();
            if end < start {
                return Err(IoaError::InvalidSession(format!(
                    "behavior {} has an occurrence ending at {} ms before it starts at {} ms",
                    key, end, start
                )));
            }
            for index in to_index(start)..=to_index(end) {
                multiset.insert(index);
            }
        }

        trace!(behavior = %key, occurrences = multiset.len(), "partitioned behavior");
        intervals_by_key.insert(key.clone(), multiset);
    }

    debug!(
        behaviors = intervals_by_key.len(),
        total_intervals, bin_width_millis, "partitioned stream"
    );

    Ok(PartitionedStream {
        intervals_by_key,
        total_intervals,
    })
}
