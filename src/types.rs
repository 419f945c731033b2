//! Core data types for the observer agreement engine
//!
//! These types flow through the comparison pipeline:
//! RawSession → PartitionedStream → agreement results.

use crate::error::IoaError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Index of a fixed-width interval (bin), counted from the start of the session
pub type IntervalIndex = u32;

/// Stable identifier of a behavior definition within a schema.
///
/// This is the behavior mapping's id, not the key character used to record it,
/// so remapping a key on the keyboard does not change which behavior is compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BehaviorKey(String);

impl BehaviorKey {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh random (v4 uuid) key for a new behavior mapping
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BehaviorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BehaviorKey {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for BehaviorKey {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single occurrence of a continuous (durational) behavior, in session millis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartEndTimes {
    /// Offset from session start when the behavior was switched on
    pub start: u64,
    /// Offset from session start when the behavior was switched off
    pub end: u64,
}

impl StartEndTimes {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }
}

/// One observer's recording of a session, as handed over by the recorder.
///
/// Field names follow the recorder's raw session JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSession {
    /// Length of the recorded session in milliseconds
    pub total_time_millis: u64,
    /// Timestamps (millis) of every momentary behavior occurrence, per behavior
    #[serde(default)]
    pub discrete_events: BTreeMap<BehaviorKey, Vec<u64>>,
    /// Start/end pairs of every durational behavior occurrence, per behavior
    #[serde(default)]
    pub continuous_events: BTreeMap<BehaviorKey, Vec<StartEndTimes>>,
}

/// A multiset of interval indices: how many occurrences landed in each interval.
///
/// Serialized as a map from interval index to occurrence count. Zero counts are
/// rejected on the way in and the total is recomputed from the map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<IntervalIndex, u32>",
    into = "BTreeMap<IntervalIndex, u32>"
)]
pub struct IntervalMultiset {
    counts: BTreeMap<IntervalIndex, u32>,
    len: usize,
}

static EMPTY_MULTISET: IntervalMultiset = IntervalMultiset::new();

impl IntervalMultiset {
    pub const fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
            len: 0,
        }
    }

    /// Add one occurrence of `index`
    pub fn insert(&mut self, index: IntervalIndex) {
        *self.counts.entry(index).or_insert(0) += 1;
        self.len += 1;
    }

    /// Number of occurrences recorded in `index` (0 if none)
    pub fn count(&self, index: IntervalIndex) -> u32 {
        self.counts.get(&index).copied().unwrap_or(0)
    }

    /// Total number of occurrences, counting multiplicity
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Highest interval index present, if any
    pub fn max_index(&self) -> Option<IntervalIndex> {
        self.counts.keys().next_back().copied()
    }

    /// Distinct interval indices, ascending
    pub fn distinct(&self) -> BTreeSet<IntervalIndex> {
        self.counts.keys().copied().collect()
    }

    /// Interval indices in ascending order, each repeated by its multiplicity
    pub fn iter(&self) -> impl Iterator<Item = IntervalIndex> + '_ {
        self.counts
            .iter()
            .flat_map(|(&index, &count)| std::iter::repeat(index).take(count as usize))
    }

    /// Per-index occurrence counts, ascending by index
    pub fn frequencies(&self) -> &BTreeMap<IntervalIndex, u32> {
        &self.counts
    }
}

impl FromIterator<IntervalIndex> for IntervalMultiset {
    fn from_iter<I: IntoIterator<Item = IntervalIndex>>(iter: I) -> Self {
        let mut multiset = Self::new();
        for index in iter {
            multiset.insert(index);
        }
        multiset
    }
}

impl TryFrom<BTreeMap<IntervalIndex, u32>> for IntervalMultiset {
    type Error = IoaError;

    fn try_from(counts: BTreeMap<IntervalIndex, u32>) -> Result<Self, Self::Error> {
        if let Some((index, _)) = counts.iter().find(|(_, count)| **count == 0) {
            return Err(IoaError::InvalidPartition(format!(
                "interval {} has a zero occurrence count",
                index
            )));
        }
        let len = counts.values().map(|&count| count as usize).sum();
        Ok(Self { counts, len })
    }
}

impl From<IntervalMultiset> for BTreeMap<IntervalIndex, u32> {
    fn from(multiset: IntervalMultiset) -> Self {
        multiset.counts
    }
}

/// One observer's session, discretized into fixed-width intervals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedPartitionedStream")]
pub struct PartitionedStream {
    /// Interval indices touched by each behavior's occurrences
    pub intervals_by_key: BTreeMap<BehaviorKey, IntervalMultiset>,
    /// Number of bins spanning the whole session (at least 1)
    pub total_intervals: u32,
}

#[derive(Deserialize)]
struct UncheckedPartitionedStream {
    intervals_by_key: BTreeMap<BehaviorKey, IntervalMultiset>,
    total_intervals: u32,
}

impl TryFrom<UncheckedPartitionedStream> for PartitionedStream {
    type Error = IoaError;

    fn try_from(unchecked: UncheckedPartitionedStream) -> Result<Self, Self::Error> {
        let stream = PartitionedStream {
            intervals_by_key: unchecked.intervals_by_key,
            total_intervals: unchecked.total_intervals,
        };
        stream.validate()?;
        Ok(stream)
    }
}

impl PartitionedStream {
    /// Check that there is at least one interval and every recorded index lies inside the session
    pub fn validate(&self) -> Result<(), IoaError> {
        if self.total_intervals == 0 {
            return Err(IoaError::InvalidPartition(
                "a partition needs at least one interval".to_string(),
            ));
        }
        for (key, multiset) in &self.intervals_by_key {
            if let Some(index) = multiset.max_index().filter(|&i| i >= self.total_intervals) {
                return Err(IoaError::InvalidPartition(format!(
                    "behavior {} uses interval {} but the session has {} intervals",
                    key, index, self.total_intervals
                )));
            }
        }
        Ok(())
    }

    /// Intervals recorded for `key`, or an empty multiset if the behavior never occurred
    pub fn intervals(&self, key: &BehaviorKey) -> &IntervalMultiset {
        self.intervals_by_key.get(key).unwrap_or(&EMPTY_MULTISET)
    }

    pub fn keys(&self) -> impl Iterator<Item = &BehaviorKey> {
        self.intervals_by_key.keys()
    }
}

/// Every behavior key recorded by either observer, in sorted order
pub fn key_union<'a>(
    a: &'a PartitionedStream,
    b: &'a PartitionedStream,
) -> BTreeSet<&'a BehaviorKey> {
    a.keys().chain(b.keys()).collect()
}

/// Interval-by-interval agreement for one behavior.
///
/// Read-only once built, so `average_score` always matches `scores`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalAgreementResult {
    key: BehaviorKey,
    /// Occurrences per interval recorded by the first observer
    counts1: Vec<u32>,
    /// Occurrences per interval recorded by the second observer
    counts2: Vec<u32>,
    /// Agreement score per interval, in [0, 1]
    scores: Vec<f64>,
    /// Mean of `scores`
    average_score: f64,
}

impl IntervalAgreementResult {
    pub fn new(key: BehaviorKey, counts1: Vec<u32>, counts2: Vec<u32>, scores: Vec<f64>) -> Self {
        let average_score = scores.iter().sum::<f64>() / scores.len() as f64;
        Self {
            key,
            counts1,
            counts2,
            scores,
            average_score,
        }
    }

    pub fn key(&self) -> &BehaviorKey {
        &self.key
    }

    pub fn counts1(&self) -> &[u32] {
        &self.counts1
    }

    pub fn counts2(&self) -> &[u32] {
        &self.counts2
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn average_score(&self) -> f64 {
        self.average_score
    }
}

/// Directional time-window agreement for one discrete behavior.
///
/// A direction is `None` when the observer it is measured from recorded no
/// occurrences of the behavior, so there is nothing to corroborate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindowResult {
    /// Fraction of the first observer's occurrences matched by the second
    pub score_a_to_b: Option<f64>,
    /// Fraction of the second observer's occurrences matched by the first
    pub score_b_to_a: Option<f64>,
}

impl TimeWindowResult {
    /// Mean of the defined directional scores
    pub fn mean(&self) -> Option<f64> {
        match (self.score_a_to_b, self.score_b_to_a) {
            (Some(a), Some(b)) => Some((a + b) / 2.0),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }
}

/// Jaccard similarity of the intervals a continuous behavior was "on", in [0, 1]
pub type ContinuousWindowResult = f64;
