//! Raw session adapter
//!
//! Reads an observer's recorded session and hands its occurrences to the
//! partitioner as discrete, continuous or combined streams.

use crate::error::IoaError;
use crate::partition::Occurrence;
use crate::types::{BehaviorKey, RawSession, StartEndTimes};
use std::collections::BTreeMap;

/// Parse a recorded session from the recorder's raw JSON and validate it.
pub fn parse_session(json: &str) -> Result<RawSession, IoaError> {
    let session: RawSession = serde_json::from_str(json)?;
    session.validate()?;
    Ok(session)
}

impl RawSession {
    pub fn new(total_time_millis: u64) -> Self {
        Self {
            total_time_millis,
            ..Self::default()
        }
    }

    /// Check that every continuous occurrence ends no earlier than it starts.
    ///
    /// Occurrences stamped past `total_time_millis` are allowed; the partitioner
    /// folds them into the last interval.
    pub fn validate(&self) -> Result<(), IoaError> {
        for (key, spans) in &self.continuous_events {
            if let Some(span) = spans.iter().find(|span| span.end < span.start) {
                return Err(IoaError::InvalidSession(format!(
                    "behavior {} ends at {} ms before it starts at {} ms",
                    key, span.end, span.start
                )));
            }
        }
        Ok(())
    }

    /// Timestamps of momentary behaviors, per behavior
    pub fn discrete_stream(&self) -> &BTreeMap<BehaviorKey, Vec<u64>> {
        &self.discrete_events
    }

    /// Start/end pairs of durational behaviors, per behavior
    pub fn continuous_stream(&self) -> &BTreeMap<BehaviorKey, Vec<StartEndTimes>> {
        &self.continuous_events
    }

    /// Both kinds of occurrences merged under their behavior keys.
    ///
    /// Interval-by-interval metrics score discrete and continuous behaviors
    /// side by side from this single stream.
    pub fn combined_stream(&self) -> BTreeMap<BehaviorKey, Vec<Occurrence>> {
        let mut combined: BTreeMap<BehaviorKey, Vec<Occurrence>> = BTreeMap::new();

        for (key, times) in &self.discrete_events {
            combined
                .entry(key.clone())
                .or_default()
                .extend(times.iter().copied().map(Occurrence::Discrete));
        }
        for (key, spans) in &self.continuous_events {
            combined
                .entry(key.clone())
                .or_default()
                .extend(spans.iter().copied().map(Occurrence::Continuous));
        }

        combined
    }

    /// Record a momentary behavior occurrence
    pub fn with_discrete(mut self, key: impl Into<BehaviorKey>, times: Vec<u64>) -> Self {
        self.discrete_events.insert(key.into(), times);
        self
    }

    /// Record a durational behavior's occurrences
    pub fn with_continuous(
        mut self,
        key: impl Into<BehaviorKey>,
        spans: Vec<StartEndTimes>,
    ) -> Self {
        self.continuous_events.insert(key.into(), spans);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_session() {
        let json = r#"{
            "totalTimeMillis": 1700,
            "discreteEvents": { "d": [0, 1100, 1700] },
            "continuousEvents": { "c": [{ "start": 0, "end": 1000 }] }
        }"#;

        let session = parse_session(json).unwrap();
        assert_eq!(
            session,
            RawSession::new(1700)
                .with_discrete("d", vec![0, 1100, 1700])
                .with_continuous("c", vec![StartEndTimes::new(0, 1000)])
        );
    }

    #[test]
    fn test_parse_session_without_events() {
        let session = parse_session(r#"{ "totalTimeMillis": 60000 }"#).unwrap();
        assert!(session.discrete_events.is_empty());
        assert!(session.continuous_events.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            parse_session("not valid json"),
            Err(IoaError::JsonError(_))
        ));
        assert!(parse_session(r#"{ "totalTimeMillis": -5 }"#).is_err());
    }

    #[test]
    fn test_reversed_span_rejected() {
        let json = r#"{
            "totalTimeMillis": 5000,
            "continuousEvents": { "c": [{ "start": 3000, "end": 1000 }] }
        }"#;

        assert!(matches!(
            parse_session(json),
            Err(IoaError::InvalidSession(_))
        ));
    }

    #[test]
    fn test_combined_stream_merges_both_kinds() {
        let session = RawSession::new(3000)
            .with_discrete("d", vec![100])
            .with_continuous("c", vec![StartEndTimes::new(0, 2000)])
            .with_discrete("x", vec![2500])
            .with_continuous("x", vec![StartEndTimes::new(0, 500)]);

        let combined = session.combined_stream();

        assert_eq!(combined.len(), 3);
        assert_eq!(combined[&BehaviorKey::from("d")], vec![Occurrence::Discrete(100)]);
        assert_eq!(
            combined[&BehaviorKey::from("x")],
            vec![
                Occurrence::Discrete(2500),
                Occurrence::Continuous(StartEndTimes::new(0, 500)),
            ]
        );
    }
}
