//! Agreement pipeline orchestration
//!
//! This module provides the public entry points for comparing two observers'
//! sessions: raw session → interval partition → requested agreement metric.

use crate::config::{IoaConfig, IoaMethod};
use crate::error::IoaError;
use crate::interval::{exact_agreement, partial_agreement};
use crate::partition::partition;
use crate::session::parse_session;
use crate::types::{
    BehaviorKey, ContinuousWindowResult, IntervalAgreementResult, RawSession, TimeWindowResult,
};
use crate::window::{window_agreement_continuous, window_agreement_discrete};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Outcome of one comparison, shaped by the metric that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum IoaReport {
    Exact {
        behaviors: BTreeMap<BehaviorKey, IntervalAgreementResult>,
    },
    Partial {
        behaviors: BTreeMap<BehaviorKey, IntervalAgreementResult>,
    },
    TimeWindow {
        /// Tolerance used for discrete matching, in intervals
        threshold: u32,
        discrete: BTreeMap<BehaviorKey, TimeWindowResult>,
        continuous: BTreeMap<BehaviorKey, ContinuousWindowResult>,
    },
}

impl IoaReport {
    pub fn method(&self) -> IoaMethod {
        match self {
            IoaReport::Exact { .. } => IoaMethod::Exact,
            IoaReport::Partial { .. } => IoaMethod::Partial,
            IoaReport::TimeWindow { .. } => IoaMethod::TimeWindow,
        }
    }

    /// One headline agreement figure per behavior.
    ///
    /// Interval metrics report the mean interval score; discrete time-window
    /// results report the mean of both directions; continuous time-window results
    /// report the Jaccard index. Behaviors with no defined score are omitted.
    pub fn average_by_key(&self) -> BTreeMap<BehaviorKey, f64> {
        match self {
            IoaReport::Exact { behaviors } | IoaReport::Partial { behaviors } => behaviors
                .iter()
                .map(|(key, result)| (key.clone(), result.average_score()))
                .collect(),
            IoaReport::TimeWindow {
                discrete,
                continuous,
                ..
            } => discrete
                .iter()
                .filter_map(|(key, result)| result.mean().map(|mean| (key.clone(), mean)))
                .chain(continuous.iter().map(|(key, &score)| (key.clone(), score)))
                .collect(),
        }
    }

    /// Serialize the report for the display layer
    pub fn to_json(&self) -> Result<String, IoaError> {
        serde_json::to_string(self).map_err(|e| IoaError::EncodingError(e.to_string()))
    }
}

/// Compare two observers' sessions with the metric named in `config` (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let config = IoaConfig::new(IoaMethod::Partial).with_block_size_secs(10);
/// let report = compare_sessions(&primary, &reliability, &config)?;
/// ```
pub fn compare_sessions(
    first: &RawSession,
    second: &RawSession,
    config: &IoaConfig,
) -> Result<IoaReport, IoaError> {
    config.validate()?;
    first.validate()?;
    second.validate()?;

    let bin_width = config.bin_width_millis();
    debug!(
        method = config.method.as_str(),
        bin_width_millis = bin_width,
        first_millis = first.total_time_millis,
        second_millis = second.total_time_millis,
        "comparing sessions"
    );

    let report = match config.method {
        IoaMethod::Exact | IoaMethod::Partial => {
            // Discrete and continuous behaviors are scored side by side
            let a = partition(&first.combined_stream(), first.total_time_millis, bin_width)?;
            let b = partition(&second.combined_stream(), second.total_time_millis, bin_width)?;

            if config.method == IoaMethod::Exact {
                IoaReport::Exact {
                    behaviors: exact_agreement(&a, &b),
                }
            } else {
                IoaReport::Partial {
                    behaviors: partial_agreement(&a, &b),
                }
            }
        }
        IoaMethod::TimeWindow => {
            let discrete_a =
                partition(first.discrete_stream(), first.total_time_millis, bin_width)?;
            let discrete_b =
                partition(second.discrete_stream(), second.total_time_millis, bin_width)?;
            let continuous_a =
                partition(first.continuous_stream(), first.total_time_millis, bin_width)?;
            let continuous_b =
                partition(second.continuous_stream(), second.total_time_millis, bin_width)?;

            IoaReport::TimeWindow {
                threshold: config.threshold,
                discrete: window_agreement_discrete(&discrete_a, &discrete_b, config.threshold),
                continuous: window_agreement_continuous(&continuous_a, &continuous_b),
            }
        }
    };

    Ok(report)
}

/// Reusable comparator bound to one validated configuration.
///
/// Holds no state between comparisons, so a single processor can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct IoaProcessor {
    config: IoaConfig,
}

impl IoaProcessor {
    /// Create a processor, rejecting an unusable configuration up front
    pub fn new(config: IoaConfig) -> Result<Self, IoaError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IoaConfig {
        &self.config
    }

    /// Compare two sessions
    pub fn process(
        &self,
        first: &RawSession,
        second: &RawSession,
    ) -> Result<IoaReport, IoaError> {
        compare_sessions(first, second, &self.config)
    }

    /// Compare two sessions given as the recorder's raw session JSON
    pub fn process_json(
        &self,
        first_json: &str,
        second_json: &str,
    ) -> Result<IoaReport, IoaError> {
        let first = parse_session(first_json)?;
        let second = parse_session(second_json)?;
        self.process(&first, &second)
    }
}
