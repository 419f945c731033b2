//! Observer IOA - Inter-observer agreement engine for behavioral observation sessions
//!
//! Two observers record the same timed session independently. This crate turns
//! each observer's raw event stream into fixed-width interval data and scores
//! how well the two recordings agree, through a deterministic pipeline:
//! session validation → interval partitioning → agreement metric.
//!
//! ## Metrics
//!
//! - **Exact / partial interval agreement**: per-interval occurrence counts compared
//!   for every behavior either observer recorded
//! - **Time-window agreement**: tolerance-based occurrence matching for discrete
//!   behaviors and interval-overlap (Jaccard) similarity for continuous behaviors
//!
//! All computation is synchronous and stateless; every call works on its own copies.

pub mod config;
pub mod error;
pub mod interval;
pub mod partition;
pub mod pipeline;
pub mod session;
pub mod types;
pub mod window;

pub use config::{IoaConfig, IoaMethod};
pub use error::IoaError;
pub use interval::{exact_agreement, partial_agreement};
pub use partition::{partition, IntervalSource, Occurrence};
pub use pipeline::{compare_sessions, IoaProcessor, IoaReport};
pub use session::parse_session;
pub use types::{
    BehaviorKey, ContinuousWindowResult, IntervalAgreementResult, IntervalMultiset,
    PartitionedStream, RawSession, StartEndTimes, TimeWindowResult,
};
pub use window::{window_agreement_continuous, window_agreement_discrete};

