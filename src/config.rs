//! Configuration for an agreement comparison.

use crate::error::IoaError;
use serde::{Deserialize, Serialize};

/// Agreement metric requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IoaMethod {
    /// Interval scores 1 only when both observers counted the same occurrences
    #[default]
    Exact,
    /// Interval scores are the ratio of the smaller to the larger count
    Partial,
    /// Occurrence matching within a tolerance window (discrete) and
    /// interval overlap (continuous)
    TimeWindow,
}

impl IoaMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            IoaMethod::Exact => "exact",
            IoaMethod::Partial => "partial",
            IoaMethod::TimeWindow => "time_window",
        }
    }
}

/// Parameters for comparing two observers' sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoaConfig {
    /// Which agreement metric to compute
    #[serde(default)]
    pub method: IoaMethod,

    /// Width of each interval ("block") in seconds
    #[serde(default = "default_block_size_secs")]
    pub block_size_secs: u32,

    /// Time-window tolerance, in intervals either side of an occurrence
    #[serde(default = "default_threshold")]
    pub threshold: u32,
}

fn default_block_size_secs() -> u32 {
    1
}

fn default_threshold() -> u32 {
    1
}

impl Default for IoaConfig {
    fn default() -> Self {
        Self {
            method: IoaMethod::default(),
            block_size_secs: default_block_size_secs(),
            threshold: default_threshold(),
        }
    }
}

impl IoaConfig {
    pub fn new(method: IoaMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_block_size_secs(mut self, block_size_secs: u32) -> Self {
        self.block_size_secs = block_size_secs;
        self
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Interval width in milliseconds
    pub fn bin_width_millis(&self) -> u64 {
        u64::from(self.block_size_secs) * 1000
    }

    /// Reject settings the engine cannot compute with.
    pub fn validate(&self) -> Result<(), IoaError> {
        if self.block_size_secs == 0 {
            return Err(IoaError::InvalidConfig(
                "block size must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, IoaError> {
        let config: IoaConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IoaConfig::default();
        assert_eq!(config.method, IoaMethod::Exact);
        assert_eq!(config.block_size_secs, 1);
        assert_eq!(config.threshold, 1);
        assert_eq!(config.bin_width_millis(), 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = IoaConfig::new(IoaMethod::TimeWindow)
            .with_block_size_secs(5)
            .with_threshold(2);
        assert_eq!(config.method, IoaMethod::TimeWindow);
        assert_eq!(config.bin_width_millis(), 5000);
        assert_eq!(config.threshold, 2);
    }

    #[test]
    fn test_zero_block_size_rejected() {
        let config = IoaConfig::default().with_block_size_secs(0);
        assert!(matches!(config.validate(), Err(IoaError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = IoaConfig::from_json(r#"{ "method": "partial" }"#).unwrap();
        assert_eq!(config.method, IoaMethod::Partial);
        assert_eq!(config.block_size_secs, 1);

        assert!(IoaConfig::from_json(r#"{ "block_size_secs": 0 }"#).is_err());
        assert!(IoaConfig::from_json(r#"{ "method": "nearest" }"#).is_err());
    }

    #[test]
    fn test_method_names_match_serde() {
        for method in [IoaMethod::Exact, IoaMethod::Partial, IoaMethod::TimeWindow] {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.as_str()));
        }
    }
}
