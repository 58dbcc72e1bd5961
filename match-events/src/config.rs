//! Query engine configuration
//!
//! The defaults match the standard event-data conventions. Everything else
//! (which files to read, which queries to run, report formats) belongs to the
//! application layer.

use serde::{Deserialize, Serialize};

/// Configuration for the query engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// A pass counts as successful when its probability is strictly above this
    #[serde(default = "default_success_threshold")]
    pub success_threshold: f64,

    /// Event type name counted by the shots query (exact match)
    #[serde(default = "default_shot_event_type")]
    pub shot_event_type: String,

    /// Decimal places kept by the average pass length query
    #[serde(default = "default_average_precision")]
    pub average_precision: u32,

    /// Treat non-numeric pass cells like empty ones instead of failing
    #[serde(default)]
    pub skip_malformed_numbers: bool,
}

fn default_success_threshold() -> f64 {
    0.55
}

fn default_shot_event_type() -> String {
    "Shot".to_string()
}

fn default_average_precision() -> u32 {
    1
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            success_threshold: default_success_threshold(),
            shot_event_type: default_shot_event_type(),
            average_precision: default_average_precision(),
            skip_malformed_numbers: false,
        }
    }
}

impl QueryConfig {
    /// Create a new query configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the successful pass threshold
    pub fn with_success_threshold(mut self, threshold: f64) -> Self {
        self.success_threshold = threshold;
        self
    }

    /// Builder method: set the event type counted as a shot
    pub fn with_shot_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.shot_event_type = event_type.into();
        self
    }

    /// Builder method: set the rounding precision of averages
    pub fn with_average_precision(mut self, places: u32) -> Self {
        self.average_precision = places;
        self
    }

    /// Builder method: skip malformed numeric cells
    pub fn with_skip_malformed_numbers(mut self, enabled: bool) -> Self {
        self.skip_malformed_numbers = enabled;
        self
    }

    /// Round a value to the configured number of decimal places
    pub fn round(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.average_precision as i32);
        (value * factor).round() / factor
    }

    /// Check whether a pass success probability counts as successful
    pub fn is_successful(&self, probability: f64) -> bool {
        probability > self.success_threshold
    }
}
