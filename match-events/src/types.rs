//! Core types for the match events library
//!
//! This module defines the record model every query works on. Records are kept
//! exactly as they were read from the tabular source: every value is a string
//! until a query needs to interpret it as a number.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Result type for query and loading operations
pub type Result<T> = std::result::Result<T, QueryError>;

/// Well-known column names used by the queries
pub mod fields {
    pub const TEAM_NAME: &str = "team_name";
    pub const EVENT_TYPE_NAME: &str = "event_type_name";
    pub const PLAYER_NAME: &str = "player_name";
    pub const PLAYER_POSITION_NAME: &str = "player_position_name";
    pub const PASS_LENGTH: &str = "pass_length";
    pub const PASS_SUCCESS_PROBABILITY: &str = "pass_success_probability";
    pub const PERIOD: &str = "period";
}

/// Errors that can occur while loading or querying event records
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid number in field {field}: {value:?}")]
    InvalidNumber { field: String, value: String },

    #[error("No qualifying records to aggregate for team {0:?}")]
    EmptyAggregate(String),

    #[error("Dataset contains no records")]
    EmptyDataset,

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A single event row: field name mapped to its raw string value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventRecord {
    fields: HashMap<String, String>,
}

impl EventRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set a field value
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Look up a field, failing if the record does not carry it
    pub fn get(&self, field: &str) -> Result<&str> {
        self.fields
            .get(field)
            .map(String::as_str)
            .ok_or_else(|| QueryError::MissingField(field.to_string()))
    }

    /// Look up a field without failing
    pub fn try_get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Parse a numeric field
    ///
    /// Empty cells mean "not applicable" and yield `Ok(None)`. Surrounding
    /// whitespace is ignored.
    pub fn get_f64(&self, field: &str) -> Result<Option<f64>> {
        let raw = self.get(field)?.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        raw.parse::<f64>()
            .map(Some)
            .map_err(|_| QueryError::InvalidNumber {
                field: field.to_string(),
                value: raw.to_string(),
            })
    }
}

impl<K, V> FromIterator<(K, V)> for EventRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// How a query compares a record value against its argument
///
/// Almost every query uses exact equality. Counting events by team and type
/// uses substring containment, so "Passback" counts toward "Pass".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Value must equal the argument
    Exact,
    /// Value must contain the argument
    Contains,
}

impl MatchMode {
    /// Check a record value against a query argument
    pub fn matches(&self, value: &str, pattern: &str) -> bool {
        match self {
            MatchMode::Exact => value == pattern,
            MatchMode::Contains => value.contains(pattern),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Exact => write!(f, "exact"),
            MatchMode::Contains => write!(f, "contains"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field() {
        let record = EventRecord::new().with_field(fields::TEAM_NAME, "Germany");
        assert_eq!(record.get(fields::TEAM_NAME).unwrap(), "Germany");

        let err = record.get(fields::PERIOD).unwrap_err();
        assert!(matches!(err, QueryError::MissingField(ref f) if f == "period"));
        assert_eq!(record.try_get(fields::PERIOD), None);
    }

    #[test]
    fn test_numeric_parsing() {
        let record = EventRecord::from_iter([
            (fields::PASS_LENGTH, " 18.3 "),
            (fields::PASS_SUCCESS_PROBABILITY, ""),
            (fields::PERIOD, "first"),
        ]);

        assert_eq!(record.get_f64(fields::PASS_LENGTH).unwrap(), Some(18.3));
        assert_eq!(record.get_f64(fields::PASS_SUCCESS_PROBABILITY).unwrap(), None);
        assert!(matches!(
            record.get_f64(fields::PERIOD),
            Err(QueryError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_match_modes() {
        assert!(MatchMode::Exact.matches("Pass", "Pass"));
        assert!(!MatchMode::Exact.matches("Passback", "Pass"));
        assert!(MatchMode::Contains.matches("Passback", "Pass"));
        assert!(!MatchMode::Contains.matches("Shot", "Pass"));
        assert_eq!(format!("{}", MatchMode::Contains), "contains");
    }
}
