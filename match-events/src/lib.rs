//! Match Events Library
//!
//! A small, reusable library for loading tabular sports-event data (CSV) and
//! answering aggregate and filter queries over it.
//!
//! # Architecture
//!
//! This library is intentionally minimal:
//! - Loads delimited text into an immutable, in-memory [`Dataset`]
//! - Keeps every cell as a raw string until a query needs a number
//! - Answers queries with a stateless [`QueryEngine`], one linear scan each
//!
//! The library does NOT:
//! - Build indexes or cache results
//! - Decide which queries to run
//! - Render reports
//!
//! All higher-level functionality is in the application layer (match-events-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use match_events::{Dataset, QueryConfig, QueryEngine};
//! use std::path::Path;
//!
//! let dataset = Dataset::from_path(Path::new("match.csv")).unwrap();
//!
//! let engine = QueryEngine::new(QueryConfig::new().with_success_threshold(0.55));
//!
//! let teams = engine.unique_teams(&dataset).unwrap();
//! println!("Teams: {:?}", teams);
//!
//! let germany = engine.filter_by_team(&dataset, "Germany").unwrap();
//! let passes = engine.count_event_type_by_team(germany, "Germany", "Pass").unwrap();
//! println!("Germany passes: {}", passes);
//! ```

// Public modules
pub mod config;
pub mod dataset;
pub mod engine;
pub mod types;

// Re-export main types for convenience
pub use config::QueryConfig;
pub use dataset::{Dataset, DatasetLoader, DatasetStats};
pub use engine::QueryEngine;
pub use types::{fields, EventRecord, MatchMode, QueryError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: an empty dataset answers queries without records
        let dataset = Dataset::default();
        let engine = QueryEngine::default();
        assert_eq!(dataset.stats().num_records, 0);
        assert!(engine.unique_teams(&dataset).unwrap().is_empty());
        assert_eq!(engine.count_successful_passes(&dataset).unwrap(), 0);
    }
}
