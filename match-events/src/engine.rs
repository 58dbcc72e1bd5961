//! Main query API
//!
//! The [`QueryEngine`] answers read-only questions about a sequence of event
//! records. Every query is a single forward scan; nothing is indexed or cached,
//! and the input is never modified.
//!
//! Queries accept anything that iterates over `&EventRecord`, so the output of
//! a filter can be fed straight into another query:
//!
//! ```
//! use match_events::{EventRecord, QueryEngine};
//!
//! let records = vec![
//!     EventRecord::new().with_field("team_name", "Germany").with_field("period", "1"),
//!     EventRecord::new().with_field("team_name", "Scotland").with_field("period", "1"),
//! ];
//!
//! let engine = QueryEngine::default();
//! let germany = engine.filter_by_team(&records, "Germany").unwrap();
//! let again = engine.filter_by_team(germany.iter().copied(), "Germany").unwrap();
//! assert_eq!(germany, again);
//! ```

use crate::config::QueryConfig;
use crate::types::{fields, EventRecord, MatchMode, QueryError, Result};
use std::collections::{BTreeSet, HashMap};

/// The query engine - entry point for all dataset queries
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    config: QueryConfig,
}

impl QueryEngine {
    /// Create a query engine with the given configuration
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Distinct team names
    pub fn unique_teams<'a, I>(&self, records: I) -> Result<BTreeSet<&'a str>>
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        records
            .into_iter()
            .map(|r| r.get(fields::TEAM_NAME))
            .collect()
    }

    /// The event type that occurs most often
    ///
    /// Ties go to the event type seen first in the input. Fails with
    /// [`QueryError::EmptyDataset`] when there are no records.
    pub fn most_common_event_type<'a, I>(&self, records: I) -> Result<&'a str>
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        // Counts kept in first-seen order so the argmax is deterministic
        let mut order: Vec<(&'a str, usize)> = Vec::new();
        let mut index: HashMap<&'a str, usize> = HashMap::new();

        for record in records {
            let event_type = record.get(fields::EVENT_TYPE_NAME)?;
            match index.get(event_type) {
                Some(&slot) => order[slot].1 += 1,
                None => {
                    index.insert(event_type, order.len());
                    order.push((event_type, 1));
                }
            }
        }

        let mut best: Option<(&'a str, usize)> = None;
        for &(event_type, count) in &order {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((event_type, count));
            }
        }

        let (event_type, count) = best.ok_or(QueryError::EmptyDataset)?;
        log::debug!("Most common event type: {} ({} events)", event_type, count);
        Ok(event_type)
    }

    /// Records whose team name equals `team_name`, in input order
    pub fn filter_by_team<'a, I>(&self, records: I, team_name: &str) -> Result<Vec<&'a EventRecord>>
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        filter_field(records, fields::TEAM_NAME, team_name, MatchMode::Exact)
    }

    /// Count a team's events whose type contains `event_type`
    ///
    /// This is a substring match: a "Passback" event counts toward "Pass".
    pub fn count_event_type_by_team<'a, I>(
        &self,
        records: I,
        team_name: &str,
        event_type: &str,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        let team_records = self.filter_by_team(records, team_name)?;
        let count = count_field(
            team_records,
            fields::EVENT_TYPE_NAME,
            event_type,
            MatchMode::Contains,
        )?;

        log::debug!("{} events of type *{}* for {}", count, event_type, team_name);
        Ok(count)
    }

    /// Mean pass length for a team, rounded to the configured precision
    ///
    /// Records with an empty pass length are left out entirely. Fails with
    /// [`QueryError::EmptyAggregate`] if no record qualifies.
    pub fn average_pass_length_by_team<'a, I>(&self, records: I, team_name: &str) -> Result<f64>
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        let mut total = 0.0;
        let mut count = 0usize;

        for record in self.filter_by_team(records, team_name)? {
            if let Some(length) = self.parse_number(record, fields::PASS_LENGTH)? {
                total += length;
                count += 1;
            }
        }

        if count == 0 {
            return Err(QueryError::EmptyAggregate(team_name.to_string()));
        }

        let average = self.config.round(total / count as f64);
        log::debug!("Average pass length for {}: {} over {} passes", team_name, average, count);
        Ok(average)
    }

    /// Distinct names of players listed at `position_name`
    pub fn players_by_position<'a, I>(
        &self,
        records: I,
        position_name: &str,
    ) -> Result<BTreeSet<&'a str>>
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        let mut players = BTreeSet::new();
        let at_position = filter_field(
            records,
            fields::PLAYER_POSITION_NAME,
            position_name,
            MatchMode::Exact,
        )?;
        for record in at_position {
            players.insert(record.get(fields::PLAYER_NAME)?);
        }
        Ok(players)
    }

    /// Count passes whose success probability is above the threshold
    pub fn count_successful_passes<'a, I>(&self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        let mut count = 0;
        for record in records {
            let probability = self.parse_number(record, fields::PASS_SUCCESS_PROBABILITY)?;
            if probability.map_or(false, |p| self.config.is_successful(p)) {
                count += 1;
            }
        }

        log::debug!("{} successful passes (> {})", count, self.config.success_threshold);
        Ok(count)
    }

    /// Records from the given period, in input order
    ///
    /// Periods are compared as text, so "1" does not match "01".
    pub fn filter_by_period<'a, I>(&self, records: I, period: &str) -> Result<Vec<&'a EventRecord>>
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        filter_field(records, fields::PERIOD, period, MatchMode::Exact)
    }

    /// Count shots taken by `player_name`
    pub fn count_shots_by_player<'a, I>(&self, records: I, player_name: &str) -> Result<usize>
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        let player_records =
            filter_field(records, fields::PLAYER_NAME, player_name, MatchMode::Exact)?;
        count_field(
            player_records,
            fields::EVENT_TYPE_NAME,
            &self.config.shot_event_type,
            MatchMode::Exact,
        )
    }

    /// Parse a numeric cell, honouring `skip_malformed_numbers`
    fn parse_number(&self, record: &EventRecord, field: &str) -> Result<Option<f64>> {
        match record.get_f64(field) {
            Err(QueryError::InvalidNumber { value, .. }) if self.config.skip_malformed_numbers => {
                log::debug!("Skipping malformed {} value {:?}", field, value);
                Ok(None)
            }
            other => other,
        }
    }
}

/// Keep the records whose `field` matches `pattern`
fn filter_field<'a, I>(
    records: I,
    field: &str,
    pattern: &str,
    mode: MatchMode,
) -> Result<Vec<&'a EventRecord>>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let mut matched = Vec::new();
    for record in records {
        if mode.matches(record.get(field)?, pattern) {
            matched.push(record);
        }
    }
    Ok(matched)
}

/// Count the records whose `field` matches `pattern`
fn count_field<'a, I>(records: I, field: &str, pattern: &str, mode: MatchMode) -> Result<usize>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let mut count = 0;
    for record in records {
        if mode.matches(record.get(field)?, pattern) {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(
        team: &str,
        event_type: &str,
        player: &str,
        position: &str,
        pass_length: &str,
        success: &str,
        period: &str,
    ) -> EventRecord {
        EventRecord::from_iter([
            (fields::TEAM_NAME, team),
            (fields::EVENT_TYPE_NAME, event_type),
            (fields::PLAYER_NAME, player),
            (fields::PLAYER_POSITION_NAME, position),
            (fields::PASS_LENGTH, pass_length),
            (fields::PASS_SUCCESS_PROBABILITY, success),
            (fields::PERIOD, period),
        ])
    }

    fn sample() -> Vec<EventRecord> {
        vec![
            event("Germany", "Pass", "Kroos", "Midfield", "18.3", "0.6", "1"),
            event("Scotland", "Pass", "Robertson", "Defender", "22.0", "0.55", "1"),
            event("Germany", "Shot", "Havertz", "Forward", "", "", "1"),
            event("Germany", "Passback", "Kroos", "Midfield", "5.1", "0.9", "2"),
            event("Scotland", "Shot", "McTominay", "Midfield", "", "", "2"),
            event("Germany", "Shot", "Havertz", "Forward", "", "", "2"),
            event("Germany", "Pressure", "Havertz", "Forward", "", "", "2"),
        ]
    }

    #[test]
    fn test_unique_teams() {
        let records = sample();
        let engine = QueryEngine::default();

        let teams = engine.unique_teams(&records).unwrap();
        assert_eq!(teams.into_iter().collect::<Vec<_>>(), vec!["Germany", "Scotland"]);

        let none: Vec<EventRecord> = Vec::new();
        assert!(engine.unique_teams(&none).unwrap().is_empty());
    }

    #[test]
    fn test_most_common_event_type() {
        let records = sample();
        let engine = QueryEngine::default();

        // Shot: 3, Pass: 2
        assert_eq!(engine.most_common_event_type(&records).unwrap(), "Shot");
    }

    #[test]
    fn test_most_common_tie_goes_to_first_seen() {
        let engine = QueryEngine::default();
        let records = vec![
            event("Germany", "Shot", "A", "Forward", "", "", "1"),
            event("Germany", "Pass", "A", "Forward", "", "", "1"),
            event("Germany", "Pass", "A", "Forward", "", "", "1"),
            event("Germany", "Shot", "A", "Forward", "", "", "1"),
        ];

        assert_eq!(engine.most_common_event_type(&records).unwrap(), "Shot");
    }

    #[test]
    fn test_most_common_empty() {
        let engine = QueryEngine::default();
        let none: Vec<EventRecord> = Vec::new();
        assert!(matches!(
            engine.most_common_event_type(&none),
            Err(QueryError::EmptyDataset)
        ));
    }

    #[test]
    fn test_filter_by_team_preserves_order() {
        let records = sample();
        let engine = QueryEngine::default();

        let germany = engine.filter_by_team(&records, "Germany").unwrap();
        assert_eq!(germany.len(), 5);
        assert!(germany.iter().all(|r| r.get(fields::TEAM_NAME).unwrap() == "Germany"));

        let types: Vec<&str> = germany
            .iter()
            .map(|r| r.get(fields::EVENT_TYPE_NAME).unwrap())
            .collect();
        assert_eq!(types, vec!["Pass", "Shot", "Passback", "Shot", "Pressure"]);

        let again = engine.filter_by_team(germany.iter().copied(), "Germany").unwrap();
        assert_eq!(again, germany);

        assert!(engine.filter_by_team(&records, "germany").unwrap().is_empty());
    }

    #[test]
    fn test_count_event_type_by_team_uses_substring() {
        let records = sample();
        let engine = QueryEngine::default();

        assert_eq!(engine.count_event_type_by_team(&records, "Germany", "Pass").unwrap(), 2);
        assert_eq!(engine.count_event_type_by_team(&records, "Germany", "Shot").unwrap(), 2);
        assert_eq!(engine.count_event_type_by_team(&records, "Scotland", "Pass").unwrap(), 1);
        assert_eq!(engine.count_event_type_by_team(&records, "Wales", "Pass").unwrap(), 0);
    }

    #[test]
    fn test_average_pass_length() {
        let records = sample();
        let engine = QueryEngine::default();

        // (18.3 + 5.1) / 2 = 11.7
        assert_eq!(engine.average_pass_length_by_team(&records, "Germany").unwrap(), 11.7);
        assert_eq!(engine.average_pass_length_by_team(&records, "Scotland").unwrap(), 22.0);
    }

    #[test]
    fn test_average_pass_length_rounds() {
        let engine = QueryEngine::default();
        let records = vec![
            event("Germany", "Pass", "A", "Forward", "10.0", "", "1"),
            event("Germany", "Pass", "A", "Forward", "10.0", "", "1"),
            event("Germany", "Pass", "A", "Forward", "10.5", "", "1"),
        ];

        // 30.5 / 3 = 10.1666...
        assert_eq!(engine.average_pass_length_by_team(&records, "Germany").unwrap(), 10.2);
    }

    #[test]
    fn test_average_pass_length_without_passes() {
        let records = sample();
        let engine = QueryEngine::default();

        let err = engine.average_pass_length_by_team(&records, "Wales").unwrap_err();
        assert!(matches!(err, QueryError::EmptyAggregate(ref team) if team == "Wales"));
    }

    #[test]
    fn test_malformed_pass_length() {
        let records = vec![
            event("Germany", "Pass", "A", "Forward", "long", "", "1"),
            event("Germany", "Pass", "A", "Forward", "12.0", "", "1"),
        ];

        let strict = QueryEngine::default();
        assert!(matches!(
            strict.average_pass_length_by_team(&records, "Germany"),
            Err(QueryError::InvalidNumber { .. })
        ));

        let lenient = QueryEngine::new(QueryConfig::new().with_skip_malformed_numbers(true));
        assert_eq!(lenient.average_pass_length_by_team(&records, "Germany").unwrap(), 12.0);
    }

    #[test]
    fn test_players_by_position() {
        let records = sample();
        let engine = QueryEngine::default();

        let midfield = engine.players_by_position(&records, "Midfield").unwrap();
        assert_eq!(midfield.into_iter().collect::<Vec<_>>(), vec!["Kroos", "McTominay"]);

        let forwards = engine.players_by_position(&records, "Forward").unwrap();
        assert_eq!(forwards.len(), 1);

        assert!(engine.players_by_position(&records, "Goalkeeper").unwrap().is_empty());
    }

    #[test]
    fn test_count_successful_passes() {
        let records = sample();
        let engine = QueryEngine::default();

        // 0.6 and 0.9 count, 0.55 does not
        assert_eq!(engine.count_successful_passes(&records).unwrap(), 2);

        let boundary = vec![event("Germany", "Pass", "A", "Forward", "", "0.5501", "1")];
        assert_eq!(engine.count_successful_passes(&boundary).unwrap(), 1);

        let strict = QueryEngine::new(QueryConfig::new().with_success_threshold(0.8));
        assert_eq!(strict.config().success_threshold, 0.8);
        assert_eq!(strict.count_successful_passes(&records).unwrap(), 1);
    }

    #[test]
    fn test_filter_by_period() {
        let records = sample();
        let engine = QueryEngine::default();

        assert_eq!(engine.filter_by_period(&records, "1").unwrap().len(), 3);
        assert_eq!(engine.filter_by_period(&records, "2").unwrap().len(), 4);
        assert!(engine.filter_by_period(&records, "01").unwrap().is_empty());
    }

    #[test]
    fn test_count_shots_by_player() {
        let records = sample();
        let engine = QueryEngine::default();

        assert_eq!(engine.count_shots_by_player(&records, "Havertz").unwrap(), 2);
        assert_eq!(engine.count_shots_by_player(&records, "Kroos").unwrap(), 0);
        assert_eq!(engine.count_shots_by_player(&records, "Nobody").unwrap(), 0);
    }

    #[test]
    fn test_missing_field_fails_fast() {
        let engine = QueryEngine::default();
        let records = vec![EventRecord::new().with_field(fields::PLAYER_NAME, "A")];

        assert!(matches!(
            engine.filter_by_team(&records, "Germany"),
            Err(QueryError::MissingField(ref f)) if f == "team_name"
        ));
    }
}
