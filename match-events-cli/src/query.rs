//! Query dispatch
//!
//! Maps a requested query (from the command line or the config file) onto the
//! engine and converts the borrowed result into an owned, serializable outcome.

use anyhow::{Context, Result};
use clap::Subcommand;
use match_events::{fields, Dataset, DatasetStats, EventRecord, QueryEngine};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single query against a dataset
#[derive(Subcommand, Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuerySpec {
    /// List the distinct team names
    UniqueTeams,
    /// Show the most frequent event type
    MostCommonEventType,
    /// List the events of one team
    FilterByTeam {
        #[arg(long)]
        team: String,
    },
    /// Count a team's events whose type contains the given text
    CountEventTypeByTeam {
        #[arg(long)]
        team: String,
        #[arg(long)]
        event_type: String,
    },
    /// Average pass length for one team
    AveragePassLengthByTeam {
        #[arg(long)]
        team: String,
    },
    /// List the players at a position
    PlayersByPosition {
        #[arg(long)]
        position: String,
    },
    /// Count passes above the success threshold
    CountSuccessfulPasses,
    /// List the events of one period
    FilterByPeriod {
        #[arg(long)]
        period: String,
    },
    /// Count the shots of one player
    CountShotsByPlayer {
        #[arg(long)]
        player: String,
    },
    /// Dataset overview: size, teams, most common event, successful passes
    Summary,
}

impl fmt::Display for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuerySpec::UniqueTeams => write!(f, "unique teams"),
            QuerySpec::MostCommonEventType => write!(f, "most common event type"),
            QuerySpec::FilterByTeam { team } => write!(f, "events for team {:?}", team),
            QuerySpec::CountEventTypeByTeam { team, event_type } => {
                write!(f, "count of *{}* events for team {:?}", event_type, team)
            }
            QuerySpec::AveragePassLengthByTeam { team } => {
                write!(f, "average pass length for team {:?}", team)
            }
            QuerySpec::PlayersByPosition { position } => {
                write!(f, "players at position {:?}", position)
            }
            QuerySpec::CountSuccessfulPasses => write!(f, "successful passes"),
            QuerySpec::FilterByPeriod { period } => write!(f, "events in period {:?}", period),
            QuerySpec::CountShotsByPlayer { player } => write!(f, "shots by player {:?}", player),
            QuerySpec::Summary => write!(f, "summary"),
        }
    }
}

impl QuerySpec {
    /// Columns a dataset must carry for this query
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            QuerySpec::UniqueTeams | QuerySpec::FilterByTeam { .. } => &[fields::TEAM_NAME],
            QuerySpec::MostCommonEventType => &[fields::EVENT_TYPE_NAME],
            QuerySpec::CountEventTypeByTeam { .. } => &[fields::TEAM_NAME, fields::EVENT_TYPE_NAME],
            QuerySpec::AveragePassLengthByTeam { .. } => &[fields::TEAM_NAME, fields::PASS_LENGTH],
            QuerySpec::PlayersByPosition { .. } => {
                &[fields::PLAYER_POSITION_NAME, fields::PLAYER_NAME]
            }
            QuerySpec::CountSuccessfulPasses => &[fields::PASS_SUCCESS_PROBABILITY],
            QuerySpec::FilterByPeriod { .. } => &[fields::PERIOD],
            QuerySpec::CountShotsByPlayer { .. } => &[fields::PLAYER_NAME, fields::EVENT_TYPE_NAME],
            QuerySpec::Summary => &[
                fields::TEAM_NAME,
                fields::EVENT_TYPE_NAME,
                fields::PASS_SUCCESS_PROBABILITY,
            ],
        }
    }
}

/// The owned result of running a query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum QueryOutcome {
    Names(Vec<String>),
    Name(String),
    Records(Vec<EventRecord>),
    Count(usize),
    Average(f64),
    Summary(Summary),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub stats: DatasetStats,
    pub teams: Vec<String>,
    /// Absent when the dataset has no records
    pub most_common_event_type: Option<String>,
    pub successful_passes: usize,
}

/// A query together with its outcome, ready for reporting
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub query: QuerySpec,
    pub outcome: QueryOutcome,
}

/// Run one query against a dataset
pub fn execute(engine: &QueryEngine, dataset: &Dataset, spec: &QuerySpec) -> Result<QueryResult> {
    log::debug!("{}: running query: {}", dataset.source(), spec);

    let outcome = run(engine, dataset, spec)
        .with_context(|| format!("Query failed on {}: {}", dataset.source(), spec))?;

    Ok(QueryResult {
        query: spec.clone(),
        outcome,
    })
}

fn run(
    engine: &QueryEngine,
    dataset: &Dataset,
    spec: &QuerySpec,
) -> match_events::Result<QueryOutcome> {
    dataset.require_fields(spec.required_fields())?;

    let outcome = match spec {
        QuerySpec::UniqueTeams => QueryOutcome::Names(owned(engine.unique_teams(dataset)?)),
        QuerySpec::MostCommonEventType => {
            QueryOutcome::Name(engine.most_common_event_type(dataset)?.to_string())
        }
        QuerySpec::FilterByTeam { team } => {
            QueryOutcome::Records(cloned(engine.filter_by_team(dataset, team)?))
        }
        QuerySpec::CountEventTypeByTeam { team, event_type } => {
            QueryOutcome::Count(engine.count_event_type_by_team(dataset, team, event_type)?)
        }
        QuerySpec::AveragePassLengthByTeam { team } => {
            QueryOutcome::Average(engine.average_pass_length_by_team(dataset, team)?)
        }
        QuerySpec::PlayersByPosition { position } => {
            QueryOutcome::Names(owned(engine.players_by_position(dataset, position)?))
        }
        QuerySpec::CountSuccessfulPasses => {
            QueryOutcome::Count(engine.count_successful_passes(dataset)?)
        }
        QuerySpec::FilterByPeriod { period } => {
            QueryOutcome::Records(cloned(engine.filter_by_period(dataset, period)?))
        }
        QuerySpec::CountShotsByPlayer { player } => {
            QueryOutcome::Count(engine.count_shots_by_player(dataset, player)?)
        }
        QuerySpec::Summary => QueryOutcome::Summary(Summary {
            stats: dataset.stats(),
            teams: owned(engine.unique_teams(dataset)?),
            most_common_event_type: if dataset.is_empty() {
                None
            } else {
                Some(engine.most_common_event_type(dataset)?.to_string())
            },
            successful_passes: engine.count_successful_passes(dataset)?,
        }),
    };

    Ok(outcome)
}

fn owned<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    names.into_iter().map(str::to_string).collect()
}

fn cloned(records: Vec<&EventRecord>) -> Vec<EventRecord> {
    records.into_iter().cloned().collect()
}
