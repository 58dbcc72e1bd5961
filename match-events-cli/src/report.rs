//! Report generation
//!
//! Renders query results per input file as plain text or JSON.

use crate::config::OutputFormat;
use crate::query::{QueryOutcome, QueryResult};
use anyhow::Result;
use match_events::{fields, DatasetStats, EventRecord};
use serde::Serialize;
use std::fmt::{self, Write};

/// Columns shown for each record in text reports
const RECORD_COLUMNS: [&str; 5] = [
    fields::PERIOD,
    fields::TEAM_NAME,
    fields::PLAYER_NAME,
    fields::EVENT_TYPE_NAME,
    fields::PASS_LENGTH,
];

/// All query results for one input file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub source: String,
    pub stats: DatasetStats,
    pub results: Vec<QueryResult>,
}

/// Render reports in the requested format
pub fn render(reports: &[FileReport], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Txt => {
            let mut out = String::new();
            render_txt(&mut out, reports)?;
            Ok(out)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(reports)? + "\n"),
    }
}

fn render_txt(out: &mut String, reports: &[FileReport]) -> fmt::Result {
    for report in reports {
        writeln!(out, "═══════════════════════════════════════════════")?;
        writeln!(out, "  {}", report.source)?;
        writeln!(out, "═══════════════════════════════════════════════")?;
        writeln!(
            out,
            "Records: {}  Fields: {}\n",
            report.stats.num_records, report.stats.num_fields
        )?;

        for result in &report.results {
            writeln!(out, "▶ {}", result.query)?;
            write_outcome(out, &result.outcome)?;
            out.push('\n');
        }
    }

    Ok(())
}

fn write_outcome(out: &mut String, outcome: &QueryOutcome) -> fmt::Result {
    match outcome {
        QueryOutcome::Names(names) if names.is_empty() => writeln!(out, "  (none)"),
        QueryOutcome::Names(names) => {
            for name in names {
                writeln!(out, "  • {}", name)?;
            }
            Ok(())
        }
        QueryOutcome::Name(name) => writeln!(out, "  {}", name),
        QueryOutcome::Count(count) => writeln!(out, "  {}", count),
        QueryOutcome::Average(value) => writeln!(out, "  {}", value),
        QueryOutcome::Records(records) => {
            writeln!(out, "  {} record(s)", records.len())?;
            if !records.is_empty() {
                writeln!(out, "  {}", RECORD_COLUMNS.join(" | "))?;
                for record in records {
                    writeln!(out, "  {}", record_row(record))?;
                }
            }
            Ok(())
        }
        QueryOutcome::Summary(summary) => {
            writeln!(out, "  Teams: {}", summary.teams.join(", "))?;
            writeln!(
                out,
                "  Most common event type: {}",
                summary.most_common_event_type.as_deref().unwrap_or("-")
            )?;
            writeln!(out, "  Successful passes: {}", summary.successful_passes)
        }
    }
}

fn record_row(record: &EventRecord) -> String {
    RECORD_COLUMNS
        .iter()
        .map(|column| record.try_get(column).unwrap_or("-"))
        .collect::<Vec<_>>()
        .join(" | ")
}
