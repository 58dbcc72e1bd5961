//! Match Events CLI Application
//!
//! This is the command-line interface for the match events query engine.
//! It uses the match-events library and adds:
//! - Query selection from subcommands or a TOML config file
//! - Parallel processing of several input files
//! - Report generation (TXT/JSON)

use anyhow::{bail, Context, Result};
use clap::Parser;
use match_events::{Dataset, DatasetLoader, QueryEngine};
use rayon::prelude::*;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

mod config;
mod query;
mod report;

use config::{AppConfig, OutputFormat};
use query::QuerySpec;
use report::FileReport;

/// Match Events - Query sports-event CSV data
#[derive(Parser, Debug)]
#[command(name = "match-events-cli")]
#[command(about = "Answer aggregate and filter queries over sports-event CSV files")]
#[command(long_about = None)]
#[command(version)]
struct Args {
    /// Path to CSV event file(s) (can be repeated)
    #[arg(short, long, value_name = "FILE")]
    data: Vec<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report format (overrides config)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file for the report (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// CSV field delimiter (overrides config)
    #[arg(long, value_name = "CHAR")]
    delimiter: Option<char>,

    /// Successful pass threshold (overrides config)
    #[arg(long, value_name = "PROBABILITY")]
    threshold: Option<f64>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    query: Option<QuerySpec>,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Match Events CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using query library v{}", match_events::VERSION);

    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };
    apply_overrides(&mut config, &args)?;

    if config.input.files.is_empty() {
        if args.query.is_some() || !config.queries.is_empty() {
            bail!("No input files: pass --data <FILE> or set [input] files in the config");
        }
        print_usage_hint();
        return Ok(());
    }

    let queries = match args.query {
        Some(query) => vec![query],
        None if config.queries.is_empty() => vec![QuerySpec::Summary],
        None => config.queries.clone(),
    };

    let reports = run_queries(&config, &queries)?;
    let rendered = report::render(&reports, config.output.format)?;
    write_report(&rendered, config.output.path.as_deref())?;

    Ok(())
}

/// Command-line values win over the config file
fn apply_overrides(config: &mut AppConfig, args: &Args) -> Result<()> {
    if !args.data.is_empty() {
        config.input.files = args.data.clone();
    }
    if let Some(delimiter) = args.delimiter {
        config.input.delimiter = delimiter;
    }
    if let Some(threshold) = args.threshold {
        config.query.success_threshold = threshold;
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(output) = &args.output {
        config.output.path = Some(output.clone());
    }

    config::validate(config).context("Invalid command-line settings")
}

/// Load every input file and run the queries against it
///
/// Files are processed in parallel; reports keep the input order.
fn run_queries(config: &AppConfig, queries: &[QuerySpec]) -> Result<Vec<FileReport>> {
    let engine = QueryEngine::new(config.query.clone());
    log::debug!("Query settings: {:?}", engine.config());
    let loader = DatasetLoader::new()
        .with_delimiter(config.input.delimiter_byte()?)
        .with_trim(config.input.trim);

    log::info!(
        "Running {} quer{} over {} file(s)",
        queries.len(),
        if queries.len() == 1 { "y" } else { "ies" },
        config.input.files.len()
    );

    config
        .input
        .files
        .par_iter()
        .map(|path| process_file(&engine, &loader, path, queries))
        .collect()
}

fn process_file(
    engine: &QueryEngine,
    loader: &DatasetLoader,
    path: &Path,
    queries: &[QuerySpec],
) -> Result<FileReport> {
    let dataset: Dataset = loader
        .load_path(path)
        .with_context(|| format!("Failed to load event data: {:?}", path))?;

    let results = queries
        .iter()
        .map(|spec| query::execute(engine, &dataset, spec))
        .collect::<Result<Vec<_>>>()?;

    Ok(FileReport {
        source: dataset.source().to_string(),
        stats: dataset.stats(),
        results,
    })
}

fn write_report(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write report: {:?}", path))?;
            log::info!("Report written to {:?}", path);
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn print_usage_hint() {
    println!("Match Events - No input specified");
    println!("\nQuick Start:");
    println!("  match-events-cli --data match.csv summary");
    println!(
        "  match-events-cli -d match.csv count-event-type-by-team --team Germany --event-type Pass"
    );
    println!("\nFor batches of queries:");
    println!("  match-events-cli --config config.toml");
    println!("\nUse --help for more options");
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
