//! CLI tool for converting an MBO CSV file into MBP snapshots.
//!
//! # Usage
//!
//! ```bash
//! # Default: 10 levels, output to mbp.csv
//! cargo run --release --bin mbo_to_mbp -- data/mbo.csv
//!
//! # 5 levels, reject duplicate order ids, skip bad rows
//! cargo run --release --bin mbo_to_mbp -- data/mbo.csv -o out.csv \
//!     --levels 5 --reject-duplicates --skip-invalid
//!
//! # Load settings from JSON and dump the run summary
//! cargo run --release --bin mbo_to_mbp -- data/mbo.csv \
//!     --config converter.json --stats-json summary.json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use mbo_mbp_reconstructor::{convert, ConverterConfig, DuplicateOrderPolicy, Result};

/// Convert a Market-By-Order CSV into Market-By-Price snapshots
#[derive(Parser, Debug)]
#[command(name = "mbo_to_mbp", version, about)]
struct Args {
    /// Input MBO CSV file
    input: PathBuf,

    /// Output MBP CSV file
    #[arg(short, long, default_value = "mbp.csv")]
    output: PathBuf,

    /// Price levels per side (overrides the config file)
    #[arg(short, long)]
    levels: Option<usize>,

    /// JSON converter config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fail on adds for order ids that are already live
    #[arg(long)]
    reject_duplicates: bool,

    /// Log and skip rows that fail to parse
    #[arg(long)]
    skip_invalid: bool,

    /// Write the run summary as JSON
    #[arg(long)]
    stats_json: Option<PathBuf>,

    /// Suppress book consistency warnings
    #[arg(short, long)]
    quiet: bool,
}

fn load_config(args: &Args) -> Result<ConverterConfig> {
    let mut config = match &args.config {
        Some(path) => ConverterConfig::from_json_file(path)?,
        None => ConverterConfig::default(),
    };
    if let Some(levels) = args.levels {
        config.levels = levels;
    }
    if args.reject_duplicates {
        config.duplicate_policy = DuplicateOrderPolicy::Reject;
    }
    if args.skip_invalid {
        config.skip_invalid = true;
    }
    if args.quiet {
        config.log_warnings = false;
    }
    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    log::info!(
        "Converting {} -> {} ({} levels, duplicates: {:?})",
        args.input.display(),
        args.output.display(),
        config.levels,
        config.duplicate_policy
    );

    let start = Instant::now();
    let summary = convert(&args.input, &args.output, config)?;
    let elapsed = start.elapsed().as_secs_f64();

    let events = summary.dispatch.events_read;
    log::info!(
        "Processed {} events -> {} rows in {:.2}s ({:.0} events/s)",
        events,
        summary.dispatch.rows_written,
        elapsed,
        if elapsed > 0.0 { events as f64 / elapsed } else { 0.0 }
    );
    log::info!(
        "Book: {} active orders, {} pending markers, {} unknown cancels, {} over-cancels, {} executions",
        summary.active_orders,
        summary.pending_markers,
        summary.book.unknown_order_cancels,
        summary.book.over_cancels,
        summary.book.executions_resolved
    );
    if summary.dispatch.skipped_rows > 0 {
        log::warn!("Skipped {} invalid rows", summary.dispatch.skipped_rows);
    }

    if let Some(path) = &args.stats_json {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)?;
        log::info!("Summary written to {}", path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
