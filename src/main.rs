//! picking-stream - per-picker pick report from a picking event stream
//!
//! Reads newline-delimited JSON events from a file or stdin, bounded by a
//! maximum event count and a maximum run time, and writes the sorted report
//! as one JSON document to a file or stdout. Logs go to stderr.

use anyhow::Context;
use clap::Parser;
use picking_stream::infra::{install_excluded_zones, Config};
use picking_stream::services::{EventProcessorFactory, PickingProcessorFactory};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncWrite;
use tracing::{info, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Group picking events per picker, excluding configured temperature zones
#[derive(Parser, Debug)]
#[command(name = "picking-stream", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Maximum number of events to read (overrides config)
    #[arg(long)]
    max_events: Option<usize>,

    /// Maximum time to spend reading, in milliseconds (overrides config)
    #[arg(long)]
    max_time_ms: Option<u64>,

    /// Input file (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with configurable level via RUST_LOG env var
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::resolve_config_path(&[]),
    };
    let config = Config::load_from_path(&config_path);

    if !install_excluded_zones(config.excluded_zones().clone()) {
        warn!("excluded_zones_already_initialized");
    }

    let max_events = args.max_events.unwrap_or(config.max_events());
    let max_time = args.max_time_ms.map(Duration::from_millis).unwrap_or(config.max_time());

    info!(
        config_file = %config.config_file(),
        excluded = ?config.excluded_zones().excluded(),
        max_events = %max_events,
        max_time_ms = %max_time.as_millis(),
        "config_loaded"
    );

    let source: Box<dyn Read + Send> = match &args.input {
        Some(path) => Box::new(
            std::fs::File::open(path)
                .with_context(|| format!("Failed to open input {}", path.display()))?,
        ),
        None => Box::new(std::io::stdin()),
    };

    let mut sink: Box<dyn AsyncWrite + Send + Unpin> = match &args.output {
        Some(path) => Box::new(
            tokio::fs::File::create(path)
                .await
                .with_context(|| format!("Failed to create output {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdout()),
    };

    let factory = PickingProcessorFactory::new();
    let processor = factory.create_processor(max_events, Some(max_time))?;
    let summary = processor
        .process(Some(source), Some(sink.as_mut()))
        .await
        .context("Failed to process picking events")?;

    info!(
        pickers = %summary.pickers,
        picks = %summary.picks,
        stop_reason = %summary.stop_reason.as_str(),
        "picking-stream done"
    );
    factory.metrics().report().log();

    Ok(())
}
