mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use chorus_compute::{AnalysisEngine, DetectionParams};
use chorus_core::config::{load_dotenv, Config};
use chorus_core::DatasetStore;

use crate::cli::{CliArgs, Command};

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Logs go to stderr so stdout carries only JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let config = Config::from_env();
    config.log_summary();

    let data_path = args.data.clone().unwrap_or_else(|| config.dataset.path.clone());
    let (store, stats) = DatasetStore::load_jsonl(&data_path)
        .with_context(|| format!("failed to load dataset '{}'", data_path.display()))?;
    info!(
        loaded = stats.loaded,
        skipped = stats.skipped,
        "Dataset ready"
    );
    let engine = AnalysisEngine::new(store);

    match &args.command {
        Command::Detect {
            filter,
            time_window,
            similarity_threshold,
            scorer,
        } => {
            let params = DetectionParams::new(
                time_window.unwrap_or(config.detection.time_window_seconds),
                similarity_threshold.unwrap_or(config.detection.similarity_threshold),
            )
            .context("invalid detection parameters")?;
            let detection = engine
                .coordinated_groups(&filter.to_filter(), &params, *scorer)
                .context("coordinated-group detection failed")?;
            emit(&detection, args.compact)
        }
        Command::Timeseries { filter } => emit(&engine.timeseries(&filter.to_filter()), args.compact),
        Command::Contributors { filter, limit } => {
            let limit = limit.unwrap_or(config.analytics.top_contributors_limit);
            emit(&engine.top_contributors(&filter.to_filter(), limit), args.compact)
        }
        Command::Network { filter } => emit(&engine.repost_network(&filter.to_filter()), args.compact),
    }
}

fn emit<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let json = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}
