//! ETL Service - Loads RKI health survey extracts into a star-schema warehouse
//!
//! Responsibilities:
//! - Read the Diabetes Surveillance (TSV) and GEDA 2019/2020 (CSV) extracts
//! - Normalize codes and column names of both sources
//! - Derive time, geography, population and indicator dimensions
//! - Assemble the fact table with surrogate foreign keys
//! - Drop and recreate the warehouse schema, then apply PK/FK constraints
//!
//! Every run fully replaces the warehouse tables, so the result depends only
//! on the current source files.
//!
//! Usage:
//!   # Single run:
//!   cargo run --bin etl
//!
//!   # Transform only, print what would be loaded:
//!   cargo run --bin etl -- --dry-run
//!
//!   # Long-running service, refresh every 60 seconds:
//!   cargo run --bin etl -- --watch 60

mod config;
mod dimensions;
mod error;
mod extract;
mod facts;
mod geography;
mod iso3166;
mod load;
mod normalize;
mod pipeline;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::sleep;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{PipelineConfig, Settings};
use crate::pipeline::{run_once, RunSummary};

#[derive(Parser, Debug)]
#[command(name = "etl", about = "Loads RKI health survey extracts into the warehouse")]
struct Args {
    /// Diabetes Surveillance TSV (overrides FILE_DIABETES)
    #[arg(long)]
    diabetes_file: Option<PathBuf>,

    /// GEDA 2019/2020 CSV (overrides FILE_GESUNDHEIT)
    #[arg(long)]
    geda_file: Option<PathBuf>,

    /// JSON file overriding the built-in mapping tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dry run - transform only, don't touch the database
    #[arg(long, default_value = "false")]
    dry_run: bool,

    /// Keep running and refresh every SECS seconds
    #[arg(long, value_name = "SECS")]
    watch: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();

    let mut settings = Settings::from_env().context("Failed to read settings from environment")?;
    if let Some(path) = args.diabetes_file {
        settings.diabetes_file = path;
    }
    if let Some(path) = args.geda_file {
        settings.geda_file = path;
    }

    let pipeline_config = match &args.config {
        Some(path) => PipelineConfig::from_path(path)
            .await
            .with_context(|| format!("Failed to load pipeline config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    info!(
        diabetes_file = %settings.diabetes_file.display(),
        geda_file = %settings.geda_file.display(),
        mode = if args.dry_run { "dry-run" } else { "live" },
        "ETL service starting"
    );

    match args.watch {
        Some(secs) => watch(&settings, &pipeline_config, args.dry_run, Duration::from_secs(secs)).await,
        None => {
            let summary = run_once(&settings, &pipeline_config, args.dry_run)
                .await
                .context("Pipeline run failed")?;
            report(&summary, args.dry_run);
            Ok(())
        }
    }
}

/// Service variant: a failed run is logged and retried on the next cycle.
async fn watch(settings: &Settings, config: &PipelineConfig, dry_run: bool, interval: Duration) -> Result<()> {
    info!(interval_secs = interval.as_secs(), "watch mode active");

    loop {
        match run_once(settings, config, dry_run).await {
            Ok(summary) => report(&summary, dry_run),
            Err(e) => error!(error = %e, "pipeline run failed, retrying next cycle"),
        }

        tokio::select! {
            _ = sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("watch mode stopped");
                return Ok(());
            }
        }
    }
}

fn report(summary: &RunSummary, dry_run: bool) {
    let counts = summary.loaded.as_ref().unwrap_or(&summary.row_counts);
    info!(
        run_id = %summary.run_id,
        dim_zeit = counts.dim_zeit,
        dim_geographie = counts.dim_geographie,
        dim_bevoelkerung = counts.dim_bevoelkerung,
        dim_indikator = counts.dim_indikator,
        facts = counts.facts,
        "warehouse refreshed"
    );

    if dry_run {
        let r = &summary.report;
        println!("\n=== Dry Run Summary ===");
        println!("Run ID: {}", summary.run_id);
        println!("Surveillance rows: {}", r.surveillance_rows);
        println!("GEDA rows: {}", r.geda_rows);
        println!("dim_zeit: {}", counts.dim_zeit);
        println!("dim_geographie: {}", counts.dim_geographie);
        println!("dim_bevoelkerung: {}", counts.dim_bevoelkerung);
        println!("dim_indikator: {}", counts.dim_indikator);
        println!("Facts: {}", counts.facts);
        println!("Dropped (unresolved geography): {}", r.dropped_geography);
        println!("Dropped (null value): {}", r.dropped_null_value);
        println!(
            "Kept with NULL keys: zeit={} bevoelkerung={} indikator={}",
            r.null_time, r.null_population, r.null_indicator
        );
        println!("Dry run - nothing written to database");
    }
}
