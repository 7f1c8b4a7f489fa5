//! One warehouse refresh: extract -> transform -> load, strictly in order.

use chrono::{DateTime, Utc};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::config::{PipelineConfig, Settings};
use crate::dimensions::{build_dimensions, Dimensions};
use crate::error::{EtlError, Result};
use crate::extract::{extract_sources, SourceTables};
use crate::facts::{assemble_facts, AssemblyReport, FactTable};
use crate::geography::GeographyClassifier;
use crate::load::{load_warehouse, wait_for_db, LoadCounts};
use crate::normalize::{normalize, Source};

#[derive(Debug, Clone)]
pub struct Transformed {
    pub dims: Dimensions,
    pub facts: FactTable,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub report: AssemblyReport,
    pub row_counts: LoadCounts,
    /// `None` for dry runs.
    pub loaded: Option<LoadCounts>,
}

/// Pure part of the run; no I/O.
pub fn transform(sources: &SourceTables, config: &PipelineConfig) -> Transformed {
    info!("normalizing source fields");
    let surveillance = normalize(&sources.surveillance, Source::Surveillance, config);
    let geda = normalize(&sources.geda, Source::Geda, config);

    let classifier = GeographyClassifier::new(config);
    let dims = build_dimensions(&surveillance, &geda, config, &classifier);
    let facts = assemble_facts(&surveillance, &geda, &dims, config);

    Transformed { dims, facts }
}

pub async fn run_once(settings: &Settings, config: &PipelineConfig, dry_run: bool) -> Result<RunSummary> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let span = info_span!("run", %run_id);

    async move {
        info!(dry_run, "pipeline run started");

        let sources = extract_sources(&settings.diabetes_file, &settings.geda_file).await?;
        let transformed = transform(&sources, config);

        let loaded = if dry_run {
            info!("dry run, skipping database load");
            None
        } else {
            let pool = wait_for_db(settings).await?;
            let counts = load_warehouse(&pool, &transformed.dims, &transformed.facts.rows).await?;
            pool.close().await;
            Some(counts)
        };

        let summary = RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            report: transformed.facts.report.clone(),
            row_counts: row_counts(&transformed),
            loaded,
        };
        info!(
            facts = summary.report.facts,
            elapsed_ms = (summary.finished_at - summary.started_at).num_milliseconds(),
            "pipeline run finished"
        );
        Ok::<RunSummary, EtlError>(summary)
    }
    .instrument(span)
    .await
}

fn row_counts(transformed: &Transformed) -> LoadCounts {
    LoadCounts {
        dim_zeit: transformed.dims.time.len(),
        dim_geographie: transformed.dims.geography.len(),
        dim_bevoelkerung: transformed.dims.population.len(),
        dim_indikator: transformed.dims.indicator.len(),
        facts: transformed.facts.rows.len(),
    }
}
