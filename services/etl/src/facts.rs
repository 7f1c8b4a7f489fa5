//! Fact assembly: resolves every normalized row to surrogate keys and
//! unions both sources into `fakt_gesundheitskennzahlen`.
//!
//! Rows without a geography key are dropped. Missing time, population or
//! indicator keys stay as NULL foreign keys.

use tracing::{info, warn};

use crate::config::{NullValuePolicy, PipelineConfig};
use crate::dimensions::{indicator_key, population_key, time_key, Dimensions};
use crate::normalize::{NormalizedRow, NormalizedTable};

#[derive(Debug, Clone, PartialEq)]
pub struct FactRow {
    pub id: i64,
    pub time_id: Option<i64>,
    pub geography_id: i64,
    pub population_id: Option<i64>,
    pub indicator_id: Option<i64>,
    pub value: Option<f64>,
    pub source_label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub surveillance_rows: usize,
    pub geda_rows: usize,
    pub dropped_geography: usize,
    pub dropped_null_value: usize,
    pub null_time: usize,
    pub null_population: usize,
    pub null_indicator: usize,
    pub facts: usize,
}

#[derive(Debug, Clone)]
pub struct FactTable {
    pub rows: Vec<FactRow>,
    pub report: AssemblyReport,
}

/// Surveillance rows first, then GEDA rows; ids are dense over the rows
/// that survive filtering, in that order.
pub fn assemble_facts(
    surveillance: &NormalizedTable,
    geda: &NormalizedTable,
    dims: &Dimensions,
    config: &PipelineConfig,
) -> FactTable {
    let mut rows = Vec::with_capacity(surveillance.rows.len() + geda.rows.len());
    let mut report = AssemblyReport {
        surveillance_rows: surveillance.rows.len(),
        geda_rows: geda.rows.len(),
        ..AssemblyReport::default()
    };

    for table in [surveillance, geda] {
        let label = &table.source.descriptor(config).label;
        for row in &table.rows {
            if let Some(fact) = resolve_row(row, dims, config, label, &mut report, rows.len()) {
                rows.push(fact);
            }
        }
    }
    report.facts = rows.len();

    if report.null_time + report.null_population + report.null_indicator > 0 {
        warn!(
            null_time = report.null_time,
            null_population = report.null_population,
            null_indicator = report.null_indicator,
            "facts kept with unresolved non-geography keys"
        );
    }
    info!(
        facts = report.facts,
        dropped_geography = report.dropped_geography,
        dropped_null_value = report.dropped_null_value,
        "fact table assembled"
    );

    FactTable { rows, report }
}

fn resolve_row(
    row: &NormalizedRow,
    dims: &Dimensions,
    config: &PipelineConfig,
    label: &str,
    report: &mut AssemblyReport,
    assigned: usize,
) -> Option<FactRow> {
    let Some(geography_id) = row.region.as_ref().and_then(|r| dims.geography.lookup(r)) else {
        report.dropped_geography += 1;
        return None;
    };

    if row.value.is_none() && config.null_values == NullValuePolicy::Drop {
        report.dropped_null_value += 1;
        return None;
    }

    let time_id = time_key(row).and_then(|key| dims.time.lookup(&key));
    let population_id = dims.population.lookup(&population_key(row));
    let indicator_id = dims.indicator.lookup(&indicator_key(row));

    report.null_time += usize::from(time_id.is_none());
    report.null_population += usize::from(population_id.is_none());
    report.null_indicator += usize::from(indicator_id.is_none());

    Some(FactRow {
        id: assigned as i64 + 1,
        time_id,
        geography_id,
        population_id,
        indicator_id,
        value: row.value,
        source_label: label.to_string(),
    })
}
