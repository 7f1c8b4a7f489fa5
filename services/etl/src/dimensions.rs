//! Dimension derivation with natural-key deduplication and dense surrogate
//! ids (1..=n per dimension).
//!
//! Id assignment is deterministic for a given input ordering: time is
//! sorted by year (a calendar year before the wave row of the same year),
//! geography by (category, name), population and indicator follow
//! first-seen order with surveillance rows first.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::geography::{GeoCategory, GeographyClassifier, RegionLookup};
use crate::normalize::{NormalizedRow, NormalizedTable, Source};

/// Natural key of `dim_zeit`. The survey wave always has its own row, even
/// when the surveillance data contains the same calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeKey {
    Year(i32),
    Wave,
}

pub type PopulationKey = (String, Option<String>, String);
pub type IndicatorKey = (Option<String>, Option<String>);

#[derive(Debug, Clone, PartialEq)]
pub struct TimeRow {
    pub id: i64,
    pub year: i32,
    pub period: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeographyRow {
    pub id: i64,
    pub name: String,
    pub iso_code: Option<String>,
    pub category: GeoCategory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationRow {
    pub id: i64,
    pub gender: String,
    pub age_group: Option<String>,
    pub education: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub id: i64,
    pub name: Option<String>,
    pub category: String,
    pub unit: Option<String>,
    pub description: Option<String>,
}

/// Rows of one dimension plus the natural-key index used for fact lookups.
#[derive(Debug, Clone)]
pub struct Dimension<K, R> {
    rows: Vec<R>,
    index: HashMap<K, i64>,
}

impl<K: Eq + Hash, R> Dimension<K, R> {
    fn new() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Adds a row for `key` unless one exists. Returns the surrogate id.
    fn insert_with(&mut self, key: K, make: impl FnOnce(i64) -> R) -> i64 {
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = self.rows.len() as i64 + 1;
        self.rows.push(make(id));
        self.index.insert(key, id);
        id
    }

    pub fn lookup(&self, key: &K) -> Option<i64> {
        self.index.get(key).copied()
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone)]
pub struct Dimensions {
    pub time: Dimension<TimeKey, TimeRow>,
    pub geography: Dimension<String, GeographyRow>,
    pub population: Dimension<PopulationKey, PopulationRow>,
    pub indicator: Dimension<IndicatorKey, IndicatorRow>,
}

pub fn time_key(row: &NormalizedRow) -> Option<TimeKey> {
    match row.source {
        Source::Geda => Some(TimeKey::Wave),
        Source::Surveillance => row.year.map(TimeKey::Year),
    }
}

pub fn population_key(row: &NormalizedRow) -> PopulationKey {
    (row.gender.clone(), row.age_group.clone(), row.education.clone())
}

pub fn indicator_key(row: &NormalizedRow) -> IndicatorKey {
    (row.indicator.name.clone(), row.indicator.unit.clone())
}

pub fn build_dimensions<L: RegionLookup>(
    surveillance: &NormalizedTable,
    geda: &NormalizedTable,
    config: &PipelineConfig,
    classifier: &GeographyClassifier<'_, L>,
) -> Dimensions {
    let dims = Dimensions {
        time: build_time(surveillance, config),
        geography: build_geography(surveillance, geda, classifier),
        population: build_population(surveillance, geda),
        indicator: build_indicator(surveillance, geda),
    };

    info!(
        dim_zeit = dims.time.len(),
        dim_geographie = dims.geography.len(),
        dim_bevoelkerung = dims.population.len(),
        dim_indikator = dims.indicator.len(),
        "dimensions built"
    );
    dims
}

fn build_time(surveillance: &NormalizedTable, config: &PipelineConfig) -> Dimension<TimeKey, TimeRow> {
    let wave = &config.survey_wave;
    let literal_years: BTreeSet<i32> = surveillance.rows.iter().filter_map(|r| r.year).collect();

    if literal_years.is_empty() {
        warn!("no parseable years in surveillance data");
    }
    if literal_years.contains(&wave.year) {
        info!(
            year = wave.year,
            label = %wave.label,
            "survey wave year also appears as a calendar year, kept as separate dim_zeit rows"
        );
    }

    let mut entries: Vec<(i32, TimeKey)> = literal_years
        .into_iter()
        .map(|year| (year, TimeKey::Year(year)))
        .collect();
    entries.push((wave.year, TimeKey::Wave));
    entries.sort();

    let mut time = Dimension::new();
    for (year, key) in entries {
        time.insert_with(key, |id| TimeRow {
            id,
            year,
            period: match key {
                TimeKey::Year(_) => year.to_string(),
                TimeKey::Wave => wave.label.clone(),
            },
        });
    }
    time
}

fn build_geography<L: RegionLookup>(
    surveillance: &NormalizedTable,
    geda: &NormalizedTable,
    classifier: &GeographyClassifier<'_, L>,
) -> Dimension<String, GeographyRow> {
    let names: BTreeSet<&str> = surveillance
        .rows
        .iter()
        .chain(geda.rows.iter())
        .filter_map(|r| r.region.as_deref())
        .collect();

    let mut classified = Vec::with_capacity(names.len());
    let mut unresolved = 0usize;
    for name in names {
        let result = classifier.classify(name);
        if result.category == GeoCategory::Unresolved {
            debug!(region = name, "region unresolved, excluded from dim_geographie");
            unresolved += 1;
            continue;
        }
        classified.push((result.category, name, result.iso_code));
    }
    classified.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

    if unresolved > 0 {
        info!(unresolved, "regions excluded from geography dimension");
    }

    let mut geography = Dimension::new();
    for (category, name, iso_code) in classified {
        geography.insert_with(name.to_string(), |id| GeographyRow {
            id,
            name: name.to_string(),
            iso_code,
            category,
        });
    }
    geography
}

fn build_population(
    surveillance: &NormalizedTable,
    geda: &NormalizedTable,
) -> Dimension<PopulationKey, PopulationRow> {
    let mut population = Dimension::new();
    for row in surveillance.rows.iter().chain(geda.rows.iter()) {
        population.insert_with(population_key(row), |id| PopulationRow {
            id,
            gender: row.gender.clone(),
            age_group: row.age_group.clone(),
            education: row.education.clone(),
        });
    }
    population
}

fn build_indicator(
    surveillance: &NormalizedTable,
    geda: &NormalizedTable,
) -> Dimension<IndicatorKey, IndicatorRow> {
    let mut indicator = Dimension::new();
    for row in surveillance.rows.iter().chain(geda.rows.iter()) {
        let fields = &row.indicator;
        indicator.insert_with(indicator_key(row), |id| IndicatorRow {
            id,
            name: fields.name.clone(),
            category: fields.category.clone(),
            unit: fields.unit.clone(),
            description: fields.description.clone(),
        });
    }
    indicator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::IndicatorFields;

    fn row(source: Source, year: Option<i32>, region: &str) -> NormalizedRow {
        NormalizedRow {
            source,
            year,
            region: Some(region.to_string()),
            gender: "Gesamt".to_string(),
            age_group: Some("18-29".to_string()),
            education: "Gesamt".to_string(),
            indicator: IndicatorFields {
                name: Some("Prävalenz".to_string()),
                category: "Diabetes Surveillance".to_string(),
                unit: Some("Prozent".to_string()),
                description: None,
            },
            value: Some(1.0),
        }
    }

    fn table(source: Source, rows: Vec<NormalizedRow>) -> NormalizedTable {
        NormalizedTable { source, rows }
    }

    fn build(surv: Vec<NormalizedRow>, geda: Vec<NormalizedRow>) -> Dimensions {
        let config = PipelineConfig::default();
        let classifier = GeographyClassifier::new(&config);
        build_dimensions(
            &table(Source::Surveillance, surv),
            &table(Source::Geda, geda),
            &config,
            &classifier,
        )
    }

    fn assert_dense<R>(rows: &[R], id: impl Fn(&R) -> i64) {
        let ids: Vec<i64> = rows.iter().map(id).collect();
        let expected: Vec<i64> = (1..=rows.len() as i64).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_time_dimension_years_and_wave_label() {
        let dims = build(
            vec![
                row(Source::Surveillance, Some(2018), "Bayern"),
                row(Source::Surveillance, Some(2016), "Bayern"),
                row(Source::Surveillance, Some(2018), "Berlin"),
                row(Source::Surveillance, None, "Berlin"),
            ],
            vec![row(Source::Geda, Some(2019), "Hessen")],
        );
        let rows = dims.time.rows();
        let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2016, 2018, 2019]);
        assert_dense(rows, |r| r.id);
        assert_eq!(rows[0].period, "2016");
        assert_eq!(rows[2].period, "2019-2020 (GEDA)");
        assert_ne!(rows[2].period, rows[2].year.to_string());
    }

    #[test]
    fn test_time_dimension_without_years_keeps_wave() {
        let dims = build(vec![row(Source::Surveillance, None, "Bayern")], vec![]);
        assert_eq!(dims.time.len(), 1);
        assert_eq!(dims.time.lookup(&TimeKey::Wave), Some(1));
    }

    #[test]
    fn test_wave_year_collision_keeps_separate_rows() {
        let dims = build(
            vec![
                row(Source::Surveillance, Some(2019), "Bayern"),
                row(Source::Surveillance, Some(2018), "Bayern"),
            ],
            vec![row(Source::Geda, Some(2019), "Hessen")],
        );
        let rows = dims.time.rows();
        assert_eq!(rows.len(), 3);
        assert_dense(rows, |r| r.id);

        let calendar = dims.time.lookup(&TimeKey::Year(2019));
        let wave = dims.time.lookup(&TimeKey::Wave);
        assert_eq!(calendar, Some(2));
        assert_eq!(wave, Some(3));
        assert_eq!(rows[1].period, "2019");
        assert_eq!(rows[2].period, "2019-2020 (GEDA)");
    }

    #[test]
    fn test_time_key_per_source() {
        let geda = row(Source::Geda, Some(2019), "Hessen");
        assert_eq!(time_key(&geda), Some(TimeKey::Wave));
        let surv = row(Source::Surveillance, Some(2019), "Bayern");
        assert_eq!(time_key(&surv), Some(TimeKey::Year(2019)));
        let undated = row(Source::Surveillance, None, "Bayern");
        assert_eq!(time_key(&undated), None);
    }

    #[test]
    fn test_geography_excludes_unresolved_and_sorts() {
        let dims = build(
            vec![
                row(Source::Surveillance, Some(2018), "Nordost"),
                row(Source::Surveillance, Some(2018), "Bayern"),
                row(Source::Surveillance, Some(2018), "Atlantis"),
                row(Source::Surveillance, Some(2018), "Deutschland"),
            ],
            vec![
                row(Source::Geda, Some(2019), "Berlin"),
                row(Source::Geda, Some(2019), "Bayern"),
            ],
        );
        let names: Vec<&str> = dims.geography.rows().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Deutschland", "Bayern", "Berlin", "Nordost"]);
        assert_dense(dims.geography.rows(), |r| r.id);
        assert_eq!(dims.geography.lookup(&"Atlantis".to_string()), None);
        assert_eq!(dims.geography.rows()[0].iso_code.as_deref(), Some("DE"));
        assert_eq!(dims.geography.rows()[3].category, GeoCategory::AggregateRegion);
    }

    #[test]
    fn test_population_dedup_across_sources() {
        let dims = build(
            vec![row(Source::Surveillance, Some(2018), "Bayern")],
            vec![row(Source::Geda, Some(2019), "Bayern")],
        );
        assert_eq!(dims.population.len(), 1);
        let key = ("Gesamt".to_string(), Some("18-29".to_string()), "Gesamt".to_string());
        assert_eq!(dims.population.lookup(&key), Some(1));
    }

    #[test]
    fn test_population_first_seen_order() {
        let mut women = row(Source::Surveillance, Some(2018), "Bayern");
        women.gender = "Weiblich".to_string();
        let mut men_geda = row(Source::Geda, Some(2019), "Bayern");
        men_geda.gender = "Männlich".to_string();

        let dims = build(
            vec![women, row(Source::Surveillance, Some(2018), "Bayern")],
            vec![men_geda],
        );
        let genders: Vec<&str> = dims.population.rows().iter().map(|r| r.gender.as_str()).collect();
        assert_eq!(genders, vec!["Weiblich", "Gesamt", "Männlich"]);
        assert_dense(dims.population.rows(), |r| r.id);
    }

    #[test]
    fn test_indicator_keyed_by_name_and_unit() {
        let base = row(Source::Surveillance, Some(2018), "Bayern");
        let mut other_unit = base.clone();
        other_unit.indicator.unit = Some("Anzahl".to_string());
        let mut other_description = base.clone();
        other_description.indicator.description = Some("anders".to_string());

        let dims = build(vec![base, other_unit, other_description], vec![]);
        assert_eq!(dims.indicator.len(), 2);
        assert_dense(dims.indicator.rows(), |r| r.id);
        assert_eq!(dims.indicator.rows()[0].description, None);
        assert_eq!(
            dims.indicator
                .lookup(&(Some("Prävalenz".to_string()), Some("Anzahl".to_string()))),
            Some(2)
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let surv = vec![
            row(Source::Surveillance, Some(2017), "Sachsen"),
            row(Source::Surveillance, Some(2015), "Bayern"),
            row(Source::Surveillance, Some(2016), "Süden"),
        ];
        let geda = vec![row(Source::Geda, Some(2019), "Hessen")];

        let first = build(surv.clone(), geda.clone());
        for _ in 0..5 {
            let again = build(surv.clone(), geda.clone());
            assert_eq!(first.time.rows(), again.time.rows());
            assert_eq!(first.geography.rows(), again.geography.rows());
            assert_eq!(first.population.rows(), again.population.rows());
            assert_eq!(first.indicator.rows(), again.indicator.rows());
        }
    }
}
