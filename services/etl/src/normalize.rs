//! Field normalization: maps each source's columns and codes onto the
//! shared vocabulary used by the dimensions.
//!
//! Column names are resolved once per table into a `ColumnMap`; nothing
//! downstream looks at raw headers. Normalization annotates, it never
//! drops a row.

use tracing::{info, warn};

use crate::config::{ColumnCandidates, PipelineConfig, SourceDescriptor};
use crate::extract::RawTable;

const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Longitudinal diabetes surveillance indicators.
    Surveillance,
    /// Cross-sectional GEDA 2019/2020 (EHIS) survey.
    Geda,
}

impl Source {
    pub fn descriptor(self, config: &PipelineConfig) -> &SourceDescriptor {
        match self {
            Source::Surveillance => &config.surveillance,
            Source::Geda => &config.geda,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndicatorFields {
    pub name: Option<String>,
    pub category: String,
    pub unit: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub source: Source,
    pub year: Option<i32>,
    pub region: Option<String>,
    pub gender: String,
    pub age_group: Option<String>,
    pub education: String,
    pub indicator: IndicatorFields,
    pub value: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub source: Source,
    pub rows: Vec<NormalizedRow>,
}

/// Header positions of the logical fields in one raw table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub year: Option<usize>,
    pub region: Option<usize>,
    pub gender: Option<usize>,
    pub age_group: Option<usize>,
    pub education: Option<usize>,
    pub indicator: Option<usize>,
    pub unit: Option<usize>,
    pub value: Option<usize>,
}

impl ColumnMap {
    pub fn resolve(table: &RawTable, candidates: &ColumnCandidates) -> Self {
        Self {
            year: table.find_column(&candidates.year),
            region: table.find_column(&candidates.region),
            gender: table.find_column(&candidates.gender),
            age_group: table.find_column(&candidates.age_group),
            education: table.find_column(&candidates.education),
            indicator: table.find_column(&candidates.indicator),
            unit: table.find_column(&candidates.unit),
            value: table.find_column(&candidates.value),
        }
    }

    fn log(&self, table: &RawTable) {
        let name = |idx: Option<usize>| {
            idx.and_then(|i| table.headers.get(i))
                .map(String::as_str)
                .unwrap_or("-")
        };
        info!(
            table = %table.name,
            year = name(self.year),
            region = name(self.region),
            gender = name(self.gender),
            age = name(self.age_group),
            education = name(self.education),
            indicator = name(self.indicator),
            unit = name(self.unit),
            value = name(self.value),
            "column mapping resolved"
        );
        if self.region.is_none() {
            warn!(table = %table.name, "no region column found, every row will lack geography");
        }
        if self.value.is_none() {
            warn!(table = %table.name, "no value column found, every fact value will be null");
        }
    }
}

pub fn normalize(table: &RawTable, source: Source, config: &PipelineConfig) -> NormalizedTable {
    let descriptor = source.descriptor(config);
    let columns = ColumnMap::resolve(table, &descriptor.columns);
    columns.log(table);

    let rows = table
        .rows
        .iter()
        .map(|row| normalize_row(row, &columns, source, descriptor, config))
        .collect();

    NormalizedTable { source, rows }
}

fn normalize_row(
    row: &[String],
    columns: &ColumnMap,
    source: Source,
    descriptor: &SourceDescriptor,
    config: &PipelineConfig,
) -> NormalizedRow {
    let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).and_then(|v| present(v));

    let year = match source {
        Source::Geda => Some(config.survey_wave.year),
        Source::Surveillance => cell(columns.year).and_then(parse_year),
    };

    let region = cell(columns.region).map(|r| {
        config
            .region_aliases
            .get(r)
            .cloned()
            .unwrap_or_else(|| r.to_string())
    });

    let gender = cell(columns.gender)
        .and_then(|g| config.gender_map.get(g))
        .cloned()
        .unwrap_or_else(|| config.unknown_gender.clone());

    let education = cell(columns.education)
        .map(str::to_string)
        .unwrap_or_else(|| config.overall_education.clone());

    let name = cell(columns.indicator).map(str::to_string);
    let unit = match &descriptor.indicator_unit {
        Some(fixed) => Some(fixed.clone()),
        None => cell(columns.unit).map(str::to_string),
    };
    let description = match &descriptor.indicator_description {
        Some(fixed) => Some(fixed.clone()),
        None => name.as_deref().map(|code| describe_code(code, config)),
    };

    NormalizedRow {
        source,
        year,
        region,
        gender,
        age_group: cell(columns.age_group).map(str::to_string),
        education,
        indicator: IndicatorFields {
            name,
            category: descriptor.indicator_category.clone(),
            unit,
            description,
        },
        value: cell(columns.value).and_then(parse_decimal),
    }
}

/// GEDA variable code to its human-readable label.
pub fn describe_code(code: &str, config: &PipelineConfig) -> String {
    config
        .geda_descriptions
        .get(code)
        .cloned()
        .unwrap_or_else(|| format!("Code: {code}"))
}

fn present(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed)
    }
}

/// Accepts `2019` as well as `2019.0`.
pub fn parse_year(raw: &str) -> Option<i32> {
    if let Ok(year) = raw.parse::<i32>() {
        return Some(year);
    }
    let value: f64 = raw.parse().ok()?;
    if value.fract() == 0.0 && value >= i32::MIN as f64 && value <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}

/// `.` decimal separator, or a lone `,` as in German exports.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let parsed = raw.parse::<f64>().ok().or_else(|| {
        if raw.contains(',') && !raw.contains('.') {
            raw.replace(',', ".").parse::<f64>().ok()
        } else {
            None
        }
    })?;
    parsed.is_finite().then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surveillance_table(rows: &[&[&str]]) -> RawTable {
        let headers = [
            "Jahr",
            "Region_Name",
            "Indikator_Name",
            "Kennzahl_Definition",
            "Geschlecht_Name",
            "Alter_Name",
            "Bildung_Casmin_Name",
            "Wert",
            "Unteres_Konfidenzintervall",
            "Oberes_Konfidenzintervall",
        ];
        to_table("diab", &headers, rows)
    }

    fn geda_table(rows: &[&[&str]]) -> RawTable {
        let headers = [
            "Variable",
            "Gender",
            "Bundesland",
            "Altersgruppe",
            "Bildungsgruppe",
            "Percent",
            "LowerCL",
            "UpperCL",
        ];
        to_table("geda", &headers, rows)
    }

    fn to_table(name: &str, headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            name,
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_surveillance_row_fields() {
        let table = surveillance_table(&[&[
            "2017",
            "Bayern",
            "Prävalenz Diabetes",
            "Prozent",
            "Frauen",
            "18-29",
            "niedrig",
            "7.4",
            "6.9",
            "7.9",
        ]]);
        let normalized = normalize(&table, Source::Surveillance, &PipelineConfig::default());
        let row = &normalized.rows[0];

        assert_eq!(row.year, Some(2017));
        assert_eq!(row.region.as_deref(), Some("Bayern"));
        assert_eq!(row.gender, "Weiblich");
        assert_eq!(row.age_group.as_deref(), Some("18-29"));
        assert_eq!(row.education, "niedrig");
        assert_eq!(row.indicator.name.as_deref(), Some("Prävalenz Diabetes"));
        assert_eq!(row.indicator.category, "Diabetes Surveillance");
        assert_eq!(row.indicator.unit.as_deref(), Some("Prozent"));
        assert_eq!(
            row.indicator.description.as_deref(),
            Some("Datenquelle: Diabetes Surveillance RKI")
        );
        assert_eq!(row.value, Some(7.4));
    }

    #[test]
    fn test_unmapped_gender_becomes_unknown() {
        let table = surveillance_table(&[
            &["2017", "Bayern", "X", "Prozent", "divers", "", "", "1", "", ""],
            &["2017", "Bayern", "X", "Prozent", "", "", "", "1", "", ""],
        ]);
        let normalized = normalize(&table, Source::Surveillance, &PipelineConfig::default());
        assert_eq!(normalized.rows.len(), 2);
        assert!(normalized.rows.iter().all(|r| r.gender == "Unbekannt"));
    }

    #[test]
    fn test_missing_education_defaults_to_overall() {
        let table = geda_table(&[&["PAadiposB", "Männer", "Hessen", "30-44", "", "18.2", "", ""]]);
        let normalized = normalize(&table, Source::Geda, &PipelineConfig::default());
        assert_eq!(normalized.rows[0].education, "Gesamt");
        assert_eq!(normalized.rows[0].gender, "Männlich");
    }

    #[test]
    fn test_geda_rows_stamped_with_wave_year() {
        let table = geda_table(&[
            &["PAadiposB", "Frauen", "Hessen", "30-44", "Gesamt", "18.2", "16.0", "20.4"],
            &["KAwalk2", "Gesamt", "Berlin", "45-64", "Gesamt", "40.0", "", ""],
        ]);
        let normalized = normalize(&table, Source::Geda, &PipelineConfig::default());
        assert!(normalized.rows.iter().all(|r| r.year == Some(2019)));
    }

    #[test]
    fn test_geda_indicator_description_mapping() {
        let table = geda_table(&[
            &[" PAadiposB ", "Frauen", "Hessen", "30-44", "Gesamt", "18.2", "", ""],
            &["XYZ123", "Frauen", "Hessen", "30-44", "Gesamt", "1.0", "", ""],
        ]);
        let normalized = normalize(&table, Source::Geda, &PipelineConfig::default());

        let adipositas = &normalized.rows[0].indicator;
        assert_eq!(adipositas.name.as_deref(), Some("PAadiposB"));
        assert_eq!(adipositas.description.as_deref(), Some("Körpergewicht: Adipositas"));
        assert_eq!(adipositas.unit.as_deref(), Some("Prozent"));
        assert_eq!(adipositas.category, "GEDA Survey");

        let unknown = &normalized.rows[1].indicator;
        assert_eq!(unknown.description.as_deref(), Some("Code: XYZ123"));
    }

    #[test]
    fn test_normalization_never_drops_rows() {
        let table = surveillance_table(&[
            &["", "", "", "", "", "", "", "", "", ""],
            &["kein Jahr", "Nirgendwo", "X", "", "??", "", "", "n/a", "", ""],
            &["2019", "Bayern", "X", "Prozent", "Frauen", "", "", "abc", "", ""],
        ]);
        let normalized = normalize(&table, Source::Surveillance, &PipelineConfig::default());
        assert_eq!(normalized.rows.len(), 3);
        assert_eq!(normalized.rows[0].region, None);
        assert_eq!(normalized.rows[1].year, None);
        assert_eq!(normalized.rows[2].value, None);
    }

    #[test]
    fn test_fallback_column_names() {
        let table = to_table(
            "diab-alt",
            &["Jahr", "Region", "Indikator", "Gender", "Altersgruppe", "Percent"],
            &[&["2018", "Berlin", "Inzidenz", "Male", "45-64", "3.1"]],
        );
        let config = PipelineConfig::default();
        let columns = ColumnMap::resolve(&table, &config.surveillance.columns);
        assert_eq!(columns.region, Some(1));
        assert_eq!(columns.value, Some(5));
        assert_eq!(columns.unit, None);

        let normalized = normalize(&table, Source::Surveillance, &config);
        let row = &normalized.rows[0];
        assert_eq!(row.region.as_deref(), Some("Berlin"));
        assert_eq!(row.indicator.name.as_deref(), Some("Inzidenz"));
        assert_eq!(row.indicator.unit, None);
        assert_eq!(row.gender, "Unbekannt");
        assert_eq!(row.value, Some(3.1));
    }

    #[test]
    fn test_region_aliases_applied() {
        let mut config = PipelineConfig::default();
        config
            .region_aliases
            .insert("Gesamt".to_string(), "Deutschland".to_string());
        let table = geda_table(&[&["PAadiposB", "Frauen", "Gesamt", "", "", "1", "", ""]]);
        let normalized = normalize(&table, Source::Geda, &config);
        assert_eq!(normalized.rows[0].region.as_deref(), Some("Deutschland"));
    }

    #[test]
    fn test_parse_year_variants() {
        assert_eq!(parse_year("2019"), Some(2019));
        assert_eq!(parse_year("2019.0"), Some(2019));
        assert_eq!(parse_year("2019.5"), None);
        assert_eq!(parse_year("2019-2020"), None);
    }

    #[test]
    fn test_parse_decimal_variants() {
        assert_eq!(parse_decimal("12.5"), Some(12.5));
        assert_eq!(parse_decimal("12,5"), Some(12.5));
        assert_eq!(parse_decimal("1,234.5"), None);
        assert_eq!(parse_decimal("inf"), None);
        assert_eq!(parse_decimal("abc"), None);
    }
}
