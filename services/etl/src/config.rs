//! Runtime settings and pipeline mapping configuration.
//!
//! `Settings` comes from the environment (database, file locations, retry
//! policy). `PipelineConfig` holds the mapping tables the transform reads:
//! gender codes, GEDA variable descriptions, aggregate regions, column
//! candidates per source. Both are built once in `main` and passed down.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tokio::fs;

use crate::error::{EtlError, Result};

const DEFAULT_DATA_DIR: &str = "Datenquellen";
const DEFAULT_DIABETES_FILE: &str = "Diabetes-Surveillance_Indikatoren.tsv";
const DEFAULT_GEDA_FILE: &str = "Gesundheit_in_Deutschland_aktuell_-_2019-2020-EHIS.csv";

// =============================================================================
// Runtime settings (environment)
// =============================================================================

#[derive(Debug, Clone)]
pub struct Settings {
    pub db_url: String,
    pub diabetes_file: PathBuf,
    pub geda_file: PathBuf,
    pub connect_retries: u32,
    pub connect_delay: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup so the rules can be
    /// exercised without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_url = match lookup("DB_URL") {
            Some(url) if !url.trim().is_empty() => url,
            _ => compose_db_url(&lookup)?,
        };

        let data_dir =
            PathBuf::from(lookup("DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));
        let diabetes_file = lookup("FILE_DIABETES")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DEFAULT_DIABETES_FILE));
        let geda_file = lookup("FILE_GESUNDHEIT")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DEFAULT_GEDA_FILE));

        let connect_retries = parse_or(&lookup, "DB_CONNECT_RETRIES", 10)?;
        let connect_delay_ms: u64 = parse_or(&lookup, "DB_CONNECT_DELAY_MS", 3000)?;

        if connect_retries == 0 {
            return Err(EtlError::Config(
                "DB_CONNECT_RETRIES must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            db_url,
            diabetes_file,
            geda_file,
            connect_retries,
            connect_delay: Duration::from_millis(connect_delay_ms),
        })
    }

    /// Database URL with the password masked, for logging.
    pub fn db_url_masked(&self) -> String {
        mask_password(&self.db_url)
    }
}

fn compose_db_url<F>(lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let user = lookup("POSTGRES_USER");
    let password = lookup("POSTGRES_PASSWORD");
    let db = lookup("POSTGRES_DB");

    let (Some(user), Some(password), Some(db)) = (user, password, db) else {
        return Err(EtlError::Config(
            "DB_URL or POSTGRES_USER, POSTGRES_PASSWORD and POSTGRES_DB must be set".to_string(),
        ));
    };

    let host = lookup("DB_HOST").unwrap_or_else(|| "db".to_string());
    let port = lookup("POSTGRES_PORT").unwrap_or_else(|| "5432".to_string());

    Ok(format!("postgres://{user}:{password}@{host}:{port}/{db}"))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| EtlError::Config(format!("{key} has invalid value '{raw}'"))),
        None => Ok(default),
    }
}

fn mask_password(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
        None => url.to_string(),
    }
}

// =============================================================================
// Pipeline mapping configuration
// =============================================================================

/// What to do with facts whose value could not be parsed as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NullValuePolicy {
    #[default]
    Keep,
    Drop,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HomeCountry {
    pub name: String,
    pub code: String,
}

/// The cross-sectional survey spans several calendar years and is pinned
/// to one representative year in the time dimension.
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyWave {
    pub year: i32,
    pub label: String,
}

/// Ordered candidate header names for every logical field of a source.
/// The first header present in the file wins.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ColumnCandidates {
    pub year: Vec<String>,
    pub region: Vec<String>,
    pub gender: Vec<String>,
    pub age_group: Vec<String>,
    pub education: Vec<String>,
    pub indicator: Vec<String>,
    pub unit: Vec<String>,
    pub value: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceDescriptor {
    /// Stored in `fakt_gesundheitskennzahlen.datenquelle`.
    pub label: String,
    pub indicator_category: String,
    /// Fixed unit; `None` reads the unit column.
    #[serde(default)]
    pub indicator_unit: Option<String>,
    /// Fixed description; `None` looks the code up in `geda_descriptions`.
    #[serde(default)]
    pub indicator_description: Option<String>,
    pub columns: ColumnCandidates,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub gender_map: HashMap<String, String>,
    pub unknown_gender: String,
    pub overall_education: String,
    pub region_aliases: HashMap<String, String>,
    pub aggregate_regions: Vec<String>,
    pub geda_descriptions: HashMap<String, String>,
    pub home_country: HomeCountry,
    pub survey_wave: SurveyWave,
    pub surveillance: SourceDescriptor,
    pub geda: SourceDescriptor,
    pub null_values: NullValuePolicy,
}

impl PipelineConfig {
    /// Reads a JSON override file. Top-level keys missing from the file keep
    /// their built-in defaults.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.home_country.name.trim().is_empty() || self.home_country.code.trim().is_empty() {
            return Err(EtlError::Config(
                "home_country needs both name and code".to_string(),
            ));
        }
        if self.surveillance.columns.year.is_empty() {
            return Err(EtlError::Config(
                "surveillance source needs at least one year column candidate".to_string(),
            ));
        }
        if self.survey_wave.label.trim().is_empty() {
            return Err(EtlError::Config("survey_wave.label must not be empty".to_string()));
        }
        // The wave period must never read like a calendar-year period.
        if self.survey_wave.label.trim().parse::<i32>().is_ok() {
            return Err(EtlError::Config(format!(
                "survey_wave.label '{}' is indistinguishable from a calendar year",
                self.survey_wave.label
            )));
        }
        Ok(())
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn string_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

const GENDER_MAP: &[(&str, &str)] = &[
    ("Männlich", "Männlich"),
    ("Weiblich", "Weiblich"),
    ("Gesamt", "Gesamt"),
    ("Männer", "Männlich"),
    ("Frauen", "Weiblich"),
];

const AGGREGATE_REGIONS: &[&str] = &[
    "Nordost",
    "Nordwest",
    "Mitte-Ost",
    "Mitte-West",
    "Süden",
    "Ost",
    "West",
];

/// GEDA 2019/2020 (EHIS) variable codes.
const GEDA_DESCRIPTIONS: &[(&str, &str)] = &[
    ("AMarztB", "Medikamenteneinnahme (ärztlich verordnet)"),
    ("GVzahnsa_k", "Mundgesundheit"),
    ("IAarzt14B_k", "Inanspruchnahme: Zahnmedizinische Versorgung"),
    ("IAarzt1B_k", "Inanspruchnahme: Allgemeinärztliche oder hausärztliche Versorgung"),
    ("IAarzt8C", "Inanspruchnahme: Psycholog:in"),
    ("IAfa_k", "Inanspruchnahme: Fachärztliche Versorgung"),
    ("IAnotkhs", "Inanspruchnahme: Notaufnahme im Krankenhaus"),
    ("IAther2B", "Inanspruchnahme: Physiotherapie"),
    ("Iakhs", "Inanspruchnahme: Stationäre Versorgung"),
    ("Akrausch", "Alkohol: Rauschtrinken"),
    ("Akrisiko_k", "Alkohol: Riskanter Konsum"),
    ("RCstatE_k3", "Rauchen: Tabakprodukte"),
    ("RCpass4B_k2", "Rauchen: Passivrauchbelastung"),
    ("ENcolaBtgl", "Ernährung: Täglich zuckerhaltige Erfrischungsgetränke"),
    ("ENobgemtgl", "Ernährung: Täglich Obst und Gemüse"),
    ("ENgemDtgl", "Ernährung: Täglich Gemüse"),
    ("ENobstDtgl", "Ernährung: Täglich Obst"),
    ("EnsaftBtgl", "Ernährung: Täglich Obst- oder Gemüsesaft"),
    ("PAadiposB", "Körpergewicht: Adipositas"),
    ("PAueberB", "Körpergewicht: Übergewicht"),
    ("PAnormalB", "Körpergewicht: Normalgewicht"),
    ("PAunterB", "Körpergewicht: Untergewicht"),
    ("KAarbeit", "Körperliche Aktivität: Arbeitsbezogene Aktivität"),
    ("KAcyc1", "Körperliche Aktivität: Fahrradfahren von Ort zu Ort"),
    ("KAwalk2", "Körperliche Aktivität: Zu Fuß gehen von Ort zu Ort"),
    ("KAspo2", "Körperliche Aktivität: Freizeitbezogene Aktivität"),
    ("KAgfmk", "Körperliche Aktivität: Muskelkräftigung"),
    ("KAgfa", "Körperliche Aktivität: Ausdaueraktivität und Muskelkräftigung"),
    ("KAgfaB", "Körperliche Aktivität: Ausdaueraktivität"),
    ("KHBBsa12", "Schlaganfall"),
    ("IAhypus_k", "Vorsorge: Blutdruckmessung"),
    ("IAkfutyp4B_lz_k2", "Vorsorge: Darmspiegelung"),
    ("IAkfutyp2B_lz_k", "Vorsorge: Test auf Blut im Stuhl"),
    ("IAcholus_k", "Vorsorge: Blutfettwertebestimmung"),
    ("IAdiabus_k", "Vorsorge: Blutzuckermessung"),
    ("KHab12", "Asthma"),
    ("KAgfkaB", "Körperliche Aktivität: Ausdaueraktivität"),
    ("KHalgi112", "Allergien"),
    ("KHcb12B", "Chronische Bronchitis (COPD)"),
    ("KHdge12", "Arthrose"),
    ("KHdiabB12", "Diabetes"),
    ("KHmyokhk12", "Koronare Herzerkrankung"),
    ("GZmehm1_k", "Subjektive Gesundheit"),
    ("PKPHQ8_k6", "Depressive Symptomatik (PHQ-8)"),
    ("GZmehm2D_k3", "Einschränkung durch Krankheit"),
    ("GZmehm3C", "Chronische Krankheit"),
];

impl SourceDescriptor {
    pub fn surveillance() -> Self {
        Self {
            label: "Diabetes Surveillance".to_string(),
            indicator_category: "Diabetes Surveillance".to_string(),
            indicator_unit: None,
            indicator_description: Some("Datenquelle: Diabetes Surveillance RKI".to_string()),
            columns: ColumnCandidates {
                year: strings(&["Jahr"]),
                region: strings(&["Region_Name", "Region"]),
                gender: strings(&["Geschlecht_Name", "Geschlecht", "Gender"]),
                age_group: strings(&["Alter_Name", "Altersgruppe"]),
                education: strings(&["Bildung_Casmin_Name", "Bildungsgruppe"]),
                indicator: strings(&["Indikator_Name", "Indikator"]),
                unit: strings(&["Kennzahl_Definition"]),
                value: strings(&["Wert", "Percent"]),
            },
        }
    }

    pub fn geda() -> Self {
        Self {
            label: "GEDA 2019/2020".to_string(),
            indicator_category: "GEDA Survey".to_string(),
            indicator_unit: Some("Prozent".to_string()),
            indicator_description: None,
            columns: ColumnCandidates {
                year: Vec::new(),
                region: strings(&["Bundesland", "Region"]),
                gender: strings(&["Gender", "Geschlecht"]),
                age_group: strings(&["Altersgruppe", "Alter"]),
                education: strings(&["Bildungsgruppe"]),
                indicator: strings(&["Variable"]),
                unit: Vec::new(),
                value: strings(&["Percent", "Wert"]),
            },
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gender_map: string_map(GENDER_MAP),
            unknown_gender: "Unbekannt".to_string(),
            overall_education: "Gesamt".to_string(),
            region_aliases: HashMap::new(),
            aggregate_regions: strings(AGGREGATE_REGIONS),
            geda_descriptions: string_map(GEDA_DESCRIPTIONS),
            home_country: HomeCountry {
                name: "Deutschland".to_string(),
                code: "DE".to_string(),
            },
            survey_wave: SurveyWave {
                year: 2019,
                label: "2019-2020 (GEDA)".to_string(),
            },
            surveillance: SourceDescriptor::surveillance(),
            geda: SourceDescriptor::geda(),
            null_values: NullValuePolicy::Keep,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = string_map(pairs);
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_settings_prefers_db_url() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("DB_URL", "postgres://u:p@localhost:5432/dwh"),
            ("POSTGRES_USER", "ignored"),
        ]))
        .unwrap();
        assert_eq!(settings.db_url, "postgres://u:p@localhost:5432/dwh");
        assert_eq!(settings.connect_retries, 10);
        assert_eq!(settings.connect_delay, Duration::from_secs(3));
    }

    #[test]
    fn test_settings_composes_url_from_parts() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("POSTGRES_USER", "etl"),
            ("POSTGRES_PASSWORD", "secret"),
            ("POSTGRES_DB", "gesundheit"),
        ]))
        .unwrap();
        assert_eq!(settings.db_url, "postgres://etl:secret@db:5432/gesundheit");
    }

    #[test]
    fn test_settings_missing_credentials_fails() {
        let result = Settings::from_lookup(lookup_from(&[("POSTGRES_USER", "etl")]));
        assert!(matches!(result, Err(EtlError::Config(_))));
    }

    #[test]
    fn test_settings_default_file_paths() {
        let settings = Settings::from_lookup(lookup_from(&[("DB_URL", "postgres://x")])).unwrap();
        assert_eq!(
            settings.diabetes_file,
            Path::new("Datenquellen").join("Diabetes-Surveillance_Indikatoren.tsv")
        );
        assert!(settings.geda_file.ends_with(DEFAULT_GEDA_FILE));
    }

    #[test]
    fn test_settings_data_dir_and_retry_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("DB_URL", "postgres://x"),
            ("DATA_DIR", "/data"),
            ("DB_CONNECT_RETRIES", "3"),
            ("DB_CONNECT_DELAY_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(settings.diabetes_file, Path::new("/data").join(DEFAULT_DIABETES_FILE));
        assert_eq!(settings.connect_retries, 3);
        assert_eq!(settings.connect_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_settings_invalid_retry_count_fails() {
        let result = Settings::from_lookup(lookup_from(&[
            ("DB_URL", "postgres://x"),
            ("DB_CONNECT_RETRIES", "many"),
        ]));
        assert!(matches!(result, Err(EtlError::Config(_))));

        let result = Settings::from_lookup(lookup_from(&[
            ("DB_URL", "postgres://x"),
            ("DB_CONNECT_RETRIES", "0"),
        ]));
        assert!(matches!(result, Err(EtlError::Config(_))));
    }

    #[test]
    fn test_masked_url_hides_password() {
        let settings = Settings::from_lookup(lookup_from(&[(
            "DB_URL",
            "postgres://etl:secret@db:5432/gesundheit",
        )]))
        .unwrap();
        assert_eq!(settings.db_url_masked(), "postgres://etl:***@db:5432/gesundheit");
    }

    #[test]
    fn test_pipeline_config_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.gender_map["Frauen"], "Weiblich");
        assert_eq!(config.geda_descriptions["PAadiposB"], "Körpergewicht: Adipositas");
        assert!(config.aggregate_regions.contains(&"Nordost".to_string()));
        assert_eq!(config.survey_wave.year, 2019);
        assert_eq!(config.null_values, NullValuePolicy::Keep);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pipeline_config_partial_json_keeps_defaults() {
        let json = r#"{
            "null_values": "drop",
            "region_aliases": { "Gesamt": "Deutschland" },
            "survey_wave": { "year": 2020, "label": "2019/2020 (Welle)" }
        }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.null_values, NullValuePolicy::Drop);
        assert_eq!(config.region_aliases["Gesamt"], "Deutschland");
        assert_eq!(config.survey_wave.year, 2020);
        assert_eq!(config.unknown_gender, "Unbekannt");
        assert_eq!(config.geda.label, "GEDA 2019/2020");
    }

    #[test]
    fn test_example_config_file_parses() {
        let json = include_str!("../../../config/pipeline.example.json");
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        config.validate().unwrap();
        assert_eq!(config.region_aliases["Gesamt"], "Deutschland");
        assert_eq!(config.null_values, NullValuePolicy::Keep);
    }

    #[test]
    fn test_wave_label_that_looks_like_a_year_rejected() {
        let json = r#"{ "survey_wave": { "year": 2019, "label": "2019" } }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(config.validate(), Err(EtlError::Config(_))));
    }

    #[tokio::test]
    async fn test_pipeline_config_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        std::fs::write(&path, r#"{ "aggregate_regions": ["Nord"] }"#).unwrap();

        let config = PipelineConfig::from_path(&path).await.unwrap();
        assert_eq!(config.aggregate_regions, vec!["Nord".to_string()]);
    }

    #[tokio::test]
    async fn test_pipeline_config_rejects_empty_home_country() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        std::fs::write(&path, r#"{ "home_country": { "name": "", "code": "DE" } }"#).unwrap();

        let result = PipelineConfig::from_path(&path).await;
        assert!(matches!(result, Err(EtlError::Config(_))));
    }
}
