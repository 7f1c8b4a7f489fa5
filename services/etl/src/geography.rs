//! Geography classification.
//!
//! Resolves a region display name to an ISO 3166 style code and a
//! category. Names that resolve to nothing are `Unresolved` and never make
//! it into `dim_geographie`.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::iso3166::{COUNTRIES, COUNTRY_ALIASES, SUBDIVISIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GeoCategory {
    Country,
    Subdivision,
    AggregateRegion,
    Unresolved,
}

impl GeoCategory {
    /// Value stored in `dim_geographie.kategorie`.
    pub fn label(self) -> &'static str {
        match self {
            GeoCategory::Country => "Land",
            GeoCategory::Subdivision => "Bundesland",
            GeoCategory::AggregateRegion => "Kombinationsregion",
            GeoCategory::Unresolved => "Unbekannt",
        }
    }
}

impl fmt::Display for GeoCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoClassification {
    pub iso_code: Option<String>,
    pub category: GeoCategory,
}

impl GeoClassification {
    fn new(iso_code: Option<String>, category: GeoCategory) -> Self {
        Self { iso_code, category }
    }

    fn unresolved() -> Self {
        Self::new(None, GeoCategory::Unresolved)
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("region lookup unavailable: {0}")]
    Unavailable(String),
}

/// Name-to-code resolution backing the classifier.
pub trait RegionLookup {
    /// Subdivision code (e.g. `DE-BY`) for `name` within `country_code`.
    fn subdivision(&self, country_code: &str, name: &str) -> Result<Option<String>, LookupError>;

    /// Alpha-2 code of a sovereign country.
    fn country(&self, name: &str) -> Result<Option<String>, LookupError>;
}

/// Static ISO 3166 catalog. Subdivision names match exactly, country
/// names case-insensitively against the ISO short name or a known alias.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoCatalog;

impl RegionLookup for IsoCatalog {
    fn subdivision(&self, country_code: &str, name: &str) -> Result<Option<String>, LookupError> {
        let mut entries = SUBDIVISIONS
            .iter()
            .filter(|(country, _, _)| *country == country_code)
            .peekable();
        if entries.peek().is_none() {
            return Err(LookupError::Unavailable(format!(
                "no ISO 3166-2 subdivisions for {country_code}"
            )));
        }
        Ok(entries
            .find(|(_, _, sub)| *sub == name)
            .map(|(_, code, _)| code.to_string()))
    }

    fn country(&self, name: &str) -> Result<Option<String>, LookupError> {
        let needle = name.trim().to_lowercase();
        let by_name = COUNTRIES
            .iter()
            .find(|(_, iso_name)| iso_name.to_lowercase() == needle)
            .map(|(code, _)| *code);
        let code = by_name.or_else(|| {
            COUNTRY_ALIASES
                .iter()
                .find(|(alias, _)| alias.to_lowercase() == needle)
                .map(|(_, code)| *code)
        });
        Ok(code.map(str::to_string))
    }
}

pub struct GeographyClassifier<'a, L = IsoCatalog> {
    config: &'a PipelineConfig,
    lookup: L,
}

impl<'a> GeographyClassifier<'a, IsoCatalog> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self::with_lookup(config, IsoCatalog)
    }
}

impl<'a, L: RegionLookup> GeographyClassifier<'a, L> {
    pub fn with_lookup(config: &'a PipelineConfig, lookup: L) -> Self {
        Self { config, lookup }
    }

    /// Never fails: lookup errors count as "no match".
    pub fn classify(&self, name: &str) -> GeoClassification {
        let home = &self.config.home_country;

        if name == home.name {
            return GeoClassification::new(Some(home.code.clone()), GeoCategory::Country);
        }

        if self.config.aggregate_regions.iter().any(|r| r == name) {
            return GeoClassification::new(None, GeoCategory::AggregateRegion);
        }

        match self.lookup.subdivision(&home.code, name) {
            Ok(Some(code)) => return GeoClassification::new(Some(code), GeoCategory::Subdivision),
            Ok(None) => {}
            Err(e) => debug!(region = name, error = %e, "subdivision lookup failed"),
        }

        match self.lookup.country(name) {
            Ok(Some(code)) => return GeoClassification::new(Some(code), GeoCategory::Country),
            Ok(None) => {}
            Err(e) => debug!(region = name, error = %e, "country lookup failed"),
        }

        GeoClassification::unresolved()
    }
}
