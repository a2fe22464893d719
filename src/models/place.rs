use serde::{Deserialize, Serialize};

use crate::constants::explore::STATE_DETAIL_ALTITUDE;
use crate::constants::sentinel::{NO_SUMMARY, NOT_AVAILABLE};

/// Country facts as reported by the country provider, before sentinels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryFacts {
    pub common_name: Option<String>,
    pub capital: Option<String>,
    pub population: Option<u64>,
    pub area_km2: Option<f64>,
    pub flag_url: Option<String>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub currencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryDetail {
    pub name: String,
    pub capital: String,
    pub population: Option<u64>,
    pub area_km2: Option<f64>,
    pub flag_url: Option<String>,
    pub region: String,
    pub subregion: String,
    pub currencies: String,
    pub wiki_extract: String,
}

fn or_not_available(value: Option<String>) -> String {
    value
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn or_no_summary(extract: Option<String>) -> String {
    extract
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| NO_SUMMARY.to_string())
}

impl CountryDetail {
    /// Name the encyclopedia summary should be looked up under.
    #[must_use]
    pub fn summary_title(requested: &str, facts: Option<&CountryFacts>) -> String {
        facts
            .and_then(|f| f.common_name.clone())
            .unwrap_or_else(|| requested.to_string())
    }

    #[must_use]
    pub fn assemble(requested: &str, facts: Option<CountryFacts>, wiki_extract: Option<String>) -> Self {
        let facts = facts.unwrap_or_default();
        let currencies = if facts.currencies.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            facts.currencies.join(", ")
        };

        Self {
            name: facts
                .common_name
                .unwrap_or_else(|| requested.to_string()),
            capital: or_not_available(facts.capital),
            population: facts.population,
            area_km2: facts.area_km2,
            flag_url: facts.flag_url,
            region: or_not_available(facts.region),
            subregion: or_not_available(facts.subregion),
            currencies,
            wiki_extract: or_no_summary(wiki_extract),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDetail {
    pub country: String,
    pub state: String,
    pub population: Option<u64>,
    pub wiki_extract: String,
}

impl StateDetail {
    #[must_use]
    pub fn assemble(
        country: &str,
        state: &str,
        population: Option<u64>,
        wiki_extract: Option<String>,
    ) -> Self {
        Self {
            country: country.to_string(),
            state: state.to_string(),
            population,
            wiki_extract: or_no_summary(wiki_extract),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlaceDetail {
    State(StateDetail),
    Country(CountryDetail),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Country,
    State,
}

impl DetailLevel {
    /// Region detail is chosen only for an altitude strictly below
    /// [`STATE_DETAIL_ALTITUDE`] and only when a region and its country are
    /// both known. No altitude means the default (zoomed out) view.
    #[must_use]
    pub fn for_altitude(altitude: Option<f64>, region_known: bool) -> Self {
        match altitude {
            Some(alt) if region_known && alt < STATE_DETAIL_ALTITUDE => Self::State,
            _ => Self::Country,
        }
    }
}
