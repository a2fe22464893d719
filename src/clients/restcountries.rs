use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::{CountryProvider, UpstreamError, endpoint_with_segment, fetch_json_optional};
use crate::models::CountryFacts;

const SERVICE: &str = "restcountries";

#[derive(Debug, Default, Deserialize)]
struct RestCountry {
    name: Option<CountryName>,
    #[serde(default)]
    capital: Vec<String>,
    population: Option<u64>,
    area: Option<f64>,
    flags: Option<Flags>,
    region: Option<String>,
    subregion: Option<String>,
    #[serde(default)]
    currencies: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct CountryName {
    common: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Flags {
    svg: Option<String>,
    png: Option<String>,
}

impl From<RestCountry> for CountryFacts {
    fn from(country: RestCountry) -> Self {
        Self {
            common_name: country.name.and_then(|n| n.common),
            capital: country.capital.into_iter().next(),
            population: country.population,
            area_km2: country.area,
            flag_url: country.flags.and_then(|f| f.svg.or(f.png)),
            region: country.region,
            subregion: country.subregion,
            currencies: country.currencies.keys().cloned().collect(),
        }
    }
}

#[derive(Clone)]
pub struct RestCountriesClient {
    client: Client,
    base_url: String,
}

impl RestCountriesClient {
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl CountryProvider for RestCountriesClient {
    async fn country(&self, name: &str) -> Result<Option<CountryFacts>, UpstreamError> {
        let mut url = endpoint_with_segment(SERVICE, &self.base_url, name)?;
        url.query_pairs_mut().append_pair("fullText", "true");

        debug!(name, "Fetching country facts");

        let countries: Option<Vec<RestCountry>> =
            fetch_json_optional(SERVICE, self.client.get(url), true).await?;

        Ok(countries
            .and_then(|list| list.into_iter().next())
            .map(CountryFacts::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_mapping() {
        let raw = r#"[{
            "name": {"common": "Japan", "official": "Japan"},
            "capital": ["Tokyo"],
            "population": 125836021,
            "area": 377930.0,
            "flags": {"png": "https://flagcdn.com/w320/jp.png", "svg": "https://flagcdn.com/jp.svg"},
            "region": "Asia",
            "subregion": "Eastern Asia",
            "currencies": {"JPY": {"name": "Japanese yen", "symbol": "¥"}}
        }]"#;
        let list: Vec<RestCountry> = serde_json::from_str(raw).unwrap();
        let facts = CountryFacts::from(list.into_iter().next().unwrap());

        assert_eq!(facts.common_name.as_deref(), Some("Japan"));
        assert_eq!(facts.capital.as_deref(), Some("Tokyo"));
        assert_eq!(facts.flag_url.as_deref(), Some("https://flagcdn.com/jp.svg"));
        assert_eq!(facts.currencies, vec!["JPY".to_string()]);
    }

    #[test]
    fn test_sparse_country_mapping() {
        let facts = CountryFacts::from(serde_json::from_str::<RestCountry>("{}").unwrap());
        assert_eq!(facts, CountryFacts::default());
    }
}
