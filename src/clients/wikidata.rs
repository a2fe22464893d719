//! Wikidata entity search and population facts.
//!
//! Population is resolved in two steps: `wbsearchentities` turns a label
//! into an item id, then a SPARQL query reads that item's `P1082`
//! statements ordered by their `P585` point-in-time qualifier.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{KnowledgeGraph, UpstreamError, endpoint, fetch_json};
use crate::models::{EntityReference, PopulationFact};

const SERVICE: &str = "wikidata";

const SPARQL_ACCEPT: &str = "application/sparql-results+json";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: String,
    label: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    #[serde(default)]
    bindings: Vec<PopulationBinding>,
}

#[derive(Debug, Deserialize)]
struct PopulationBinding {
    population: Option<SparqlValue>,
    #[serde(rename = "pointInTime")]
    point_in_time: Option<SparqlValue>,
}

#[derive(Debug, Deserialize)]
struct SparqlValue {
    value: String,
}

#[derive(Clone)]
pub struct WikidataClient {
    client: Client,
    api_url: String,
    sparql_url: String,
}

impl WikidataClient {
    #[must_use]
    pub fn new(client: Client, api_url: &str, sparql_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
            sparql_url: sparql_url.to_string(),
        }
    }
}

/// Item ids are the only value spliced into the query text.
fn is_item_id(id: &str) -> bool {
    id.strip_prefix('Q')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

fn population_query(item_id: &str) -> Result<String, UpstreamError> {
    if !is_item_id(item_id) {
        return Err(UpstreamError::malformed(
            SERVICE,
            format!("refusing to query non-item id {item_id:?}"),
        ));
    }

    Ok(format!(
        "SELECT ?population ?pointInTime WHERE {{
  wd:{item_id} p:P1082 ?popStatement .
  ?popStatement ps:P1082 ?population .
  OPTIONAL {{ ?popStatement pq:P585 ?pointInTime . }}
}}
ORDER BY DESC(?pointInTime)
LIMIT 1"
    ))
}

fn first_fact(response: SparqlResponse) -> Option<PopulationFact> {
    let binding = response.results.bindings.into_iter().next()?;
    Some(PopulationFact {
        population: binding
            .population
            .and_then(|v| PopulationFact::parse_count(&v.value)),
        point_in_time: binding
            .point_in_time
            .map(|v| v.value)
            .filter(|v| !v.is_empty()),
    })
}

#[async_trait]
impl KnowledgeGraph for WikidataClient {
    async fn find_entity(&self, label: &str) -> Result<Option<EntityReference>, UpstreamError> {
        let mut url = endpoint(SERVICE, &self.api_url)?;
        url.query_pairs_mut()
            .append_pair("action", "wbsearchentities")
            .append_pair("search", label)
            .append_pair("language", "en")
            .append_pair("type", "item")
            .append_pair("format", "json")
            .append_pair("limit", "1");

        debug!(label, "Searching Wikidata entity");

        let response: SearchResponse = fetch_json(SERVICE, self.client.get(url)).await?;

        Ok(response.search.into_iter().next().map(|hit| EntityReference {
            id: hit.id,
            label: hit.label,
            description: hit.description,
        }))
    }

    async fn latest_population(
        &self,
        entity_id: &str,
    ) -> Result<Option<PopulationFact>, UpstreamError> {
        let query = population_query(entity_id)?;

        let mut url = endpoint(SERVICE, &self.sparql_url)?;
        url.query_pairs_mut()
            .append_pair("query", &query)
            .append_pair("format", "json");

        debug!(entity_id, "Querying latest population");

        let request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, SPARQL_ACCEPT);

        let response: SparqlResponse = fetch_json(SERVICE, request).await?;
        Ok(first_fact(response))
    }
}
