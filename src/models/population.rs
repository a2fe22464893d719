use serde::{Deserialize, Serialize};

use crate::constants::sentinel::{NO_ENTITY, NO_POPULATION};

/// Knowledge-graph entity matched for a free-text place name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReference {
    pub id: String,
    pub label: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationFact {
    pub population: Option<u64>,
    pub point_in_time: Option<String>,
}

impl PopulationFact {
    /// Parses a literal such as `"8336817"`, `"+8336817"` or `"8336817.0"`.
    #[must_use]
    pub fn parse_count(raw: &str) -> Option<u64> {
        let raw = raw.trim().trim_start_matches('+');
        if let Ok(n) = raw.parse::<u64>() {
            return Some(n);
        }
        let n = raw.parse::<f64>().ok()?;
        if n.is_finite() && n >= 0.0 && n <= u64::MAX as f64 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Some(n.round() as u64)
        } else {
            None
        }
    }
}

/// Population endpoint payload. `population` is always present; the
/// remaining optional fields are omitted when unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationPayload {
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wikidata_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wikidata_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wikidata_description: Option<String>,
    pub population: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population_point_in_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PopulationPayload {
    #[must_use]
    pub fn no_entity(name: &str) -> Self {
        Self {
            city: name.to_string(),
            wikidata_id: None,
            wikidata_label: None,
            wikidata_description: None,
            population: None,
            population_point_in_time: None,
            message: Some(NO_ENTITY.to_string()),
        }
    }

    #[must_use]
    pub fn no_fact(name: &str, entity: EntityReference) -> Self {
        Self {
            city: name.to_string(),
            wikidata_id: Some(entity.id),
            wikidata_label: entity.label,
            wikidata_description: entity.description,
            population: None,
            population_point_in_time: None,
            message: Some(NO_POPULATION.to_string()),
        }
    }

    #[must_use]
    pub fn found(name: &str, entity: EntityReference, fact: PopulationFact) -> Self {
        Self {
            city: name.to_string(),
            wikidata_id: Some(entity.id),
            wikidata_label: entity.label,
            wikidata_description: entity.description,
            population: fact.population,
            population_point_in_time: fact.point_in_time,
            message: None,
        }
    }
}
