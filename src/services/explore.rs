//! Builds the composite view for a clicked point on the globe.
//!
//! Only the reverse geocode is mandatory. The detail payload and the four
//! best-effort lookups (weather, time, summary, population) each degrade to
//! `null` on failure; the latter four run concurrently and are all awaited
//! to completion before the response is assembled.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use super::lookup::{LookupError, LookupService};
use crate::models::{CompositeInfo, Coordinates, DetailLevel, PlaceDetail};

pub struct ExploreService {
    lookup: Arc<LookupService>,
}

/// Keeps a successful result, logs and drops a failed one.
fn settle(part: &'static str, result: Result<Value, LookupError>) -> Option<Value> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(part, error = %e, "Lookup failed, leaving it empty");
            None
        }
    }
}

fn decode<T: DeserializeOwned>(result: Result<Value, LookupError>) -> Result<T, LookupError> {
    Ok(serde_json::from_value(result?)?)
}

impl ExploreService {
    #[must_use]
    pub const fn new(lookup: Arc<LookupService>) -> Self {
        Self { lookup }
    }

    pub async fn explore(
        &self,
        coords: Coordinates,
        altitude: Option<f64>,
    ) -> Result<CompositeInfo, LookupError> {
        let geo = self.lookup.place_at(coords).await?;
        let names = geo.place_names();
        let lookup_name = names.lookup_name().to_string();

        let mut info = CompositeInfo::at(coords, altitude, geo);

        let region_known = names.state.is_some() && names.country.is_some();
        let wanted = DetailLevel::for_altitude(altitude, region_known);
        let (level, details) = self.details(wanted, &info).await;
        info.level = level;
        info.details = details;

        let (weather, time, wiki, pop) = tokio::join!(
            self.lookup.weather(coords),
            self.lookup.timezone(coords),
            self.lookup.summary(&lookup_name),
            self.lookup.population(&lookup_name),
        );

        info.weather = settle("weather", weather);
        info.time = settle("time", time);
        info.wiki = settle("wiki", wiki);
        info.pop = settle("population", pop);

        info!(
            %coords,
            level = ?info.level,
            place = %lookup_name,
            weather = info.weather.is_some(),
            time = info.time.is_some(),
            wiki = info.wiki.is_some(),
            pop = info.pop.is_some(),
            "Explored location"
        );

        Ok(info)
    }

    /// The level reported is the one actually obtained: a failed region
    /// lookup reports `Country` with no details.
    async fn details(
        &self,
        wanted: DetailLevel,
        info: &CompositeInfo,
    ) -> (DetailLevel, Option<PlaceDetail>) {
        let (Some(country), state) = (info.country.as_deref(), info.state.as_deref()) else {
            return (DetailLevel::Country, None);
        };

        match (wanted, state) {
            (DetailLevel::State, Some(state)) => {
                match decode(self.lookup.state_info(country, state).await) {
                    Ok(detail) => (DetailLevel::State, Some(PlaceDetail::State(detail))),
                    Err(e) => {
                        warn!(country, state, error = %e, "Region detail failed");
                        (DetailLevel::Country, None)
                    }
                }
            }
            _ => match decode(self.lookup.country_info(country).await) {
                Ok(detail) => (DetailLevel::Country, Some(PlaceDetail::Country(detail))),
                Err(e) => {
                    warn!(country, error = %e, "Country detail failed");
                    (DetailLevel::Country, None)
                }
            },
        }
    }
}
