pub mod composite;
pub mod geo;
pub mod place;
pub mod population;

pub use composite::CompositeInfo;
pub use geo::{Coordinates, GeocodeResult, Geometry, PlaceNames};
pub use place::{CountryDetail, CountryFacts, DetailLevel, PlaceDetail, StateDetail};
pub use population::{EntityReference, PopulationFact, PopulationPayload};
