//! Place storage: the repository port, the in-memory store and its loaders.

mod boundary;
mod geonames;
mod memory;

pub use boundary::BoundaryIndex;
pub use geonames::{
    load_geonames, load_shapes, parse_geonames_record, read_geonames, read_shapes,
};
pub use memory::MemoryPlaceStore;

#[cfg(test)]
pub(crate) use memory::tests::{berlin_places, berlin_store};

use serde::Serialize;

use crate::error::LookupError;
use crate::geometry::Point;
use crate::models::Place;

/// A place and its distance from the search point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyPlace {
    pub place: Place,
    pub distance_meters: f64,
}

/// Feature classes and codes a list search is restricted to. A place matches
/// when its class is listed or its code is listed; an empty filter matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureFilter {
    pub classes: Vec<String>,
    pub codes: Vec<String>,
}

impl FeatureFilter {
    pub fn new(classes: Vec<String>, codes: Vec<String>) -> Self {
        Self { classes, codes }
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.codes.is_empty()
    }
}

/// Read port for the searches the service runs.
pub trait PlaceRepository {
    fn find_by_id(&self, geoname_id: u64) -> Result<Option<Place>, LookupError>;

    /// Places nearest to `point`, closest first, ties by ascending geoname id.
    fn nearest(
        &self,
        point: &Point,
        filter: &FeatureFilter,
        limit: usize,
        radius_meters: Option<f64>,
    ) -> Result<Vec<NearbyPlace>, LookupError>;

    /// Case-insensitive name match, most populous first, ties by ascending geoname id.
    fn search_by_name(&self, query: &str, limit: usize) -> Result<Vec<Place>, LookupError>;
}
