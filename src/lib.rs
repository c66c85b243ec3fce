//! Locator - geospatial query classification and hierarchy resolution
//!
//! Turns free-form location queries (coordinates, geoname ids, feature lists, free
//! text) into places enriched with distance, bearing and their administrative
//! hierarchy. The `locate` binary runs it against an in-memory GeoNames dump.

pub mod classify;
pub mod config;
pub mod error;
pub mod geometry;
pub mod hierarchy;
pub mod models;
pub mod search;
pub mod spatial;
pub mod store;
pub mod timing;

pub use classify::{classify, SearchIntent};
pub use config::Config;
pub use error::{
    ClassifyError, GeometryError, LookupError, PredicateError, ResolveError, SearchError,
};
pub use geometry::{Geometry, Linestring, Point, Polygon};
pub use hierarchy::{resolve, PlaceLookup};
pub use models::{AdminLevel, LocatedPlace, LocationHierarchy, Place};
pub use search::{LocationService, SearchResponse};
