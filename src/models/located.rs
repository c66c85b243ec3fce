//! Distance and bearing enrichment for located places.

use geo::{Bearing as _, Distance as _, Haversine};
use serde::{Deserialize, Serialize};

use super::{LocationHierarchy, Place};
use crate::geometry::Point;

/// Great-circle distance in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub meters: f64,
}

impl Distance {
    pub fn from_meters(meters: f64) -> Self {
        Self { meters }
    }

    /// Haversine distance between two points.
    pub fn between(from: &Point, to: &Point) -> Self {
        Self::from_meters(Haversine.distance(geo::Point::from(*from), geo::Point::from(*to)))
    }

    pub fn kilometers(&self) -> f64 {
        self.meters / 1000.0
    }
}

/// 8-point compass rose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompassDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassDirection {
    /// Direction for a bearing in degrees, clockwise from north.
    pub fn from_degrees(degrees: f64) -> Self {
        const DIRECTIONS: [CompassDirection; 8] = [
            CompassDirection::N,
            CompassDirection::NE,
            CompassDirection::E,
            CompassDirection::SE,
            CompassDirection::S,
            CompassDirection::SW,
            CompassDirection::W,
            CompassDirection::NW,
        ];
        let sector = ((degrees.rem_euclid(360.0) + 22.5) / 45.0) as usize % 8;
        DIRECTIONS[sector]
    }
}

/// Initial great-circle bearing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bearing {
    /// Degrees in [0, 360), clockwise from north
    pub degrees: f64,
    pub direction: CompassDirection,
}

impl Bearing {
    pub fn from_degrees(degrees: f64) -> Self {
        let degrees = degrees.rem_euclid(360.0);
        Self {
            degrees,
            direction: CompassDirection::from_degrees(degrees),
        }
    }

    pub fn between(from: &Point, to: &Point) -> Self {
        Self::from_degrees(Haversine.bearing(geo::Point::from(*from), geo::Point::from(*to)))
    }
}

/// A place with its position relative to the search point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedPlace {
    pub place: Place,
    pub distance: Distance,
    pub bearing: Bearing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hierarchy: Option<LocationHierarchy>,
}

impl LocatedPlace {
    /// Locate a place relative to `origin` using its coordinate.
    pub fn new(place: Place, origin: &Point) -> Self {
        let distance = Distance::between(origin, place.coordinate());
        Self::with_distance(place, origin, distance)
    }

    /// Locate a place with a distance measured by the store (e.g. to a projected shape).
    pub fn with_distance(place: Place, origin: &Point, distance: Distance) -> Self {
        let bearing = Bearing::between(origin, place.coordinate());
        Self {
            place,
            distance,
            bearing,
            hierarchy: None,
        }
    }

    pub fn with_hierarchy(mut self, hierarchy: LocationHierarchy) -> Self {
        self.hierarchy = Some(hierarchy);
        self
    }
}
