use serde::Serialize;

use crate::geometry::Point;

/// What a raw query asks for. Built once per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchIntent {
    /// A single place by its numeric identifier
    GeonameId { id: u64 },

    /// The place nearest to a coordinate
    Coordinate { latitude: f64, longitude: f64 },

    /// Places near a coordinate restricted to feature classes and/or codes
    ListWithFeatures {
        latitude: f64,
        longitude: f64,
        feature_classes: Vec<String>,
        feature_codes: Vec<String>,
    },

    /// Free text search
    ListGeneral { query: String },
}

impl SearchIntent {
    /// Search coordinate, if the intent carries one.
    pub fn point(&self) -> Option<Point> {
        match self {
            SearchIntent::Coordinate {
                latitude,
                longitude,
            }
            | SearchIntent::ListWithFeatures {
                latitude,
                longitude,
                ..
            } => Some(Point::new(*latitude, *longitude)),
            SearchIntent::GeonameId { .. } | SearchIntent::ListGeneral { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SearchIntent::GeonameId { .. } => "geoname_id",
            SearchIntent::Coordinate { .. } => "coordinate",
            SearchIntent::ListWithFeatures { .. } => "list_with_features",
            SearchIntent::ListGeneral { .. } => "list_general",
        }
    }
}
