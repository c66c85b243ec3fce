use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{parse_pair, split_srid, DEFAULT_SRID};
use crate::error::GeometryError;

static POINT_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*POINT\s*\(([^()]*)\)\s*$").expect("POINT regex should compile")
});

/// Geographic point (lat/lon) tagged with a spatial reference.
///
/// Stored latitude first, written longitude first (`POINT(lon lat)`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    latitude: f64,
    longitude: f64,
    srid: i32,
}

impl Point {
    /// Create a WGS84 point. Ranges are not checked, see [`Point::is_within_bounds`].
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self::with_srid(latitude, longitude, DEFAULT_SRID)
    }

    pub fn with_srid(latitude: f64, longitude: f64, srid: i32) -> Self {
        Self {
            latitude,
            longitude,
            srid,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }

    /// True when latitude is within [-90, 90] and longitude within [-180, 180].
    pub fn is_within_bounds(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Parse `SRID=<n>;POINT(<lon> <lat>)`; the SRID prefix is optional.
    pub fn parse(text: &str) -> Result<Self, GeometryError> {
        let (srid, body) = split_srid(text)?;
        let caps = POINT_CLAUSE.captures(body).ok_or_else(|| {
            GeometryError::MalformedGeometry(format!(
                "expected POINT(lon lat), got '{}'",
                text.trim()
            ))
        })?;
        let (longitude, latitude) = parse_pair(&caps[1])?;

        Ok(Self::with_srid(latitude, longitude, srid))
    }

    /// Serialize as `SRID=<n>;POINT(<lon> <lat>)`.
    pub fn to_text(&self) -> String {
        format!("SRID={};POINT({} {})", self.srid, self.longitude, self.latitude)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromStr for Point {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Point::parse(s)
    }
}

impl From<Point> for geo::Point<f64> {
    fn from(point: Point) -> Self {
        geo::Point::new(point.longitude, point.latitude)
    }
}

/// `geo` points carry no SRID, so the result is always tagged `DEFAULT_SRID` (4326).
/// A point in another reference system loses its SRID on a round trip through `geo`.
impl From<geo::Point<f64>> for Point {
    fn from(point: geo::Point<f64>) -> Self {
        Point::new(point.y(), point.x())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let points = [
            Point::new(51.05811, 13.74133),
            Point::new(-33.8688, 151.2093),
            Point::new(0.0, -0.0),
            Point::new(89.999999999, -179.123456789012),
            Point::with_srid(6_000_000.5, 500_000.25, 25833),
            Point::new(1e-10, -1e-12),
        ];

        for point in points {
            let text = point.to_text();
            assert_eq!(Point::parse(&text).unwrap(), point, "round trip of {}", text);
        }
    }

    #[test]
    fn test_longitude_written_first() {
        let point = Point::new(52.52003, 13.40489);
        assert_eq!(point.to_text(), "SRID=4326;POINT(13.40489 52.52003)");

        let point = Point::new(-12.5, -77.25);
        assert_eq!(point.to_text(), "SRID=4326;POINT(-77.25 -12.5)");
    }

    #[test]
    fn test_parse_without_srid() {
        let point = Point::parse("  POINT( 13.40489   52.52003 ) ").unwrap();
        assert_eq!(point.latitude(), 52.52003);
        assert_eq!(point.longitude(), 13.40489);
        assert_eq!(point.srid(), DEFAULT_SRID);
    }

    #[test]
    fn test_parse_malformed() {
        for text in [
            "",
            "SRID=4326;",
            "POINT()",
            "POINT(13.4)",
            "POINT(13.4 abc)",
            "POINT 13.4 52.5",
            "LINESTRING(0 0, 1 1)",
            "SRID=abc;POINT(1 2)",
        ] {
            assert!(
                matches!(Point::parse(text), Err(GeometryError::MalformedGeometry(_))),
                "{:?} should not parse",
                text
            );
        }
    }

    #[test]
    fn test_bounds() {
        assert!(Point::new(90.0, -180.0).is_within_bounds());
        assert!(!Point::new(91.0, 0.0).is_within_bounds());
        assert!(!Point::new(0.0, 180.5).is_within_bounds());
    }

    #[test]
    fn test_geo_conversion_axis_order() {
        let geo_point: geo::Point<f64> = Point::new(52.5, 13.4).into();
        assert_eq!(geo_point.x(), 13.4);
        assert_eq!(geo_point.y(), 52.5);
        assert_eq!(Point::from(geo_point), Point::new(52.5, 13.4));

        let projected = Point::with_srid(6_000_000.0, 500_000.0, 25833);
        let back = Point::from(geo::Point::<f64>::from(projected));
        assert_eq!(back.srid(), DEFAULT_SRID);
        assert_eq!(back.latitude(), projected.latitude());
    }
}
