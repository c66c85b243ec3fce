use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{format_pairs, parse_pairs, split_srid, Point};
use crate::error::GeometryError;

// Only the outer ring is read; interior rings are ignored.
static POLYGON_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)POLYGON\s*\(\s*\(([^()]*)\)").expect("POLYGON regex should compile")
});

/// Outer ring of a polygon. The ring is closed implicitly when written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
    srid: i32,
}

impl Polygon {
    pub fn new(points: Vec<Point>, srid: i32) -> Result<Self, GeometryError> {
        if points.is_empty() {
            return Err(GeometryError::MalformedGeometry(
                "polygon needs at least one point".to_string(),
            ));
        }
        Ok(Self { points, srid })
    }

    /// Parse `SRID=<n>;POLYGON((<lon> <lat>, ...))`. Points are kept as written.
    pub fn parse(text: &str) -> Result<Self, GeometryError> {
        let (srid, body) = split_srid(text)?;
        let caps = POLYGON_CLAUSE.captures(body).ok_or_else(|| {
            GeometryError::MalformedGeometry(format!("no POLYGON clause in '{}'", text.trim()))
        })?;

        Self::new(parse_pairs(&caps[1], srid)?, srid)
    }

    /// Text for the store. The first point is repeated at the end when the ring is
    /// open, so this is not the inverse of [`Polygon::parse`].
    pub fn to_text(&self) -> String {
        let closing = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if first != last => Some(first),
            _ => None,
        };

        format!(
            "SRID={};POLYGON(({}))",
            self.srid,
            format_pairs(self.points.iter().chain(closing))
        )
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }
}

impl From<&Polygon> for geo::Polygon<f64> {
    fn from(polygon: &Polygon) -> Self {
        let exterior: geo::LineString<f64> = polygon
            .points
            .iter()
            .map(|p| geo::Coord {
                x: p.longitude(),
                y: p.latitude(),
            })
            .collect();
        geo::Polygon::new(exterior, vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_polygon() {
        let polygon =
            Polygon::parse("SRID=4326;POLYGON((13.0 52.0, 13.5 52.0, 13.5 52.5, 13.0 52.0))").unwrap();
        assert_eq!(polygon.points().len(), 4);
        assert_eq!(polygon.points()[2], Point::new(52.5, 13.5));
    }

    #[test]
    fn test_parse_polygon_ignores_holes() {
        let polygon = Polygon::parse("POLYGON((0 0, 10 0, 10 10, 0 0),(1 1, 2 1, 2 2, 1 1))").unwrap();
        assert_eq!(polygon.points().len(), 4);
    }

    #[test]
    fn test_parse_polygon_malformed() {
        assert!(Polygon::parse("POLYGON(0 0, 1 1)").is_err());
        assert!(Polygon::parse("POLYGON((0 0, x 1))").is_err());
        assert!(Polygon::parse("POLYGON(())").is_err());
    }

    #[test]
    fn test_to_text_closes_ring() {
        let polygon = Polygon::parse("POLYGON((0 0, 1 0, 1 1))").unwrap();
        assert_eq!(polygon.to_text(), "SRID=4326;POLYGON((0 0,1 0,1 1,0 0))");

        // Writing is not the inverse of reading: the re-read ring has the closing point.
        let reparsed = Polygon::parse(&polygon.to_text()).unwrap();
        assert_eq!(reparsed.points().len(), 4);
        assert_ne!(reparsed, polygon);
    }

    #[test]
    fn test_to_text_keeps_closed_ring() {
        let polygon = Polygon::parse("POLYGON((0 0, 1 0, 1 1, 0 0))").unwrap();
        assert_eq!(polygon.to_text(), "SRID=4326;POLYGON((0 0,1 0,1 1,0 0))");
    }
}
