use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{format_pairs, parse_pairs, split_srid, Point};
use crate::error::GeometryError;

static LINESTRING_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)LINESTRING\s*\(([^()]*)\)").expect("LINESTRING regex should compile")
});

/// Ordered, non-empty sequence of points sharing one srid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Linestring {
    points: Vec<Point>,
    srid: i32,
}

impl Linestring {
    pub fn new(points: Vec<Point>, srid: i32) -> Result<Self, GeometryError> {
        if points.is_empty() {
            return Err(GeometryError::MalformedGeometry(
                "linestring needs at least one point".to_string(),
            ));
        }
        Ok(Self { points, srid })
    }

    /// Parse `SRID=<n>;LINESTRING(<lon> <lat>, ...)`.
    pub fn parse(text: &str) -> Result<Self, GeometryError> {
        let (srid, body) = split_srid(text)?;
        let caps = LINESTRING_CLAUSE.captures(body).ok_or_else(|| {
            GeometryError::MalformedGeometry(format!("no LINESTRING clause in '{}'", text.trim()))
        })?;

        Self::new(parse_pairs(&caps[1], srid)?, srid)
    }

    /// Text for the store, `SRID=<n>;LINESTRING(<lon> <lat>,...)`.
    pub fn to_text(&self) -> String {
        format!("SRID={};LINESTRING({})", self.srid, format_pairs(&self.points))
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }
}

impl From<&Linestring> for geo::LineString<f64> {
    fn from(line: &Linestring) -> Self {
        line.points
            .iter()
            .map(|p| geo::Coord {
                x: p.longitude(),
                y: p.latitude(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DEFAULT_SRID;

    #[test]
    fn test_parse_linestring() {
        let line = Linestring::parse("SRID=4326;LINESTRING(13.0 52.0, 13.5 52.25,14 52.5)").unwrap();
        assert_eq!(line.points().len(), 3);
        assert_eq!(line.points()[1], Point::new(52.25, 13.5));
        assert_eq!(line.srid(), 4326);
    }

    #[test]
    fn test_parse_linestring_default_srid() {
        let line = Linestring::parse("LINESTRING(1 2)").unwrap();
        assert_eq!(line.srid(), DEFAULT_SRID);
        assert_eq!(line.points()[0].srid(), DEFAULT_SRID);
    }

    #[test]
    fn test_parse_linestring_malformed() {
        assert!(Linestring::parse("LINESTRING()").is_err());
        assert!(Linestring::parse("LINESTRING(1 2, 3)").is_err());
        assert!(Linestring::parse("LINESTRING 1 2, 3 4").is_err());
        assert!(Linestring::parse("POINT(1 2)").is_err());
    }

    #[test]
    fn test_to_text() {
        let line = Linestring::new(vec![Point::new(52.0, 13.0), Point::new(52.5, 13.5)], 4326).unwrap();
        assert_eq!(line.to_text(), "SRID=4326;LINESTRING(13 52,13.5 52.5)");
    }

    #[test]
    fn test_empty_rejected() {
        assert!(Linestring::new(vec![], 4326).is_err());
    }
}
