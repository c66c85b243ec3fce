//! Geometry value types and their spatial text form.
//!
//! Geometries are written as `SRID=<n>;SHAPE(...)`, the extended WKT accepted by the
//! backing store. Coordinates inside the text are always `longitude latitude`, while
//! the value types store latitude first.

mod linestring;
mod point;
mod polygon;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

pub use linestring::Linestring;
pub use point::Point;
pub use polygon::Polygon;

/// WGS84, the reference system every geometry falls back to.
pub const DEFAULT_SRID: i32 = 4326;

static SRID_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*SRID\s*=\s*(-?\d+)\s*;").expect("SRID regex should compile")
});

/// Any geometry the engine reads or writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    Point(Point),
    Linestring(Linestring),
    Polygon(Polygon),
}

impl Geometry {
    /// Parse spatial text, dispatching on the shape keyword.
    pub fn parse(text: &str) -> Result<Self, GeometryError> {
        let (_, body) = split_srid(text)?;
        let keyword = body.trim_start().to_ascii_uppercase();

        if keyword.starts_with("POINT") {
            Point::parse(text).map(Geometry::Point)
        } else if keyword.starts_with("LINESTRING") {
            Linestring::parse(text).map(Geometry::Linestring)
        } else if keyword.starts_with("POLYGON") {
            Polygon::parse(text).map(Geometry::Polygon)
        } else {
            Err(GeometryError::MalformedGeometry(format!(
                "unsupported geometry '{}'",
                text.trim()
            )))
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Geometry::Point(p) => p.to_text(),
            Geometry::Linestring(l) => l.to_text(),
            Geometry::Polygon(p) => p.to_text(),
        }
    }

    pub fn srid(&self) -> i32 {
        match self {
            Geometry::Point(p) => p.srid(),
            Geometry::Linestring(l) => l.srid(),
            Geometry::Polygon(p) => p.srid(),
        }
    }

    /// Short name used in error messages and SQL comments.
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "point",
            Geometry::Linestring(_) => "linestring",
            Geometry::Polygon(_) => "polygon",
        }
    }
}

impl From<Point> for Geometry {
    fn from(point: Point) -> Self {
        Geometry::Point(point)
    }
}

impl From<Linestring> for Geometry {
    fn from(line: Linestring) -> Self {
        Geometry::Linestring(line)
    }
}

impl From<Polygon> for Geometry {
    fn from(polygon: Polygon) -> Self {
        Geometry::Polygon(polygon)
    }
}

impl From<&Geometry> for geo::Geometry<f64> {
    fn from(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Point(p) => geo::Geometry::Point((*p).into()),
            Geometry::Linestring(l) => geo::Geometry::LineString(l.into()),
            Geometry::Polygon(p) => geo::Geometry::Polygon(p.into()),
        }
    }
}

/// Strip an optional `SRID=<n>;` prefix, returning the srid and the remaining text.
pub(crate) fn split_srid(text: &str) -> Result<(i32, &str), GeometryError> {
    match SRID_PREFIX.captures(text) {
        Some(caps) => {
            let srid = caps[1].parse::<i32>().map_err(|_| {
                GeometryError::MalformedGeometry(format!("invalid SRID '{}'", &caps[1]))
            })?;
            let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
            Ok((srid, &text[end..]))
        }
        None => Ok((DEFAULT_SRID, text)),
    }
}

/// Parse one `lon lat` pair. Returns `(longitude, latitude)`.
pub(crate) fn parse_pair(pair: &str) -> Result<(f64, f64), GeometryError> {
    let mut tokens = pair.split_whitespace();
    let (lon, lat) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(lon), Some(lat), None) => (lon, lat),
        _ => {
            return Err(GeometryError::MalformedGeometry(format!(
                "expected 'lon lat', got '{}'",
                pair.trim()
            )))
        }
    };

    Ok((parse_ordinate(lon)?, parse_ordinate(lat)?))
}

/// Parse a comma separated list of `lon lat` pairs into points sharing one srid.
pub(crate) fn parse_pairs(body: &str, srid: i32) -> Result<Vec<Point>, GeometryError> {
    body.split(',')
        .map(|pair| parse_pair(pair).map(|(lon, lat)| Point::with_srid(lat, lon, srid)))
        .collect()
}

fn parse_ordinate(token: &str) -> Result<f64, GeometryError> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(GeometryError::MalformedGeometry(format!(
            "invalid coordinate '{}'",
            token
        ))),
    }
}

/// Render points as `lon lat,lon lat`.
pub(crate) fn format_pairs<'a>(points: impl IntoIterator<Item = &'a Point>) -> String {
    points
        .into_iter()
        .map(|p| format!("{} {}", p.longitude(), p.latitude()))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_srid_defaults() {
        let (srid, rest) = split_srid("POINT(1 2)").unwrap();
        assert_eq!(srid, DEFAULT_SRID);
        assert_eq!(rest, "POINT(1 2)");

        let (srid, rest) = split_srid("srid=3857;POINT(1 2)").unwrap();
        assert_eq!(srid, 3857);
        assert_eq!(rest, "POINT(1 2)");
    }

    #[test]
    fn test_parse_pair_rejects_extra_tokens() {
        assert!(parse_pair("1 2 3").is_err());
        assert!(parse_pair("1").is_err());
        assert!(parse_pair("1 NaN").is_err());
        assert_eq!(parse_pair(" 13.5  52.25 ").unwrap(), (13.5, 52.25));
    }

    #[test]
    fn test_geometry_dispatch() {
        let geometry = Geometry::parse("SRID=4326;LINESTRING(13.0 52.0, 13.1 52.1)").unwrap();
        assert_eq!(geometry.kind(), "linestring");

        let geometry = Geometry::parse("POLYGON((0 0, 1 0, 1 1, 0 0))").unwrap();
        assert_eq!(geometry.kind(), "polygon");
        assert_eq!(geometry.srid(), DEFAULT_SRID);

        let polygon = Polygon::parse("POLYGON((0 0, 1 0, 1 1, 0 0))").unwrap();
        assert_eq!(Geometry::from(polygon.clone()), Geometry::Polygon(polygon));
        let line = Linestring::parse("LINESTRING(13.0 52.0, 13.1 52.1)").unwrap();
        assert_eq!(Geometry::from(line).kind(), "linestring");

        assert!(matches!(
            Geometry::parse("MULTIPOINT((0 0))"),
            Err(GeometryError::MalformedGeometry(_))
        ));
    }
}
