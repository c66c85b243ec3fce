//! Coordinate pair parsing in decimal, degree-minute-second and mixed notation.

use std::sync::LazyLock;

use regex::Regex;

/// Notation a coordinate pair was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    Decimal,
    Dms,
    Mixed,
}

/// A coordinate pair read from text, latitude first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    pub notation: Notation,
}

const DECIMAL: &str = r"[-+]?\d+(?:\.\d+)?\s*°?";
const DMS: &str = r#"\d+(?:\.\d+)?\s*°\s*\d+(?:\.\d+)?\s*[′'’]\s*(?:\d+(?:\.\d+)?\s*[″"”]\s*)?[NSEWnsew]"#;

/// Two components separated by `,` `|` `/` or whitespace.
static PAIR: LazyLock<Regex> = LazyLock::new(|| {
    let component = format!("(?:{}|{})", DMS, DECIMAL);
    Regex::new(&format!(
        r"^\s*({c})\s*(?:[,|/]|\s)\s*({c})\s*$",
        c = component
    ))
    .expect("coordinate pair regex should compile")
});

static DECIMAL_COMPONENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([-+]?\d+(?:\.\d+)?)\s*°?$").expect("decimal regex should compile")
});

static DMS_COMPONENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(\d+(?:\.\d+)?)\s*°\s*(\d+(?:\.\d+)?)\s*[′'’]\s*(?:(\d+(?:\.\d+)?)\s*[″"”]\s*)?([NSEWnsew])$"#,
    )
    .expect("DMS regex should compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Latitude,
    Longitude,
}

#[derive(Debug, Clone, Copy)]
struct Component {
    value: f64,
    axis: Option<Axis>,
    is_dms: bool,
}

/// Parse a coordinate pair. Ranges are not validated.
pub fn parse_coordinate(text: &str) -> Option<ParsedCoordinate> {
    let caps = PAIR.captures(text)?;
    let first = parse_component(caps[1].trim())?;
    let second = parse_component(caps[2].trim())?;

    let notation = match (first.is_dms, second.is_dms) {
        (false, false) => Notation::Decimal,
        (true, true) => Notation::Dms,
        _ => Notation::Mixed,
    };

    // Hemisphere letters fix the axis; without them latitude comes first.
    let (latitude, longitude) = match (first.axis, second.axis) {
        (Some(Axis::Longitude), Some(Axis::Latitude))
        | (Some(Axis::Longitude), None)
        | (None, Some(Axis::Latitude)) => (second.value, first.value),
        (Some(a), Some(b)) if a == b => return None,
        _ => (first.value, second.value),
    };

    Some(ParsedCoordinate {
        latitude,
        longitude,
        notation,
    })
}

fn parse_component(text: &str) -> Option<Component> {
    if let Some(caps) = DECIMAL_COMPONENT.captures(text) {
        return Some(Component {
            value: caps[1].parse().ok()?,
            axis: None,
            is_dms: false,
        });
    }

    let caps = DMS_COMPONENT.captures(text)?;
    let degrees: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = match caps.get(3) {
        Some(s) => s.as_str().parse().ok()?,
        None => 0.0,
    };
    let value = degrees + minutes / 60.0 + seconds / 3600.0;

    let (sign, axis) = match caps[4].to_ascii_uppercase().as_str() {
        "N" => (1.0, Axis::Latitude),
        "S" => (-1.0, Axis::Latitude),
        "E" => (1.0, Axis::Longitude),
        _ => (-1.0, Axis::Longitude),
    };

    Some(Component {
        value: sign * value,
        axis: Some(axis),
        is_dms: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_decimal() {
        let c = parse_coordinate("51.05811,13.74133").unwrap();
        assert_eq!(c.latitude, 51.05811);
        assert_eq!(c.longitude, 13.74133);
        assert_eq!(c.notation, Notation::Decimal);

        let c = parse_coordinate("-33.8688° 151.2093°").unwrap();
        assert_eq!(c.latitude, -33.8688);
        assert_eq!(c.longitude, 151.2093);
    }

    #[test]
    fn test_dms() {
        let c = parse_coordinate("51°3′29.196″N,13°44′28.788″E").unwrap();
        assert_abs_diff_eq!(c.latitude, 51.05811, epsilon = 1e-5);
        assert_abs_diff_eq!(c.longitude, 13.74133, epsilon = 1e-5);
        assert_eq!(c.notation, Notation::Dms);
    }

    #[test]
    fn test_dms_ascii_marks_and_spaces() {
        let c = parse_coordinate(r#"51° 3' 29.196" N / 13° 44' 28.788" E"#).unwrap();
        assert_abs_diff_eq!(c.latitude, 51.05811, epsilon = 1e-5);
        assert_abs_diff_eq!(c.longitude, 13.74133, epsilon = 1e-5);
    }

    #[test]
    fn test_southern_western_hemisphere() {
        let c = parse_coordinate("33°52′7.68″S 151°12′33.48″W").unwrap();
        assert_abs_diff_eq!(c.latitude, -33.8688, epsilon = 1e-4);
        assert_abs_diff_eq!(c.longitude, -151.2093, epsilon = 1e-4);
    }

    #[test]
    fn test_mixed() {
        let c = parse_coordinate("51.05811, 13°44′28.788″E").unwrap();
        assert_eq!(c.notation, Notation::Mixed);
        assert_eq!(c.latitude, 51.05811);
        assert_abs_diff_eq!(c.longitude, 13.74133, epsilon = 1e-5);
    }

    #[test]
    fn test_longitude_first_by_hemisphere() {
        let c = parse_coordinate("13°44′28.788″E 51°3′29.196″N").unwrap();
        assert_abs_diff_eq!(c.latitude, 51.05811, epsilon = 1e-5);
        assert_abs_diff_eq!(c.longitude, 13.74133, epsilon = 1e-5);
    }

    #[test]
    fn test_same_axis_rejected() {
        assert!(parse_coordinate("51°3′29.196″N,13°44′28.788″N").is_none());
    }

    #[test]
    fn test_not_a_coordinate() {
        assert!(parse_coordinate("Berlin Mitte").is_none());
        assert!(parse_coordinate("51.05811").is_none());
        assert!(parse_coordinate("51.0,13.0,12.0").is_none());
        assert!(parse_coordinate("51,05811 13,74133").is_none());
    }

    #[test]
    fn test_out_of_range_still_parses() {
        let c = parse_coordinate("123 456").unwrap();
        assert_eq!(c.latitude, 123.0);
        assert_eq!(c.longitude, 456.0);
    }
}
