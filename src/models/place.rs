//! Place record as served by the backing store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::geometry::Point;

/// GeoNames feature class (the single letter in front of the feature code).
/// See: https://www.geonames.org/export/codes.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureClass {
    /// Country, state, region
    A,
    /// Stream, lake
    H,
    /// Parks, area
    L,
    /// City, village
    P,
    /// Road, railroad
    R,
    /// Spot, building, farm
    S,
    /// Mountain, hill, rock
    T,
    /// Undersea
    U,
    /// Forest, heath
    V,
}

impl FeatureClass {
    pub fn all() -> &'static [FeatureClass] {
        &[
            FeatureClass::A,
            FeatureClass::H,
            FeatureClass::L,
            FeatureClass::P,
            FeatureClass::R,
            FeatureClass::S,
            FeatureClass::T,
            FeatureClass::U,
            FeatureClass::V,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureClass::A => "A",
            FeatureClass::H => "H",
            FeatureClass::L => "L",
            FeatureClass::P => "P",
            FeatureClass::R => "R",
            FeatureClass::S => "S",
            FeatureClass::T => "T",
            FeatureClass::U => "U",
            FeatureClass::V => "V",
        }
    }
}

impl fmt::Display for FeatureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureClass::all()
            .iter()
            .find(|class| class.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown feature class '{}'", s))
    }
}

/// First-order to fourth-order administrative division codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCodes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin3: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin4: Option<String>,
}

impl AdminCodes {
    /// Code at a 1-based depth (1 = admin1).
    pub fn get(&self, depth: usize) -> Option<&str> {
        match depth {
            1 => self.admin1.as_deref(),
            2 => self.admin2.as_deref(),
            3 => self.admin3.as_deref(),
            4 => self.admin4.as_deref(),
            _ => None,
        }
    }
}

/// A geographic place. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    geoname_id: u64,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ascii_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    alternate_names: Vec<String>,
    coordinate: Point,
    feature_class: FeatureClass,
    feature_code: String,
    country_code: String,
    #[serde(default)]
    admin_codes: AdminCodes,
    population: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    elevation: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modification_date: Option<NaiveDate>,
}

impl Place {
    /// Create a new place with minimal required fields
    pub fn new(
        geoname_id: u64,
        name: impl Into<String>,
        coordinate: Point,
        feature_class: FeatureClass,
        feature_code: impl Into<String>,
    ) -> Self {
        Self {
            geoname_id,
            name: name.into(),
            ascii_name: None,
            alternate_names: Vec::new(),
            coordinate,
            feature_class,
            feature_code: feature_code.into(),
            country_code: String::new(),
            admin_codes: AdminCodes::default(),
            population: 0,
            elevation: None,
            timezone: None,
            modification_date: None,
        }
    }

    pub fn with_ascii_name(mut self, ascii_name: impl Into<String>) -> Self {
        self.ascii_name = Some(ascii_name.into());
        self
    }

    pub fn with_alternate_names(mut self, names: Vec<String>) -> Self {
        self.alternate_names = names;
        self
    }

    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = country_code.into();
        self
    }

    pub fn with_admin_codes(mut self, admin_codes: AdminCodes) -> Self {
        self.admin_codes = admin_codes;
        self
    }

    pub fn with_population(mut self, population: u64) -> Self {
        self.population = population;
        self
    }

    pub fn with_elevation(mut self, elevation: Option<i32>) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn with_modification_date(mut self, date: NaiveDate) -> Self {
        self.modification_date = Some(date);
        self
    }

    pub fn geoname_id(&self) -> u64 {
        self.geoname_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ascii_name(&self) -> Option<&str> {
        self.ascii_name.as_deref()
    }

    pub fn alternate_names(&self) -> &[String] {
        &self.alternate_names
    }

    pub fn coordinate(&self) -> &Point {
        &self.coordinate
    }

    pub fn feature_class(&self) -> FeatureClass {
        self.feature_class
    }

    pub fn feature_code(&self) -> &str {
        &self.feature_code
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn admin_codes(&self) -> &AdminCodes {
        &self.admin_codes
    }

    pub fn population(&self) -> u64 {
        self.population
    }

    pub fn elevation(&self) -> Option<i32> {
        self.elevation
    }

    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }

    pub fn modification_date(&self) -> Option<NaiveDate> {
        self.modification_date
    }

    /// Case-insensitive match against the name, ascii name and alternate names.
    pub fn matches_name(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        std::iter::once(self.name.as_str())
            .chain(self.ascii_name.as_deref())
            .chain(self.alternate_names.iter().map(String::as_str))
            .any(|name| name.to_lowercase().contains(&query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_class_parse() {
        assert_eq!("P".parse::<FeatureClass>(), Ok(FeatureClass::P));
        assert!("X".parse::<FeatureClass>().is_err());
        assert!("PP".parse::<FeatureClass>().is_err());
    }

    #[test]
    fn test_admin_codes_depth() {
        let codes = AdminCodes {
            admin1: Some("16".to_string()),
            admin2: Some("00".to_string()),
            ..Default::default()
        };
        assert_eq!(codes.get(1), Some("16"));
        assert_eq!(codes.get(2), Some("00"));
        assert_eq!(codes.get(3), None);
        assert_eq!(codes.get(0), None);
    }

    #[test]
    fn test_matches_name() {
        let place = Place::new(2950159, "Berlin", Point::new(52.52437, 13.41053), FeatureClass::P, "PPLC")
            .with_ascii_name("Berlin")
            .with_alternate_names(vec!["Berlyn".to_string(), "Bärlin".to_string()]);

        assert!(place.matches_name("berl"));
        assert!(place.matches_name("BÄRLIN"));
        assert!(!place.matches_name("Hamburg"));
    }
}
