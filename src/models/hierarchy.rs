//! Resolved administrative hierarchy for one place.

use chrono_tz::Tz;
use serde::{Serialize, Serializer};

use super::{AdminLevel, LocatedPlace, Place};
use crate::config::VisibilityConfig;
use crate::geometry::Point;

/// Enclosing places of a located place, one optional slot per level.
///
/// Built fresh by the resolver for every call; a slot is only filled when the
/// level is visible and its lookup produced a place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationHierarchy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<Place>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub borough: Option<Place>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<Place>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Place>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<Place>,

    /// Visibility flags the hierarchy was resolved with
    pub visibility: VisibilityConfig,

    /// Timezone of the resolved place
    #[serde(serialize_with = "serialize_tz")]
    pub timezone: Tz,

    /// Point distances and bearings are measured from
    pub search_point: Point,
}

impl LocationHierarchy {
    pub fn new(visibility: VisibilityConfig, timezone: Tz, search_point: Point) -> Self {
        Self {
            district: None,
            borough: None,
            city: None,
            state: None,
            country: None,
            visibility,
            timezone,
            search_point,
        }
    }

    /// Get the place for a given level
    pub fn get(&self, level: AdminLevel) -> Option<&Place> {
        match level {
            AdminLevel::District => self.district.as_ref(),
            AdminLevel::Borough => self.borough.as_ref(),
            AdminLevel::City => self.city.as_ref(),
            AdminLevel::State => self.state.as_ref(),
            AdminLevel::Country => self.country.as_ref(),
        }
    }

    /// Set the place for a given level
    pub fn set(&mut self, level: AdminLevel, place: Option<Place>) {
        match level {
            AdminLevel::District => self.district = place,
            AdminLevel::Borough => self.borough = place,
            AdminLevel::City => self.city = place,
            AdminLevel::State => self.state = place,
            AdminLevel::Country => self.country = place,
        }
    }

    /// Filled levels, district first.
    pub fn levels(&self) -> impl Iterator<Item = (AdminLevel, &Place)> {
        AdminLevel::all()
            .iter()
            .filter_map(move |level| self.get(*level).map(|place| (*level, place)))
    }

    /// Place of a level with distance and bearing from the search point.
    pub fn located(&self, level: AdminLevel) -> Option<LocatedPlace> {
        self.get(level)
            .map(|place| LocatedPlace::new(place.clone(), &self.search_point))
    }

    pub fn is_empty(&self) -> bool {
        self.levels().next().is_none()
    }
}

fn serialize_tz<S: Serializer>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(tz.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureClass;

    #[test]
    fn test_set_and_levels() {
        let mut hierarchy = LocationHierarchy::new(
            VisibilityConfig::default(),
            chrono_tz::Europe::Berlin,
            Point::new(52.5, 13.4),
        );
        assert!(hierarchy.is_empty());

        let state = Place::new(2950157, "Land Berlin", Point::new(52.5, 13.41), FeatureClass::A, "ADM1");
        hierarchy.set(AdminLevel::State, Some(state.clone()));

        let levels: Vec<_> = hierarchy.levels().map(|(level, _)| level).collect();
        assert_eq!(levels, vec![AdminLevel::State]);
        assert_eq!(hierarchy.get(AdminLevel::State), Some(&state));

        let located = hierarchy.located(AdminLevel::State).unwrap();
        assert!(located.distance.meters < 1000.0);
        assert!(hierarchy.located(AdminLevel::City).is_none());
    }

    #[test]
    fn test_serializes_timezone_name() {
        let hierarchy = LocationHierarchy::new(
            VisibilityConfig::default(),
            chrono_tz::Europe::Berlin,
            Point::new(52.5, 13.4),
        );
        let json = serde_json::to_value(&hierarchy).unwrap();
        assert_eq!(json["timezone"], "Europe/Berlin");
        assert!(json.get("city").is_none());
    }
}
