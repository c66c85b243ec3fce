use chrono_tz::Tz;
use tracing::debug;

use super::PlaceLookup;
use crate::config::VisibilityConfig;
use crate::error::ResolveError;
use crate::geometry::Point;
use crate::models::{AdminLevel, LocationHierarchy, Place};

/// IANA timezone of a place.
pub fn parse_timezone(place: &Place) -> Result<Tz, ResolveError> {
    let name = place
        .timezone()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(ResolveError::MissingTimezone {
            geoname_id: place.geoname_id(),
        })?;

    name.parse::<Tz>().map_err(|_| ResolveError::UnknownTimezone {
        geoname_id: place.geoname_id(),
        timezone: name.to_string(),
    })
}

/// Resolve the enclosing district, borough, city, state and country of `place`.
///
/// Levels hidden by `visibility` are neither looked up nor returned. A district
/// without an enclosing city is promoted to the city slot. State is looked up from
/// the finest resolved level, country from the state (or from `search_point` when no
/// state was found). Missing levels are not an error; a place without a usable
/// timezone is.
pub fn resolve<L: PlaceLookup + ?Sized>(
    lookup: &L,
    place: &Place,
    search_point: &Point,
    visibility: &VisibilityConfig,
) -> Result<LocationHierarchy, ResolveError> {
    let timezone = parse_timezone(place)?;
    let mut hierarchy = LocationHierarchy::new(*visibility, timezone, *search_point);

    if visibility.is_visible(AdminLevel::District) {
        hierarchy.district = lookup.nearest_enclosing(place, AdminLevel::District)?;
    }

    if visibility.is_visible(AdminLevel::Borough) {
        hierarchy.borough = lookup.nearest_enclosing(place, AdminLevel::Borough)?;
    }

    if visibility.is_visible(AdminLevel::City) {
        let reference = hierarchy.district.as_ref().unwrap_or(place);
        hierarchy.city = lookup.nearest_enclosing(reference, AdminLevel::City)?;

        if hierarchy.city.is_none() {
            if let Some(district) = hierarchy.district.take() {
                debug!(
                    "No city encloses district {} ({}), promoting it",
                    district.name(),
                    district.geoname_id()
                );
                hierarchy.city = Some(district);
            }
        }
    }

    let reference = hierarchy
        .district
        .as_ref()
        .or(hierarchy.city.as_ref())
        .unwrap_or(place);
    hierarchy.state = lookup.nearest_enclosing(reference, AdminLevel::State)?;

    hierarchy.country = match &hierarchy.state {
        Some(state) => lookup.nearest_enclosing(state, AdminLevel::Country)?,
        None => lookup.nearest_enclosing_by_point(search_point, AdminLevel::Country)?,
    };

    debug!(
        "Resolved hierarchy of {} ({}): {:?}",
        place.name(),
        place.geoname_id(),
        hierarchy.levels().map(|(level, _)| level).collect::<Vec<_>>()
    );

    Ok(hierarchy)
}
