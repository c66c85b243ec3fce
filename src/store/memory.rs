//! In-memory place store executing spatial queries with the evaluator.

use hashbrown::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::{BoundaryIndex, FeatureFilter, NearbyPlace, PlaceRepository};
use crate::config::LevelRules;
use crate::error::{LookupError, PredicateError};
use crate::geometry::{Geometry, Point};
use crate::hierarchy::PlaceLookup;
use crate::models::{AdminLevel, Distance, Place};
use crate::spatial::{
    closest_point, distance_order, within_radius, Expr, Row, SortDirection, SpatialQuery, Value,
};

/// Places held in memory, sorted by geoname id, with optional boundary shapes.
pub struct MemoryPlaceStore {
    places: Vec<Place>,
    by_id: HashMap<u64, usize>,
    shapes: HashMap<u64, Arc<geo::Geometry<f64>>>,
    boundaries: BoundaryIndex,
    rules: LevelRules,
}

/// Field view of one place for expression evaluation.
#[derive(Clone, Copy)]
struct PlaceRow<'a> {
    place: &'a Place,
    shape: Option<&'a geo::Geometry<f64>>,
}

impl Row for PlaceRow<'_> {
    fn field(&self, name: &str) -> Option<Value> {
        let place = self.place;
        let coordinate = || Value::Geometry(geo::Geometry::Point((*place.coordinate()).into()));

        let value = match name {
            "geoname_id" => Value::Number(place.geoname_id() as f64),
            "name" => Value::from(place.name()),
            "ascii_name" => Value::from(place.ascii_name()),
            "feature_class" => Value::from(place.feature_class().as_str()),
            "feature_code" => Value::from(place.feature_code()),
            "country_code" => Value::from(place.country_code()),
            "admin1" => Value::from(place.admin_codes().get(1)),
            "admin2" => Value::from(place.admin_codes().get(2)),
            "admin3" => Value::from(place.admin_codes().get(3)),
            "admin4" => Value::from(place.admin_codes().get(4)),
            "population" => Value::Number(place.population() as f64),
            "elevation" => Value::from(place.elevation().map(f64::from)),
            "timezone" => Value::from(place.timezone()),
            "coordinate" => coordinate(),
            "shape" => self.shape.cloned().map(Value::Geometry).unwrap_or(Value::Null),
            // Shape when known, otherwise the coordinate
            "geometry" => self
                .shape
                .cloned()
                .map(Value::Geometry)
                .unwrap_or_else(coordinate),
            _ => return None,
        };
        Some(value)
    }
}

fn order_nearest(
    query: SpatialQuery,
    field: &str,
    point: &Point,
) -> Result<SpatialQuery, PredicateError> {
    query
        .order_by(
            distance_order(field, point.latitude(), point.longitude(), Some(point.srid()))?,
            SortDirection::Asc,
        )?
        .order_by(Expr::field("geoname_id"), SortDirection::Asc)
}

impl MemoryPlaceStore {
    /// Build a store. Duplicate geoname ids keep the first occurrence.
    pub fn new(mut places: Vec<Place>, shapes: Vec<(u64, Geometry)>, rules: LevelRules) -> Self {
        places.sort_by_key(|p| p.geoname_id());
        places.dedup_by_key(|p| p.geoname_id());

        let by_id: HashMap<u64, usize> = places
            .iter()
            .enumerate()
            .map(|(index, place)| (place.geoname_id(), index))
            .collect();

        let shapes: HashMap<u64, Arc<geo::Geometry<f64>>> = shapes
            .iter()
            .map(|(id, geometry)| (*id, Arc::new(geo::Geometry::from(geometry))))
            .collect();
        let boundaries = BoundaryIndex::build(shapes.iter().map(|(id, geometry)| (*id, geometry)));

        info!(
            "Memory store holds {} places, {} shapes, {} boundaries",
            places.len(),
            shapes.len(),
            boundaries.len()
        );

        Self {
            places,
            by_id,
            shapes,
            boundaries,
            rules,
        }
    }

    /// Store with default level rules and no shapes.
    pub fn from_places(places: Vec<Place>) -> Self {
        Self::new(places, Vec::new(), LevelRules::default())
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn get(&self, geoname_id: u64) -> Option<&Place> {
        self.by_id.get(&geoname_id).map(|&index| &self.places[index])
    }

    pub fn shape(&self, geoname_id: u64) -> Option<&geo::Geometry<f64>> {
        self.shapes.get(&geoname_id).map(|shape| &**shape)
    }

    fn row<'a>(&'a self, place: &'a Place) -> PlaceRow<'a> {
        PlaceRow {
            place,
            shape: self.shape(place.geoname_id()),
        }
    }

    /// Run a query over every stored place, in geoname id order.
    pub fn query(&self, query: &SpatialQuery) -> Result<Vec<&Place>, PredicateError> {
        let rows = self.places.iter().map(|place| self.row(place));
        Ok(query.execute(rows)?.into_iter().map(|row| row.place).collect())
    }

    /// Candidates of a level: its class and codes, plus the reference's country and
    /// leading admin codes. Codes the reference lacks are not compared.
    fn level_query(
        &self,
        level: AdminLevel,
        reference: Option<&Place>,
    ) -> Result<SpatialQuery, PredicateError> {
        let rule = self.rules.get(level);
        let codes = rule
            .feature_codes
            .iter()
            .map(|code| Expr::text(code.as_str()))
            .collect();

        let mut query = SpatialQuery::new()
            .filter(Expr::equals(
                Expr::field("feature_class"),
                Expr::text(rule.feature_class.as_str()),
            ))?
            .filter(Expr::in_list(Expr::field("feature_code"), codes))?;

        if let Some(reference) = reference {
            if !reference.country_code().is_empty() {
                query = query.filter(Expr::equals(
                    Expr::field("country_code"),
                    Expr::text(reference.country_code()),
                ))?;
            }
            for depth in 1..=rule.admin_depth {
                if let Some(code) = reference.admin_codes().get(depth) {
                    query = query.filter(Expr::equals(
                        Expr::field(format!("admin{}", depth)),
                        Expr::text(code),
                    ))?;
                }
            }
        }

        Ok(query)
    }

    /// Nearest candidate of a level. Candidates whose boundary contains the point win
    /// over nearer ones without a containing boundary.
    fn nearest_of_level(
        &self,
        point: &Point,
        level: AdminLevel,
        reference: Option<&Place>,
    ) -> Result<Option<Place>, PredicateError> {
        let base = self.level_query(level, reference)?;

        let containing = self.boundaries.containing(point.longitude(), point.latitude());
        if !containing.is_empty() {
            let ids = containing
                .iter()
                .map(|id| Expr::number(*id as f64))
                .collect();
            let query = base
                .clone()
                .filter(Expr::in_list(Expr::field("geoname_id"), ids))?;
            let query = order_nearest(query, "coordinate", point)?.limit(1);

            if let Some(place) = self.query(&query)?.into_iter().next() {
                debug!("{} at {} by boundary: {}", level, point, place.name());
                return Ok(Some(place.clone()));
            }
        }

        let query = order_nearest(base, "geometry", point)?.limit(1);
        let found = self.query(&query)?.into_iter().next().cloned();
        debug!(
            "{} at {} by distance: {}",
            level,
            point,
            found.as_ref().map_or("none", |place| place.name())
        );
        Ok(found)
    }
}

impl PlaceLookup for MemoryPlaceStore {
    fn nearest_enclosing(
        &self,
        of: &Place,
        level: AdminLevel,
    ) -> Result<Option<Place>, LookupError> {
        Ok(self.nearest_of_level(of.coordinate(), level, Some(of))?)
    }

    fn nearest_enclosing_by_point(
        &self,
        of: &Point,
        level: AdminLevel,
    ) -> Result<Option<Place>, LookupError> {
        Ok(self.nearest_of_level(of, level, None)?)
    }
}

impl PlaceRepository for MemoryPlaceStore {
    fn find_by_id(&self, geoname_id: u64) -> Result<Option<Place>, LookupError> {
        Ok(self.get(geoname_id).cloned())
    }

    fn nearest(
        &self,
        point: &Point,
        filter: &FeatureFilter,
        limit: usize,
        radius_meters: Option<f64>,
    ) -> Result<Vec<NearbyPlace>, LookupError> {
        let mut query = SpatialQuery::new();

        let mut predicates = Vec::new();
        if !filter.classes.is_empty() {
            let classes = filter.classes.iter().map(|c| Expr::text(c.as_str())).collect();
            predicates.push(Expr::in_list(Expr::field("feature_class"), classes));
        }
        if !filter.codes.is_empty() {
            let codes = filter.codes.iter().map(|c| Expr::text(c.as_str())).collect();
            predicates.push(Expr::in_list(Expr::field("feature_code"), codes));
        }
        if !predicates.is_empty() {
            query = query.filter(Expr::any(predicates))?;
        }

        if let Some(radius) = radius_meters {
            query = query.filter(within_radius(
                Expr::field("geometry"),
                Expr::geometry(*point),
                radius,
            )?)?;
        }

        // Lines and areas are measured from the search point projected onto the shape
        let projection = closest_point(Expr::field("geometry"), Expr::geometry(*point))?;
        let query = order_nearest(query, "geometry", point)?.limit(limit);
        let rows = self.places.iter().map(|place| self.row(place));

        query
            .execute(rows)?
            .into_iter()
            .map(|row| -> Result<NearbyPlace, LookupError> {
                let nearest = match projection.evaluate(&row)? {
                    Value::Geometry(geo::Geometry::Point(p)) => {
                        Point::with_srid(p.y(), p.x(), point.srid())
                    }
                    _ => *row.place.coordinate(),
                };
                Ok(NearbyPlace {
                    distance_meters: Distance::between(point, &nearest).meters,
                    place: row.place.clone(),
                })
            })
            .collect()
    }

    fn search_by_name(&self, query: &str, limit: usize) -> Result<Vec<Place>, LookupError> {
        let needle = query.trim();
        let matches = self
            .places
            .iter()
            .filter(|place| place.matches_name(needle))
            .map(|place| self.row(place));

        let ordered = SpatialQuery::new()
            .order_by(Expr::field("population"), SortDirection::Desc)?
            .order_by(Expr::field("geoname_id"), SortDirection::Asc)?
            .limit(limit);

        Ok(ordered
            .execute(matches)?
            .into_iter()
            .map(|row| row.place.clone())
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::VisibilityConfig;
    use crate::hierarchy::resolve;
    use crate::models::{AdminCodes, FeatureClass};

    fn place(
        id: u64,
        name: &str,
        (latitude, longitude): (f64, f64),
        class: FeatureClass,
        code: &str,
        admin1: Option<&str>,
        population: u64,
    ) -> Place {
        Place::new(id, name, Point::new(latitude, longitude), class, code)
            .with_country_code("DE")
            .with_admin_codes(AdminCodes {
                admin1: admin1.map(String::from),
                ..AdminCodes::default()
            })
            .with_population(population)
            .with_timezone("Europe/Berlin")
    }

    /// A handful of places around Berlin and Dresden.
    pub(crate) fn berlin_places() -> Vec<Place> {
        use FeatureClass::*;
        vec![
            place(6944049, "Alexanderplatz", (52.5219, 13.4132), S, "SQR", Some("16"), 0),
            place(2870912, "Mitte", (52.5170, 13.3889), P, "PPLX", Some("16"), 0),
            place(2950159, "Berlin", (52.52437, 13.41053), P, "PPLC", Some("16"), 3426354),
            place(2950157, "Land Berlin", (52.5, 13.41667), A, "ADM1", Some("16"), 3574830),
            place(2921044, "Germany", (51.5, 10.5), A, "PCLI", None, 82927922),
            place(2852458, "Potsdam", (52.39886, 13.06566), P, "PPLA", Some("11"), 141669),
            place(2945356, "Brandenburg", (52.35, 13.05), A, "ADM1", Some("11"), 2511917),
            place(2935022, "Dresden", (51.05089, 13.73832), P, "PPLA", Some("13"), 486854),
            place(2842566, "Sachsen", (51.0, 13.5), A, "ADM1", Some("13"), 4077937),
            place(6325497, "Berliner Fernsehturm", (52.52081, 13.40945), S, "TOWR", Some("16"), 0),
            place(6296599, "Berlin-Tegel Airport", (52.5597, 13.2877), S, "AIRP", Some("16"), 0),
        ]
    }

    pub(crate) fn berlin_shapes() -> Vec<(u64, Geometry)> {
        vec![(
            2950157,
            Geometry::parse("SRID=4326;POLYGON((13.08 52.33,13.77 52.33,13.77 52.68,13.08 52.68))")
                .unwrap(),
        )]
    }

    pub(crate) fn berlin_store() -> MemoryPlaceStore {
        MemoryPlaceStore::new(berlin_places(), berlin_shapes(), LevelRules::default())
    }

    #[test]
    fn test_get_and_shape() {
        let store = berlin_store();
        assert_eq!(store.len(), 11);
        assert_eq!(store.get(2950159).map(|p| p.name()), Some("Berlin"));
        assert!(store.get(1).is_none());
        assert!(store.shape(2950157).is_some());
        assert!(store.shape(2950159).is_none());
    }

    #[test]
    fn test_city_respects_admin_codes() {
        let store = berlin_store();
        // Potsdam is a PPLA in Brandenburg; the PPLC in the same state wins.
        let alexanderplatz = store.get(6944049).unwrap().clone();
        let city = store
            .nearest_enclosing(&alexanderplatz, AdminLevel::City)
            .unwrap()
            .unwrap();
        assert_eq!(city.geoname_id(), 2950159);
    }

    #[test]
    fn test_boundary_beats_nearer_label_point() {
        let store = berlin_store();
        // Inside the Land Berlin polygon but closer to Brandenburg's label point
        let point = Point::new(52.36, 13.10);
        let state = store
            .nearest_enclosing_by_point(&point, AdminLevel::State)
            .unwrap()
            .unwrap();
        assert_eq!(state.geoname_id(), 2950157);
    }

    #[test]
    fn test_distance_fallback_without_boundary() {
        let store = berlin_store();
        let state = store
            .nearest_enclosing_by_point(&Point::new(51.05, 13.74), AdminLevel::State)
            .unwrap()
            .unwrap();
        assert_eq!(state.name(), "Sachsen");
    }

    #[test]
    fn test_resolve_against_store() {
        let store = berlin_store();
        let alexanderplatz = store.get(6944049).unwrap().clone();
        let hierarchy = resolve(
            &store,
            &alexanderplatz,
            alexanderplatz.coordinate(),
            &VisibilityConfig::default(),
        )
        .unwrap();

        let names: Vec<(AdminLevel, &str)> = hierarchy
            .levels()
            .map(|(level, place)| (level, place.name()))
            .collect();
        assert_eq!(
            names,
            vec![
                (AdminLevel::District, "Mitte"),
                (AdminLevel::City, "Berlin"),
                (AdminLevel::State, "Land Berlin"),
                (AdminLevel::Country, "Germany"),
            ]
        );
    }

    #[test]
    fn test_nearest_with_feature_union() {
        let store = berlin_store();
        let origin = *store.get(6944049).unwrap().coordinate();
        let filter = FeatureFilter::new(vec!["P".to_string()], vec!["TOWR".to_string()]);

        let nearby = store.nearest(&origin, &filter, 10, None).unwrap();
        let mut ids: Vec<u64> = nearby.iter().map(|n| n.place.geoname_id()).collect();
        assert!(nearby
            .windows(2)
            .all(|w| w[0].distance_meters <= w[1].distance_meters));
        ids.sort_unstable();
        assert_eq!(ids, vec![2852458, 2870912, 2935022, 2950159, 6325497]);
    }

    #[test]
    fn test_nearest_within_radius() {
        let store = berlin_store();
        let origin = *store.get(6944049).unwrap().coordinate();
        let filter = FeatureFilter::new(vec![], vec!["TOWR".to_string(), "AIRP".to_string()]);

        let all = store.nearest(&origin, &filter, 10, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].place.name(), "Berliner Fernsehturm");

        let near = store.nearest(&origin, &filter, 10, Some(2_000.0)).unwrap();
        assert_eq!(near.len(), 1);
        assert!(near[0].distance_meters < 2_000.0);
    }

    #[test]
    fn test_nearest_measures_to_line_shape() {
        let water = vec![
            place(100, "Spree", (52.68, 13.5), FeatureClass::H, "STM", None, 0),
            place(200, "See", (52.55, 13.5), FeatureClass::H, "LK", None, 0),
        ];
        let river = Geometry::parse("SRID=4326;LINESTRING(13.0 52.5009, 14.0 52.5009)").unwrap();
        let store = MemoryPlaceStore::new(water, vec![(100, river)], LevelRules::default());

        let origin = Point::new(52.5, 13.5);
        let filter = FeatureFilter::new(vec!["H".to_string()], vec![]);
        let found = store.nearest(&origin, &filter, 2, None).unwrap();

        let names: Vec<&str> = found.iter().map(|n| n.place.name()).collect();
        assert_eq!(names, vec!["Spree", "See"]);
        assert!(found[0].distance_meters < 150.0);
        assert!(found[1].distance_meters > 5_000.0);

        let near = store.nearest(&origin, &filter, 2, Some(1_000.0)).unwrap();
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].place.name(), "Spree");
    }

    #[test]
    fn test_equidistant_tie_by_id() {
        let twins = vec![
            place(20, "Zwei", (50.0, 10.0), FeatureClass::P, "PPL", None, 0),
            place(10, "Eins", (50.0, 10.0), FeatureClass::P, "PPL", None, 0),
        ];
        let store = MemoryPlaceStore::from_places(twins);
        let nearby = store
            .nearest(&Point::new(50.1, 10.0), &FeatureFilter::default(), 2, None)
            .unwrap();
        let ids: Vec<u64> = nearby.iter().map(|n| n.place.geoname_id()).collect();
        assert_eq!(ids, vec![10, 20]);
    }

    #[test]
    fn test_search_by_name() {
        let store = berlin_store();
        let found = store.search_by_name("  BERLIN ", 3).unwrap();
        let names: Vec<&str> = found.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Land Berlin", "Berlin", "Berlin-Tegel Airport"]);

        assert!(store.search_by_name("Hamburg", 10).unwrap().is_empty());
    }
}
