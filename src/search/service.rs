//! Location search service.

use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::classify::{classify, SearchIntent};
use crate::config::Config;
use crate::error::SearchError;
use crate::geometry::Point;
use crate::hierarchy::{resolve, PlaceLookup};
use crate::models::{Distance, LocatedPlace, Place};
use crate::store::{FeatureFilter, PlaceRepository};
use crate::timing::{timed, NoopTimer, TimingObserver};

/// Result of one search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub intent: SearchIntent,
    pub results: Vec<LocatedPlace>,
}

/// Classifies queries, runs them against a store and enriches the matches.
pub struct LocationService<S> {
    store: S,
    config: Config,
    timer: Arc<dyn TimingObserver>,
}

impl<S: PlaceLookup + PlaceRepository> LocationService<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self {
            store,
            config,
            timer: Arc::new(NoopTimer),
        }
    }

    /// Report stage timings (`classify`, `lookup`, `resolve`) to `timer`.
    pub fn with_timer(mut self, timer: Arc<dyn TimingObserver>) -> Self {
        self.timer = timer;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Search with the configured default limit.
    pub fn search(&self, text: &str) -> Result<SearchResponse, SearchError> {
        self.search_with_limit(text, None)
    }

    /// Search, clamping `limit` to the configured maximum. The limit only applies to
    /// list searches; id and coordinate searches return at most one place.
    pub fn search_with_limit(
        &self,
        text: &str,
        limit: Option<usize>,
    ) -> Result<SearchResponse, SearchError> {
        let intent = timed(self.timer.as_ref(), "classify", || classify(text));
        let limit = self.config.limit(limit);

        let results = match &intent {
            SearchIntent::GeonameId { id } => {
                let place = timed(self.timer.as_ref(), "lookup", || self.store.find_by_id(*id))?
                    .ok_or(SearchError::NotFound(*id))?;
                let origin = *place.coordinate();
                vec![self.enrich(place, &origin, Distance::from_meters(0.0))?]
            }

            SearchIntent::Coordinate {
                latitude,
                longitude,
            } => {
                let point = self.checked_point(*latitude, *longitude)?;
                let filter = FeatureFilter::new(
                    self.config
                        .search
                        .coordinate_feature_classes
                        .iter()
                        .map(|class| class.to_string())
                        .collect(),
                    Vec::new(),
                );
                let nearest = timed(self.timer.as_ref(), "lookup", || {
                    self.store.nearest(&point, &filter, 1, None)
                })?;

                match nearest.into_iter().next() {
                    Some(found) => {
                        let distance = Distance::from_meters(found.distance_meters);
                        vec![self.enrich(found.place, &point, distance)?]
                    }
                    None => Vec::new(),
                }
            }

            SearchIntent::ListWithFeatures {
                latitude,
                longitude,
                feature_classes,
                feature_codes,
            } => {
                let point = self.checked_point(*latitude, *longitude)?;
                let filter = FeatureFilter::new(feature_classes.clone(), feature_codes.clone());
                let radius = self.config.search.radius_meters;
                let nearby = timed(self.timer.as_ref(), "lookup", || {
                    self.store.nearest(&point, &filter, limit, radius)
                })?;

                nearby
                    .into_iter()
                    .map(|found| {
                        let distance = Distance::from_meters(found.distance_meters);
                        self.enrich(found.place, &point, distance)
                    })
                    .collect::<Result<Vec<_>, SearchError>>()?
            }

            SearchIntent::ListGeneral { query } => {
                if query.is_empty() {
                    Vec::new()
                } else {
                    let places = timed(self.timer.as_ref(), "lookup", || {
                        self.store.search_by_name(query, limit)
                    })?;
                    // Without a search point places are located relative to themselves.
                    places
                        .into_iter()
                        .map(|place| {
                            let origin = *place.coordinate();
                            self.enrich(place, &origin, Distance::from_meters(0.0))
                        })
                        .collect::<Result<Vec<_>, SearchError>>()?
                }
            }
        };

        debug!(
            "Search '{}' ({}) returned {} results",
            text.trim(),
            intent.name(),
            results.len()
        );

        Ok(SearchResponse {
            query: text.trim().to_string(),
            intent,
            results,
        })
    }

    fn checked_point(&self, latitude: f64, longitude: f64) -> Result<Point, SearchError> {
        let point = Point::new(latitude, longitude);
        if self.config.search.validate_coordinates && !point.is_within_bounds() {
            return Err(SearchError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(point)
    }

    fn enrich(
        &self,
        place: Place,
        origin: &Point,
        distance: Distance,
    ) -> Result<LocatedPlace, SearchError> {
        let visibility = self.config.visibility.for_country(place.country_code());
        let hierarchy = timed(self.timer.as_ref(), "resolve", || {
            resolve(&self.store, &place, origin, &visibility)
        })?;
        Ok(LocatedPlace::with_distance(place, origin, distance).with_hierarchy(hierarchy))
    }
}

impl<S: PlaceLookup + PlaceRepository + Sync> LocationService<S> {
    /// Run independent searches in parallel. Results keep the input order.
    pub fn search_many<T: AsRef<str> + Sync>(
        &self,
        texts: &[T],
    ) -> Vec<Result<SearchResponse, SearchError>> {
        self.search_many_with_limit(texts, None)
    }

    pub fn search_many_with_limit<T: AsRef<str> + Sync>(
        &self,
        texts: &[T],
        limit: Option<usize>,
    ) -> Vec<Result<SearchResponse, SearchError>> {
        info!("Running {} searches", texts.len());
        texts
            .par_iter()
            .map(|text| self.search_with_limit(text.as_ref(), limit))
            .collect()
    }
}
