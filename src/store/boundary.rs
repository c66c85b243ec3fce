//! R-tree over place boundaries for fast point-in-polygon prefiltering.

use geo::{BoundingRect, Intersects};
use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::info;

/// Boundary of one place, indexed by its bounding box.
#[derive(Clone)]
struct IndexedBoundary {
    geoname_id: u64,
    geometry: Arc<geo::Geometry<f64>>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedBoundary {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedBoundary {
    /// Only areal geometries are indexed.
    fn new(geoname_id: u64, geometry: Arc<geo::Geometry<f64>>) -> Option<Self> {
        match &*geometry {
            geo::Geometry::Polygon(_) | geo::Geometry::MultiPolygon(_) => {}
            _ => return None,
        }
        let rect = geometry.bounding_rect()?;
        Some(Self {
            geoname_id,
            envelope: AABB::from_corners(
                [rect.min().x, rect.min().y],
                [rect.max().x, rect.max().y],
            ),
            geometry,
        })
    }
}

/// Spatial index of place boundaries keyed by geoname id
pub struct BoundaryIndex {
    tree: RTree<IndexedBoundary>,
}

impl BoundaryIndex {
    pub fn build<'a>(shapes: impl IntoIterator<Item = (u64, &'a Arc<geo::Geometry<f64>>)>) -> Self {
        let indexed: Vec<IndexedBoundary> = shapes
            .into_iter()
            .filter_map(|(id, geometry)| IndexedBoundary::new(id, Arc::clone(geometry)))
            .collect();

        let tree = RTree::bulk_load(indexed);
        info!("Boundary index built with {} entries", tree.size());

        Self { tree }
    }

    /// Ids of all boundaries the point (lon, lat) lies in or on, ascending.
    pub fn containing(&self, lon: f64, lat: f64) -> Vec<u64> {
        let point = geo::Point::new(lon, lat);
        let query_envelope = AABB::from_point([lon, lat]);

        // Envelope candidates from the tree, then the exact test
        let mut ids: Vec<u64> = self
            .tree
            .locate_in_envelope_intersecting(&query_envelope)
            .filter(|ib| ib.geometry.intersects(&point))
            .map(|ib| ib.geoname_id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
