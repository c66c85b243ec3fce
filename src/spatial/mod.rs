//! Spatial predicate compiler.
//!
//! Named spatial operations compile into opaque [`Expr`] values that are checked for
//! arity and operand kinds up front. A compiled expression can be rendered to PostGIS
//! SQL ([`Expr::to_sql`], [`SpatialQuery::to_sql`]) or evaluated over in-memory rows
//! ([`Expr::evaluate`], [`SpatialQuery::execute`]).

mod eval;
mod expr;
mod function;
mod query;
mod sql;

pub use eval::{geodesic_distance, Row, Value};
pub use expr::{AggregateOptions, Expr, ExprKind, SortDirection};
pub use function::SpatialFunction;
pub use query::SpatialQuery;

use crate::error::PredicateError;
use crate::geometry::DEFAULT_SRID;

/// Ordering key: distance from `field` to the point at `latitude`/`longitude`.
pub fn distance_order(
    field: &str,
    latitude: f64,
    longitude: f64,
    srid: Option<i32>,
) -> Result<Expr, PredicateError> {
    SpatialFunction::DistanceOrder.compile(vec![
        Expr::field(field),
        Expr::number(latitude),
        Expr::number(longitude),
        Expr::number(f64::from(srid.unwrap_or(DEFAULT_SRID))),
    ])
}

/// Geodesic distance between `a` and `b` is at most `meters`.
pub fn within_radius(a: Expr, b: Expr, meters: f64) -> Result<Expr, PredicateError> {
    SpatialFunction::WithinRadius.compile(vec![a, b, Expr::number(meters)])
}

pub fn closest_point(geometry: Expr, target: Expr) -> Result<Expr, PredicateError> {
    SpatialFunction::ClosestPoint.compile(vec![geometry, target])
}

pub fn intersects(a: Expr, b: Expr) -> Result<Expr, PredicateError> {
    SpatialFunction::Intersects.compile(vec![a, b])
}

/// Point in the default srid, latitude first.
pub fn make_point(latitude: Expr, longitude: Expr) -> Result<Expr, PredicateError> {
    SpatialFunction::MakePoint.compile(vec![latitude, longitude])
}

pub fn string_agg(
    field: Expr,
    delimiter: &str,
    distinct: bool,
    order_by: Option<(Expr, SortDirection)>,
) -> Result<Expr, PredicateError> {
    SpatialFunction::StringAgg.compile_with(
        vec![field, Expr::text(delimiter)],
        AggregateOptions {
            distinct,
            order_by: order_by.map(|(expr, direction)| (Box::new(expr), direction)),
        },
    )
}

pub fn distinct_on(field: Expr) -> Result<Expr, PredicateError> {
    SpatialFunction::DistinctOn.compile(vec![field])
}
