//! PostGIS rendering of compiled expressions.
//!
//! Points are built with `ST_MakePoint(lon, lat)`, so this is one of the places where
//! the latitude-first argument order of the API is swapped.

use super::expr::{Expr, Node};
use super::SpatialFunction;
use crate::geometry::DEFAULT_SRID;

impl Expr {
    /// Render as a PostGIS SQL fragment.
    pub fn to_sql(&self) -> String {
        match &self.node {
            Node::Field(name) => name.clone(),
            Node::Number(value) => format!("{}", value),
            Node::Text(value) => quote(value),
            Node::Geometry(geometry) => format!("ST_GeomFromEWKT({})", quote(&geometry.to_text())),
            Node::Equals(left, right) => format!("{} = {}", left.to_sql(), right.to_sql()),
            Node::InList(expr, values) => {
                let values: Vec<String> = values.iter().map(Expr::to_sql).collect();
                format!("{} IN ({})", expr.to_sql(), values.join(", "))
            }
            Node::Any(predicates) => {
                if predicates.is_empty() {
                    return "FALSE".to_string();
                }
                let predicates: Vec<String> = predicates.iter().map(Expr::to_sql).collect();
                format!("({})", predicates.join(" OR "))
            }
            Node::Call {
                function,
                args,
                options,
            } => {
                let args: Vec<String> = args.iter().map(Expr::to_sql).collect();
                match function {
                    SpatialFunction::DistanceOrder => format!(
                        "{} <-> {}",
                        args[0],
                        point_sql(&args[1], &args[2], args.get(3))
                    ),
                    SpatialFunction::WithinRadius => format!(
                        "ST_DWithin(CAST({} AS geography), CAST({} AS geography), {})",
                        args[0], args[1], args[2]
                    ),
                    SpatialFunction::ClosestPoint => {
                        format!("ST_ClosestPoint({}, {})", args[0], args[1])
                    }
                    SpatialFunction::Intersects => {
                        format!("ST_Intersects({}, {})", args[0], args[1])
                    }
                    SpatialFunction::MakePoint => point_sql(&args[0], &args[1], args.get(2)),
                    SpatialFunction::StringAgg => {
                        let distinct = if options.distinct { "DISTINCT " } else { "" };
                        let order = match &options.order_by {
                            Some((expr, direction)) => {
                                format!(" ORDER BY {} {}", expr.to_sql(), direction.as_sql())
                            }
                            None => String::new(),
                        };
                        format!("STRING_AGG({}{}, {}{})", distinct, args[0], args[1], order)
                    }
                    SpatialFunction::DistinctOn => format!("DISTINCT ON ({})", args[0]),
                }
            }
        }
    }
}

fn point_sql(latitude: &str, longitude: &str, srid: Option<&String>) -> String {
    let srid = srid.cloned().unwrap_or_else(|| DEFAULT_SRID.to_string());
    format!("ST_SetSRID(ST_MakePoint({}, {}), {})", longitude, latitude, srid)
}

/// Single-quoted SQL string literal.
pub(crate) fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
