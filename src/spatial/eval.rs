//! In-memory evaluation of compiled expressions.
//!
//! Gives every [`SpatialFunction`] the meaning its PostGIS counterpart has, computed
//! with `geo`: distances are haversine meters on WGS84 coordinates.

use std::cmp::Ordering;

use geo::{Centroid, Closest, ClosestPoint, Distance, Haversine, Intersects};

use super::expr::{Expr, Node, SortDirection};
use super::SpatialFunction;
use crate::error::PredicateError;

/// A value produced by a field or an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Geometry(geo::Geometry<f64>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_geometry(&self) -> Option<&geo::Geometry<f64>> {
        match self {
            Value::Geometry(g) => Some(g),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "numeric",
            Value::Text(_) => "text",
            Value::Geometry(_) => "geometry",
        }
    }

    fn to_text(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Text(t) => Some(t.clone()),
            Value::Null | Value::Geometry(_) => None,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A record expressions are evaluated against.
pub trait Row {
    /// Value of a named field, `None` when the row has no such field.
    fn field(&self, name: &str) -> Option<Value>;
}

impl<R: Row + ?Sized> Row for &R {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }
}

/// Order two values the way PostgreSQL does: NULLs last ascending, first descending.
pub(crate) fn compare(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => match direction {
            SortDirection::Asc => Ordering::Greater,
            SortDirection::Desc => Ordering::Less,
        },
        (false, true) => match direction {
            SortDirection::Asc => Ordering::Less,
            SortDirection::Desc => Ordering::Greater,
        },
        (false, false) => {
            let ordering = match (a, b) {
                (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
                (Value::Text(x), Value::Text(y)) => x.cmp(y),
                (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
                _ => Ordering::Equal,
            };
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
    }
}

/// Meters from `point` to the nearest point of `geometry`.
///
/// Zero when the point lies on or inside the geometry; `None` for empty geometries.
pub fn geodesic_distance(geometry: &geo::Geometry<f64>, point: &geo::Point<f64>) -> Option<f64> {
    if geometry.intersects(point) {
        return Some(0.0);
    }
    match geometry.closest_point(point) {
        Closest::Intersection(p) | Closest::SinglePoint(p) => Some(Haversine.distance(p, *point)),
        Closest::Indeterminate => None,
    }
}

/// Meters between two geometries. When neither is a point the distance to the
/// centroid of the second stands in for the true minimum.
fn geometry_distance(a: &geo::Geometry<f64>, b: &geo::Geometry<f64>) -> Option<f64> {
    match (a, b) {
        (_, geo::Geometry::Point(p)) => geodesic_distance(a, p),
        (geo::Geometry::Point(p), _) => geodesic_distance(b, p),
        _ if a.intersects(b) => Some(0.0),
        _ => b.centroid().and_then(|c| geodesic_distance(a, &c)),
    }
}

impl Expr {
    /// Evaluate against a single row.
    pub fn evaluate<R: Row + ?Sized>(&self, row: &R) -> Result<Value, PredicateError> {
        match &self.node {
            Node::Field(name) => row
                .field(name)
                .ok_or_else(|| PredicateError::UnknownField(name.clone())),
            Node::Number(n) => Ok(Value::Number(*n)),
            Node::Text(t) => Ok(Value::Text(t.clone())),
            Node::Geometry(g) => Ok(Value::Geometry(g.into())),
            Node::Equals(left, right) => {
                let left = left.evaluate(row)?;
                let right = right.evaluate(row)?;
                if left.is_null() || right.is_null() {
                    return Ok(Value::Null);
                }
                Ok(Value::Bool(left == right))
            }
            Node::InList(expr, values) => {
                let value = expr.evaluate(row)?;
                if value.is_null() {
                    return Ok(Value::Null);
                }
                for candidate in values {
                    if candidate.evaluate(row)? == value {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            Node::Any(predicates) => {
                for predicate in predicates {
                    if predicate.evaluate(row)?.as_bool() == Some(true) {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            Node::Call { function, args, .. } => {
                let values = args
                    .iter()
                    .map(|arg| arg.evaluate(row))
                    .collect::<Result<Vec<_>, _>>()?;
                call(*function, &values)
            }
        }
    }

    /// Evaluate an aggregate (`STRING_AGG`) over a group of rows.
    pub fn aggregate<R: Row>(&self, rows: &[R]) -> Result<Value, PredicateError> {
        let (args, options) = match &self.node {
            Node::Call {
                function: SpatialFunction::StringAgg,
                args,
                options,
            } => (args, options),
            _ => {
                return Err(PredicateError::InvalidOperandType {
                    function: SpatialFunction::StringAgg.name(),
                    position: 0,
                    expected: "an aggregate expression",
                    found: self.kind().as_str(),
                })
            }
        };

        let mut entries: Vec<(String, Value)> = Vec::new();
        let mut delimiter: Option<String> = None;
        for row in rows {
            if delimiter.is_none() {
                delimiter = args[1].evaluate(row)?.to_text();
            }
            let Some(text) = args[0].evaluate(row)?.to_text() else {
                continue;
            };
            let key = match &options.order_by {
                Some((expr, _)) => expr.evaluate(row)?,
                None => Value::Null,
            };
            entries.push((text, key));
        }

        if let Some((_, direction)) = &options.order_by {
            entries.sort_by(|a, b| compare(&a.1, &b.1, *direction));
        }
        if options.distinct {
            let mut seen: Vec<String> = Vec::with_capacity(entries.len());
            entries.retain(|(text, _)| {
                if seen.contains(text) {
                    false
                } else {
                    seen.push(text.clone());
                    true
                }
            });
        }

        if entries.is_empty() {
            return Ok(Value::Null);
        }
        let texts: Vec<String> = entries.into_iter().map(|(text, _)| text).collect();
        Ok(Value::Text(texts.join(&delimiter.unwrap_or_default())))
    }
}

fn call(function: SpatialFunction, values: &[Value]) -> Result<Value, PredicateError> {
    if values.iter().any(Value::is_null) {
        return Ok(Value::Null);
    }

    match function {
        SpatialFunction::DistanceOrder => {
            let geometry = geometry_at(function, values, 0)?;
            let point = geo::Point::new(
                number_at(function, values, 2)?,
                number_at(function, values, 1)?,
            );
            Ok(geodesic_distance(geometry, &point).into())
        }
        SpatialFunction::WithinRadius => {
            let a = geometry_at(function, values, 0)?;
            let b = geometry_at(function, values, 1)?;
            let meters = number_at(function, values, 2)?;
            Ok(geometry_distance(a, b)
                .map(|d| Value::Bool(d <= meters))
                .unwrap_or(Value::Null))
        }
        SpatialFunction::ClosestPoint => {
            let geometry = geometry_at(function, values, 0)?;
            let target = match geometry_at(function, values, 1)? {
                geo::Geometry::Point(p) => *p,
                _ => {
                    return Err(PredicateError::InvalidOperandType {
                        function: function.name(),
                        position: 1,
                        expected: "a point",
                        found: "geometry",
                    })
                }
            };
            Ok(match geometry.closest_point(&target) {
                Closest::Intersection(p) | Closest::SinglePoint(p) => {
                    Value::Geometry(geo::Geometry::Point(p))
                }
                Closest::Indeterminate => Value::Null,
            })
        }
        SpatialFunction::Intersects => {
            let a = geometry_at(function, values, 0)?;
            let b = geometry_at(function, values, 1)?;
            Ok(Value::Bool(a.intersects(b)))
        }
        SpatialFunction::MakePoint => {
            let latitude = number_at(function, values, 0)?;
            let longitude = number_at(function, values, 1)?;
            Ok(Value::Geometry(geo::Geometry::Point(geo::Point::new(
                longitude, latitude,
            ))))
        }
        // Over a single row both reduce to their first argument.
        SpatialFunction::StringAgg | SpatialFunction::DistinctOn => Ok(values[0].clone()),
    }
}

fn geometry_at(
    function: SpatialFunction,
    values: &[Value],
    position: usize,
) -> Result<&geo::Geometry<f64>, PredicateError> {
    values[position]
        .as_geometry()
        .ok_or_else(|| PredicateError::InvalidOperandType {
            function: function.name(),
            position,
            expected: "a geometry",
            found: values[position].type_name(),
        })
}

fn number_at(
    function: SpatialFunction,
    values: &[Value],
    position: usize,
) -> Result<f64, PredicateError> {
    values[position]
        .as_number()
        .ok_or_else(|| PredicateError::InvalidOperandType {
            function: function.name(),
            position,
            expected: "numeric",
            found: values[position].type_name(),
        })
}
