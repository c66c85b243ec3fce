//! Named spatial functions and their signatures.

use std::fmt;

use super::expr::{AggregateOptions, Expr, ExprKind, Node};
use crate::error::PredicateError;

/// The closed set of store functions the engine compiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpatialFunction {
    /// Nearest-first ordering key of a field against a coordinate
    DistanceOrder,
    /// Geodesic distance between two geometries is at most n meters
    WithinRadius,
    /// Point of a geometry nearest to a target point
    ClosestPoint,
    /// Two geometries share at least one point
    Intersects,
    /// Point from latitude and longitude expressions
    MakePoint,
    /// Delimited aggregation of a column
    StringAgg,
    /// One row per distinct key
    DistinctOn,
}

/// Operand expectation for one argument position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    /// Must be a column reference
    FieldRef,
    Geometry,
    Numeric,
    /// Integral numeric literal
    Srid,
    Text,
    /// Any non-boolean scalar
    Value,
}

impl Operand {
    fn describe(&self) -> &'static str {
        match self {
            Operand::FieldRef => "a field",
            Operand::Geometry => "a geometry",
            Operand::Numeric => "numeric",
            Operand::Srid => "an integer srid",
            Operand::Text => "text",
            Operand::Value => "a scalar value",
        }
    }

    fn accepts(&self, expr: &Expr) -> bool {
        let kind = expr.kind();
        match self {
            Operand::FieldRef => kind == ExprKind::Field,
            Operand::Geometry => matches!(kind, ExprKind::Field | ExprKind::Geometry),
            Operand::Numeric => matches!(kind, ExprKind::Field | ExprKind::Numeric),
            Operand::Srid => {
                matches!(&expr.node, Node::Number(n) if n.fract() == 0.0 && n.is_finite())
            }
            Operand::Text => matches!(kind, ExprKind::Field | ExprKind::Text),
            Operand::Value => matches!(
                kind,
                ExprKind::Field | ExprKind::Numeric | ExprKind::Text | ExprKind::Geometry
            ),
        }
    }
}

impl SpatialFunction {
    pub fn all() -> &'static [SpatialFunction] {
        &[
            SpatialFunction::DistanceOrder,
            SpatialFunction::WithinRadius,
            SpatialFunction::ClosestPoint,
            SpatialFunction::Intersects,
            SpatialFunction::MakePoint,
            SpatialFunction::StringAgg,
            SpatialFunction::DistinctOn,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SpatialFunction::DistanceOrder => "ST_DistanceOrder",
            SpatialFunction::WithinRadius => "ST_DWithin",
            SpatialFunction::ClosestPoint => "ST_ClosestPoint",
            SpatialFunction::Intersects => "ST_Intersects",
            SpatialFunction::MakePoint => "ST_MakePoint",
            SpatialFunction::StringAgg => "STRING_AGG",
            SpatialFunction::DistinctOn => "DISTINCT_ON",
        }
    }

    /// Look a function up by name, ignoring case.
    pub fn from_name(name: &str) -> Result<Self, PredicateError> {
        SpatialFunction::all()
            .iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
            .copied()
            .ok_or_else(|| PredicateError::UnknownFunction(name.to_string()))
    }

    fn signature(&self) -> (&'static [Operand], usize) {
        // (operands, number of required operands); the rest are optional
        match self {
            SpatialFunction::DistanceOrder => (
                &[Operand::FieldRef, Operand::Numeric, Operand::Numeric, Operand::Srid],
                3,
            ),
            SpatialFunction::WithinRadius => {
                (&[Operand::Geometry, Operand::Geometry, Operand::Numeric], 3)
            }
            SpatialFunction::ClosestPoint | SpatialFunction::Intersects => {
                (&[Operand::Geometry, Operand::Geometry], 2)
            }
            SpatialFunction::MakePoint => (&[Operand::Numeric, Operand::Numeric, Operand::Srid], 2),
            SpatialFunction::StringAgg => (&[Operand::Value, Operand::Text], 2),
            SpatialFunction::DistinctOn => (&[Operand::Value], 1),
        }
    }

    pub fn result_kind(&self) -> ExprKind {
        match self {
            SpatialFunction::DistanceOrder => ExprKind::Numeric,
            SpatialFunction::WithinRadius | SpatialFunction::Intersects => ExprKind::Boolean,
            SpatialFunction::ClosestPoint | SpatialFunction::MakePoint => ExprKind::Geometry,
            SpatialFunction::StringAgg => ExprKind::Text,
            SpatialFunction::DistinctOn => ExprKind::Key,
        }
    }

    /// Validate arguments and build the call expression.
    pub fn compile(self, args: Vec<Expr>) -> Result<Expr, PredicateError> {
        self.compile_with(args, AggregateOptions::default())
    }

    /// Like [`SpatialFunction::compile`], with `DISTINCT` / `ORDER BY` modifiers.
    /// Modifiers are only valid on `STRING_AGG`.
    pub fn compile_with(
        self,
        args: Vec<Expr>,
        options: AggregateOptions,
    ) -> Result<Expr, PredicateError> {
        let (operands, required) = self.signature();

        if args.len() < required || args.len() > operands.len() {
            let expected = if required == operands.len() {
                required.to_string()
            } else {
                format!("{}..={}", required, operands.len())
            };
            return Err(PredicateError::InvalidArgumentCount {
                function: self.name(),
                expected,
                actual: args.len(),
            });
        }

        for (position, (operand, arg)) in operands.iter().zip(&args).enumerate() {
            if !operand.accepts(arg) {
                return Err(PredicateError::InvalidOperandType {
                    function: self.name(),
                    position,
                    expected: operand.describe(),
                    found: arg.kind().as_str(),
                });
            }
        }

        let has_modifiers = options.distinct || options.order_by.is_some();
        if has_modifiers && self != SpatialFunction::StringAgg {
            return Err(PredicateError::InvalidOperandType {
                function: self.name(),
                position: args.len(),
                expected: "no aggregate modifiers",
                found: "aggregate modifiers",
            });
        }
        if let Some((order, _)) = &options.order_by {
            if order.kind() == ExprKind::Boolean || order.kind() == ExprKind::Key {
                return Err(PredicateError::InvalidOperandType {
                    function: self.name(),
                    position: args.len(),
                    expected: Operand::Value.describe(),
                    found: order.kind().as_str(),
                });
            }
        }

        Ok(Expr::call(self, args, options))
    }
}

impl fmt::Display for SpatialFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn test_from_name() {
        assert_eq!(SpatialFunction::from_name("st_dwithin"), Ok(SpatialFunction::WithinRadius));
        assert_eq!(
            SpatialFunction::from_name("ST_Buffer"),
            Err(PredicateError::UnknownFunction("ST_Buffer".to_string()))
        );
        for function in SpatialFunction::all() {
            assert_eq!(SpatialFunction::from_name(function.name()), Ok(*function));
        }
    }

    #[test]
    fn test_arity_checked() {
        let err = SpatialFunction::Intersects
            .compile(vec![Expr::field("boundary")])
            .unwrap_err();
        assert_eq!(
            err,
            PredicateError::InvalidArgumentCount {
                function: "ST_Intersects",
                expected: "2".to_string(),
                actual: 1
            }
        );

        let err = SpatialFunction::MakePoint
            .compile(vec![Expr::number(1.0); 4])
            .unwrap_err();
        assert!(matches!(
            err,
            PredicateError::InvalidArgumentCount { expected, actual: 4, .. } if expected == "2..=3"
        ));
    }

    #[test]
    fn test_operand_types_checked() {
        let err = SpatialFunction::WithinRadius
            .compile(vec![
                Expr::field("coordinate"),
                Expr::geometry(Point::new(52.5, 13.4)),
                Expr::text("ten"),
            ])
            .unwrap_err();
        assert!(matches!(
            err,
            PredicateError::InvalidOperandType { position: 2, found: "text", .. }
        ));

        let err = SpatialFunction::DistanceOrder
            .compile(vec![
                Expr::geometry(Point::new(52.5, 13.4)),
                Expr::number(52.5),
                Expr::number(13.4),
            ])
            .unwrap_err();
        assert!(matches!(
            err,
            PredicateError::InvalidOperandType { position: 0, expected: "a field", .. }
        ));

        let err = SpatialFunction::MakePoint
            .compile(vec![Expr::number(1.0), Expr::number(2.0), Expr::number(4326.5)])
            .unwrap_err();
        assert!(matches!(err, PredicateError::InvalidOperandType { position: 2, .. }));
    }

    #[test]
    fn test_boolean_not_accepted_as_geometry() {
        let predicate = SpatialFunction::Intersects
            .compile(vec![Expr::field("a"), Expr::field("b")])
            .unwrap();
        let err = SpatialFunction::ClosestPoint
            .compile(vec![predicate, Expr::field("b")])
            .unwrap_err();
        assert!(matches!(err, PredicateError::InvalidOperandType { found: "boolean", .. }));
    }

    #[test]
    fn test_modifiers_only_on_string_agg() {
        let options = AggregateOptions {
            distinct: true,
            order_by: None,
        };
        assert!(SpatialFunction::DistinctOn
            .compile_with(vec![Expr::field("name")], options.clone())
            .is_err());
        assert!(SpatialFunction::StringAgg
            .compile_with(vec![Expr::field("name"), Expr::text(",")], options)
            .is_ok());
    }
}
