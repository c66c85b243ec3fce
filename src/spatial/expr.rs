//! Expression tree produced by the spatial function compiler.

use crate::geometry::Geometry;

use super::SpatialFunction;

/// What an expression yields once evaluated by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprKind {
    /// Column reference; its type is only known to the store
    Field,
    Numeric,
    Text,
    Geometry,
    Boolean,
    /// Row key for `DISTINCT ON`
    Key,
}

impl ExprKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExprKind::Field => "field",
            ExprKind::Numeric => "numeric",
            ExprKind::Text => "text",
            ExprKind::Geometry => "geometry",
            ExprKind::Boolean => "boolean",
            ExprKind::Key => "distinct key",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Modifiers of `STRING_AGG`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregateOptions {
    pub distinct: bool,
    pub order_by: Option<(Box<Expr>, SortDirection)>,
}

/// Opaque expression for inclusion in a larger query.
///
/// Function calls can only be built through [`SpatialFunction::compile`], so every
/// call in a tree has passed arity and operand checks.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub(crate) node: Node,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Field(String),
    Number(f64),
    Text(String),
    Geometry(Geometry),
    Equals(Box<Expr>, Box<Expr>),
    InList(Box<Expr>, Vec<Expr>),
    Any(Vec<Expr>),
    Call {
        function: SpatialFunction,
        args: Vec<Expr>,
        options: AggregateOptions,
    },
}

impl Expr {
    /// Column reference, e.g. `coordinate` or `p.feature_code`.
    pub fn field(name: impl Into<String>) -> Self {
        Self::from(Node::Field(name.into()))
    }

    pub fn number(value: f64) -> Self {
        Self::from(Node::Number(value))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::from(Node::Text(value.into()))
    }

    pub fn geometry(geometry: impl Into<Geometry>) -> Self {
        Self::from(Node::Geometry(geometry.into()))
    }

    /// `left = right`
    pub fn equals(left: Expr, right: Expr) -> Self {
        Self::from(Node::Equals(Box::new(left), Box::new(right)))
    }

    /// `expr IN (values...)`
    pub fn in_list(expr: Expr, values: Vec<Expr>) -> Self {
        Self::from(Node::InList(Box::new(expr), values))
    }

    /// True when any of the predicates holds.
    pub fn any(predicates: Vec<Expr>) -> Self {
        Self::from(Node::Any(predicates))
    }

    pub(crate) fn call(
        function: SpatialFunction,
        args: Vec<Expr>,
        options: AggregateOptions,
    ) -> Self {
        Self::from(Node::Call {
            function,
            args,
            options,
        })
    }

    pub fn kind(&self) -> ExprKind {
        match &self.node {
            Node::Field(_) => ExprKind::Field,
            Node::Number(_) => ExprKind::Numeric,
            Node::Text(_) => ExprKind::Text,
            Node::Geometry(_) => ExprKind::Geometry,
            Node::Equals(..) | Node::InList(..) | Node::Any(_) => ExprKind::Boolean,
            Node::Call { function, .. } => function.result_kind(),
        }
    }

    /// The function this expression calls, if any.
    pub fn function(&self) -> Option<SpatialFunction> {
        match &self.node {
            Node::Call { function, .. } => Some(*function),
            _ => None,
        }
    }
}

impl From<Node> for Expr {
    fn from(node: Node) -> Self {
        Self { node }
    }
}

impl From<Geometry> for Expr {
    fn from(geometry: Geometry) -> Self {
        Expr::geometry(geometry)
    }
}
