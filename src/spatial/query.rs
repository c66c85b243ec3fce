use std::cmp::Ordering;

use super::eval::{compare, Row, Value};
use super::expr::{Expr, ExprKind, Node, SortDirection};
use super::SpatialFunction;
use crate::error::PredicateError;

/// A composed read query: `SELECT [DISTINCT ON (..)] * FROM t WHERE .. ORDER BY .. LIMIT n`.
///
/// The same query renders to PostGIS SQL and executes over in-memory rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpatialQuery {
    distinct_on: Option<Expr>,
    filters: Vec<Expr>,
    order_by: Vec<(Expr, SortDirection)>,
    limit: Option<usize>,
}

impl SpatialQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate; all predicates must hold.
    pub fn filter(mut self, predicate: Expr) -> Result<Self, PredicateError> {
        match predicate.kind() {
            ExprKind::Boolean | ExprKind::Field => {
                self.filters.push(predicate);
                Ok(self)
            }
            kind => Err(PredicateError::InvalidOperandType {
                function: "WHERE",
                position: self.filters.len(),
                expected: "a boolean predicate",
                found: kind.as_str(),
            }),
        }
    }

    pub fn order_by(
        mut self,
        expr: Expr,
        direction: SortDirection,
    ) -> Result<Self, PredicateError> {
        match expr.kind() {
            ExprKind::Boolean | ExprKind::Key => Err(PredicateError::InvalidOperandType {
                function: "ORDER BY",
                position: self.order_by.len(),
                expected: "a sortable value",
                found: expr.kind().as_str(),
            }),
            _ => {
                self.order_by.push((expr, direction));
                Ok(self)
            }
        }
    }

    /// Keep one row per key, the first in sort order.
    pub fn distinct_on(mut self, key: Expr) -> Result<Self, PredicateError> {
        if key.function() != Some(SpatialFunction::DistinctOn) {
            return Err(PredicateError::InvalidOperandType {
                function: "DISTINCT ON",
                position: 0,
                expected: "a DISTINCT_ON expression",
                found: key.kind().as_str(),
            });
        }
        self.distinct_on = Some(key);
        Ok(self)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn distinct_key(&self) -> Option<&Expr> {
        match self.distinct_on.as_ref().map(|e| &e.node) {
            Some(Node::Call { args, .. }) => args.first(),
            _ => None,
        }
    }

    /// Render as a PostGIS `SELECT`.
    pub fn to_sql(&self, table: &str) -> String {
        let mut sql = String::from("SELECT ");
        if let Some(distinct) = &self.distinct_on {
            sql.push_str(&distinct.to_sql());
            sql.push(' ');
        }
        sql.push_str("* FROM ");
        sql.push_str(table);

        if !self.filters.is_empty() {
            let filters: Vec<String> = self.filters.iter().map(Expr::to_sql).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&filters.join(" AND "));
        }

        // DISTINCT ON requires its key to lead the ORDER BY.
        let mut order: Vec<String> = Vec::new();
        if let Some(key) = self.distinct_key() {
            order.push(format!("{} ASC", key.to_sql()));
        }
        for (expr, direction) in &self.order_by {
            order.push(format!("{} {}", expr.to_sql(), direction.as_sql()));
        }
        if !order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        sql
    }

    /// Run the query over rows. Sorting is stable, so rows that compare equal keep
    /// their input order.
    pub fn execute<R: Row>(
        &self,
        rows: impl IntoIterator<Item = R>,
    ) -> Result<Vec<R>, PredicateError> {
        let distinct_key = self.distinct_key();
        let mut keyed: Vec<(Option<Value>, Vec<Value>, R)> = Vec::new();

        'rows: for row in rows {
            for filter in &self.filters {
                if filter.evaluate(&row)?.as_bool() != Some(true) {
                    continue 'rows;
                }
            }
            let distinct = distinct_key.map(|key| key.evaluate(&row)).transpose()?;
            let sort_keys = self
                .order_by
                .iter()
                .map(|(expr, _)| expr.evaluate(&row))
                .collect::<Result<Vec<_>, _>>()?;
            keyed.push((distinct, sort_keys, row));
        }

        keyed.sort_by(|a, b| {
            let mut ordering = match (&a.0, &b.0) {
                (Some(x), Some(y)) => compare(x, y, SortDirection::Asc),
                _ => Ordering::Equal,
            };
            for (i, (_, direction)) in self.order_by.iter().enumerate() {
                ordering = ordering.then_with(|| compare(&a.1[i], &b.1[i], *direction));
            }
            ordering
        });

        if distinct_key.is_some() {
            let mut seen: Vec<Value> = Vec::new();
            keyed.retain(|(key, _, _)| match key {
                Some(key) if seen.contains(key) => false,
                Some(key) => {
                    seen.push(key.clone());
                    true
                }
                None => true,
            });
        }

        if let Some(limit) = self.limit {
            keyed.truncate(limit);
        }
        Ok(keyed.into_iter().map(|(_, _, row)| row).collect())
    }
}
