//! Error types for the location engine.

use thiserror::Error;

/// Errors raised while reading geometries from spatial text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Text does not match the `SRID=<n>;SHAPE(...)` grammar.
    #[error("Malformed geometry: {0}")]
    MalformedGeometry(String),
}

/// Errors raised while compiling or evaluating spatial expressions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredicateError {
    #[error("{function} expects {expected} argument(s), got {actual}")]
    InvalidArgumentCount {
        function: &'static str,
        expected: String,
        actual: usize,
    },

    #[error("{function}: argument {position} must be {expected}, got {found}")]
    InvalidOperandType {
        function: &'static str,
        position: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// No spatial function is registered under this name.
    #[error("Unknown spatial function: {0}")]
    UnknownFunction(String),

    /// A field referenced by an expression is not exposed by the row.
    #[error("Unknown field: {0}")]
    UnknownField(String),
}

/// Classification errors.
///
/// The current rules never overlap, so nothing produces this today. Extending the
/// rule set must surface overlaps here instead of silently picking one rule.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifyError {
    #[error("Input '{input}' matches several search intents: {candidates:?}")]
    AmbiguousClassification {
        input: String,
        candidates: Vec<&'static str>,
    },
}

/// Errors raised by a place lookup collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("Spatial predicate error: {0}")]
    Predicate(#[from] PredicateError),

    /// Backing store failure.
    #[error("Store error: {0}")]
    Store(String),
}

/// Errors raised while resolving the administrative hierarchy of a place.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Place {geoname_id} has no timezone")]
    MissingTimezone { geoname_id: u64 },

    #[error("Place {geoname_id} references unknown timezone '{timezone}'")]
    UnknownTimezone { geoname_id: u64, timezone: String },

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Errors returned by the search service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("No place with geoname id {0}")]
    NotFound(u64),

    #[error("Coordinate out of range: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
