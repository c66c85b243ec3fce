//! Core data models for the location engine.

pub mod admin;
pub mod hierarchy;
pub mod located;
pub mod place;

pub use admin::AdminLevel;
pub use hierarchy::LocationHierarchy;
pub use located::{Bearing, CompassDirection, Distance, LocatedPlace};
pub use place::{AdminCodes, FeatureClass, Place};
