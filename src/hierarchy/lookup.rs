use crate::error::LookupError;
use crate::geometry::Point;
use crate::models::{AdminLevel, Place};

/// Read access to the store that answers "which place of this level encloses X".
///
/// Implementations decide how enclosure is determined (boundary polygons, shared
/// admin codes, plain distance) but must break distance ties deterministically.
pub trait PlaceLookup {
    /// Nearest place of `level` enclosing `of`.
    fn nearest_enclosing(
        &self,
        of: &Place,
        level: AdminLevel,
    ) -> Result<Option<Place>, LookupError>;

    /// Nearest place of `level` enclosing a bare point.
    fn nearest_enclosing_by_point(
        &self,
        of: &Point,
        level: AdminLevel,
    ) -> Result<Option<Place>, LookupError>;
}

impl<L: PlaceLookup + ?Sized> PlaceLookup for &L {
    fn nearest_enclosing(
        &self,
        of: &Place,
        level: AdminLevel,
    ) -> Result<Option<Place>, LookupError> {
        (**self).nearest_enclosing(of, level)
    }

    fn nearest_enclosing_by_point(
        &self,
        of: &Point,
        level: AdminLevel,
    ) -> Result<Option<Place>, LookupError> {
        (**self).nearest_enclosing_by_point(of, level)
    }
}
