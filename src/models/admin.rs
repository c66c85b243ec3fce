//! Administrative hierarchy levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One rung of the containment hierarchy, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AdminLevel {
    /// Section of a populated place
    District,
    /// City district / municipal borough
    Borough,
    /// City / town / municipality
    City,
    /// First-order administrative division
    State,
    /// Country
    Country,
}

impl AdminLevel {
    /// Get all admin levels in resolution order (district first)
    pub fn all() -> &'static [AdminLevel] {
        &[
            AdminLevel::District,
            AdminLevel::Borough,
            AdminLevel::City,
            AdminLevel::State,
            AdminLevel::Country,
        ]
    }

    /// Get the field name for this level
    pub fn field_name(&self) -> &'static str {
        match self {
            AdminLevel::District => "district",
            AdminLevel::Borough => "borough",
            AdminLevel::City => "city",
            AdminLevel::State => "state",
            AdminLevel::Country => "country",
        }
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}
