//! Engine configuration loaded from TOML.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::models::{AdminLevel, FeatureClass};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub visibility: VisibilitySettings,
    pub levels: LevelRules,
    pub search: SearchConfig,
}

/// Which optional hierarchy levels are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    pub district: bool,
    pub borough: bool,
    pub city: bool,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            district: true,
            borough: true,
            city: true,
        }
    }
}

impl VisibilityConfig {
    /// State and country are always visible.
    pub fn is_visible(&self, level: AdminLevel) -> bool {
        match level {
            AdminLevel::District => self.district,
            AdminLevel::Borough => self.borough,
            AdminLevel::City => self.city,
            AdminLevel::State | AdminLevel::Country => true,
        }
    }
}

/// Per-country override; unset flags fall back to the `[visibility]` defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VisibilityOverride {
    pub district: Option<bool>,
    pub borough: Option<bool>,
    pub city: Option<bool>,
}

impl VisibilityOverride {
    fn apply(&self, base: VisibilityConfig) -> VisibilityConfig {
        VisibilityConfig {
            district: self.district.unwrap_or(base.district),
            borough: self.borough.unwrap_or(base.borough),
            city: self.city.unwrap_or(base.city),
        }
    }
}

/// Default visibility plus per-country overrides keyed by ISO country code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VisibilitySettings {
    #[serde(flatten)]
    pub default: VisibilityConfig,
    pub countries: BTreeMap<String, VisibilityOverride>,
}

impl VisibilitySettings {
    pub fn for_country(&self, country_code: &str) -> VisibilityConfig {
        match self.countries.get(country_code) {
            Some(overrides) => overrides.apply(self.default),
            None => self.default,
        }
    }
}

/// Feature classification a level's places must carry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LevelRule {
    pub feature_class: FeatureClass,
    pub feature_codes: Vec<String>,
    /// Number of leading admin codes the candidate must share with the reference
    #[serde(default)]
    pub admin_depth: usize,
}

impl LevelRule {
    fn new(feature_class: FeatureClass, feature_codes: &[&str], admin_depth: usize) -> Self {
        Self {
            feature_class,
            feature_codes: feature_codes.iter().map(|c| c.to_string()).collect(),
            admin_depth,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LevelRules {
    pub district: LevelRule,
    pub borough: LevelRule,
    pub city: LevelRule,
    pub state: LevelRule,
    pub country: LevelRule,
}

impl Default for LevelRules {
    fn default() -> Self {
        Self {
            district: LevelRule::new(FeatureClass::P, &["PPLX"], 1),
            borough: LevelRule::new(FeatureClass::A, &["ADM3", "ADM4"], 1),
            city: LevelRule::new(
                FeatureClass::P,
                &["PPL", "PPLA", "PPLA2", "PPLA3", "PPLA4", "PPLC"],
                1,
            ),
            state: LevelRule::new(FeatureClass::A, &["ADM1"], 1),
            country: LevelRule::new(
                FeatureClass::A,
                &["PCLI", "PCLD", "PCLF", "PCLS", "PCLIX", "PCL"],
                0,
            ),
        }
    }
}

impl LevelRules {
    pub fn get(&self, level: AdminLevel) -> &LevelRule {
        match level {
            AdminLevel::District => &self.district,
            AdminLevel::Borough => &self.borough,
            AdminLevel::City => &self.city,
            AdminLevel::State => &self.state,
            AdminLevel::Country => &self.country,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_limit: usize,
    pub max_limit: usize,
    /// Radius cap for feature list searches
    pub radius_meters: Option<f64>,
    /// Classes considered when a bare coordinate is searched
    pub coordinate_feature_classes: Vec<FeatureClass>,
    /// Reject out-of-range coordinates before any lookup
    pub validate_coordinates: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
            radius_meters: None,
            coordinate_feature_classes: vec![FeatureClass::P],
            validate_coordinates: true,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration once at startup.
    pub fn validate(&self) -> Result<()> {
        for level in AdminLevel::all() {
            let rule = self.levels.get(*level);
            if rule.feature_codes.is_empty() {
                bail!("Level '{}' has no feature codes", level);
            }
            for code in &rule.feature_codes {
                let valid = !code.is_empty()
                    && code
                        .chars()
                        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
                if !valid {
                    bail!("Level '{}' has invalid feature code '{}'", level, code);
                }
            }
            if rule.admin_depth > 4 {
                bail!(
                    "Level '{}' admin_depth {} exceeds 4",
                    level,
                    rule.admin_depth
                );
            }
        }

        for country in self.visibility.countries.keys() {
            if country.len() != 2 || !country.chars().all(|c| c.is_ascii_uppercase()) {
                bail!("Invalid country code '{}' in visibility overrides", country);
            }
        }

        let search = &self.search;
        if search.default_limit == 0 || search.max_limit == 0 {
            bail!("Search limits must be positive");
        }
        if search.default_limit > search.max_limit {
            bail!(
                "default_limit {} exceeds max_limit {}",
                search.default_limit,
                search.max_limit
            );
        }
        if let Some(radius) = search.radius_meters {
            if !(radius.is_finite() && radius > 0.0) {
                bail!("radius_meters must be a positive number");
            }
        }
        if search.coordinate_feature_classes.is_empty() {
            bail!("coordinate_feature_classes must not be empty");
        }

        Ok(())
    }

    /// Clamp a requested result count to the configured bounds.
    pub fn limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.search.default_limit)
            .clamp(1, self.search.max_limit.max(1))
    }
}
