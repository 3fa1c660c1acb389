//! Run configuration for the reinvestment engine
//!
//! Built once per run from operator input (JSON file or defaults) and read-only
//! for the duration of the run. Every categorical lookup key is canonicalized
//! on construction so the engine only ever compares normalized keys.

use crate::engine::ExclusionRule;
use crate::normalize::normalize_category;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Which potential column feeds the reinvestment base for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PotentialSource {
    /// Use `per_visit_potential`
    PerVisit,
    /// Use `per_trip_potential`
    PerTrip,
}

/// Which record field supplies the category lookup key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionKey {
    /// Segment when the row carries one, country otherwise (canonical)
    Segment,
    /// Always the country grouping
    Country,
}

/// Per-category {min, max} amount override, applied after the global cap
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CategoryOverride {
    pub min: f64,
    pub max: f64,
}

/// Configuration for a reinvestment run
///
/// Percentages are carried in operator units (0-100, as entered) and exposed
/// as fractions via [`RunConfig::percentage_for`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Category key -> reinvestment percentage (0-100); unmapped keys get 0
    pub percentages: HashMap<String, f64>,

    /// Minimum reinvestment per wallet (floor for eligible rows)
    pub min_wallet: f64,

    /// Accumulated cap (global maximum per wallet)
    pub cap: f64,

    /// Category key -> {min, max} override pair; may both raise and lower
    pub category_overrides: HashMap<String, CategoryOverride>,

    /// Comps exclusion threshold. Source revisions disagree (200 vs 2000);
    /// 200 is the canonical default and the knob exists precisely because of
    /// that discrepancy.
    pub comps_threshold: f64,

    /// Category key -> potential source; categories absent here use
    /// `default_potential_source`
    pub potential_sources: HashMap<String, PotentialSource>,

    /// Potential source for categories not listed in `potential_sources`
    pub default_potential_source: PotentialSource,

    /// Which record field keys the category lookups
    pub selection_key: SelectionKey,

    /// Exclusion rules for this run, applied in order
    pub exclusion_rules: Vec<ExclusionRule>,

    /// Aggregate over eligible rows only instead of the full result set
    pub eligible_only_totals: bool,

    /// Window (days) for the expected-trips estimate
    pub trip_window_days: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        let percentages = [
            ("ARG", 10.0),
            ("BRA", 15.0),
            ("URY_LOCAL", 8.0),
            ("URY_RESTO", 5.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        // Fixed business partition: the two URY desks reinvest against the
        // per-visit potential, everyone else against the per-trip potential.
        let potential_sources = [
            ("URY_LOCAL", PotentialSource::PerVisit),
            ("URY_RESTO", PotentialSource::PerVisit),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            percentages,
            min_wallet: 100.0,
            cap: 20_000.0,
            category_overrides: HashMap::new(),
            comps_threshold: 200.0,
            potential_sources,
            default_potential_source: PotentialSource::PerTrip,
            selection_key: SelectionKey::Segment,
            exclusion_rules: ExclusionRule::canonical_order(),
            eligible_only_totals: false,
            trip_window_days: 3.0,
        }
    }
}

impl RunConfig {
    /// Parse a configuration from a JSON string and canonicalize its keys.
    /// Absent fields fall back to the defaults above.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let mut config: RunConfig = serde_json::from_str(json)?;
        config.canonicalize_keys();
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, crate::error::LoadError> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&json)?)
    }

    /// Applicable percentage for a normalized category key, as a fraction.
    /// Unmapped categories get 0, not an error.
    pub fn percentage_for(&self, key: &str) -> f64 {
        self.percentages.get(key).copied().unwrap_or(0.0) / 100.0
    }

    /// Potential source for a normalized category key
    pub fn potential_source_for(&self, key: &str) -> PotentialSource {
        self.potential_sources
            .get(key)
            .copied()
            .unwrap_or(self.default_potential_source)
    }

    /// Override pair for a normalized category key, if configured
    pub fn override_for(&self, key: &str) -> Option<CategoryOverride> {
        self.category_overrides.get(key).copied()
    }

    /// Rebuild every keyed map with normalized category keys so lookups match
    /// regardless of how the operator spelled them ("URY Local" == "URY_LOCAL").
    fn canonicalize_keys(&mut self) {
        self.percentages = std::mem::take(&mut self.percentages)
            .into_iter()
            .map(|(k, v)| (normalize_category(&k), v))
            .collect();
        self.category_overrides = std::mem::take(&mut self.category_overrides)
            .into_iter()
            .map(|(k, v)| (normalize_category(&k), v))
            .collect();
        self.potential_sources = std::mem::take(&mut self.potential_sources)
            .into_iter()
            .map(|(k, v)| (normalize_category(&k), v))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_percentages_as_fractions() {
        let config = RunConfig::default();
        assert_relative_eq!(config.percentage_for("ARG"), 0.10);
        assert_relative_eq!(config.percentage_for("BRA"), 0.15);
        assert_relative_eq!(config.percentage_for("URY_LOCAL"), 0.08);
        assert_eq!(config.percentage_for("UNKNOWN"), 0.0);
    }

    #[test]
    fn test_default_potential_partition() {
        let config = RunConfig::default();
        assert_eq!(
            config.potential_source_for("URY_LOCAL"),
            PotentialSource::PerVisit
        );
        assert_eq!(
            config.potential_source_for("URY_RESTO"),
            PotentialSource::PerVisit
        );
        assert_eq!(config.potential_source_for("ARG"), PotentialSource::PerTrip);
        assert_eq!(config.potential_source_for(""), PotentialSource::PerTrip);
    }

    #[test]
    fn test_from_json_canonicalizes_keys() {
        let config = RunConfig::from_json_str(
            r#"{
                "percentages": {"Ury Local": 8.0, "arg": 12.5},
                "category_overrides": {"ury resto": {"min": 50.0, "max": 5000.0}},
                "comps_threshold": 2000.0
            }"#,
        )
        .unwrap();

        assert_relative_eq!(config.percentage_for("URY_LOCAL"), 0.08);
        assert_relative_eq!(config.percentage_for("ARG"), 0.125);
        assert!(config.override_for("URY_RESTO").is_some());
        assert_eq!(config.comps_threshold, 2000.0);
        // Untouched fields keep their defaults
        assert_eq!(config.cap, 20_000.0);
        assert_eq!(config.exclusion_rules, ExclusionRule::canonical_order());
    }

    #[test]
    fn test_json_round_trip() {
        let config = RunConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back = RunConfig::from_json_str(&json).unwrap();
        assert_eq!(back.min_wallet, config.min_wallet);
        assert_eq!(back.percentages, config.percentages);
    }
}
