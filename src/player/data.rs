//! Player record structures matching the cleaned activity extract

use crate::engine::ExclusionRule;
use serde::{Deserialize, Serialize};

/// Reinvestment range bucket relative to the wallet ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RangeLabel {
    /// No reinvestment applies (zero amount, or no usable ceiling)
    NotApplicable,
    /// (0, 50%] of the wallet ceiling
    UnderHalf,
    /// (50%, 100%] of the wallet ceiling
    HalfToFull,
}

impl RangeLabel {
    /// Get the string representation used in exported layouts
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeLabel::NotApplicable => "NOT_APPLICABLE",
            RangeLabel::UnderHalf => "UNDER_HALF",
            RangeLabel::HalfToFull => "HALF_TO_FULL",
        }
    }
}

impl Default for RangeLabel {
    fn default() -> Self {
        RangeLabel::NotApplicable
    }
}

impl std::fmt::Display for RangeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single player row of the working table
///
/// Input fields are populated by the loader (numeric cells coerced, 0 on
/// parse failure); derived fields are written exclusively by the engine and
/// start at their zero values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Player's country grouping (raw label; normalized at lookup time)
    pub country: String,

    /// Business segment / desk category (raw label; primary lookup key)
    pub segment: String,

    /// Non-manageable flag; nonzero excludes the player from any reinvestment
    pub non_manageable_flag: f64,

    /// Recorded visits in the extract window
    pub visits: f64,

    /// Estimated visits (used when no recorded visits exist)
    pub estimated_visits: f64,

    /// Theoretical net win
    pub theoretical_net: f64,

    /// Actual net win
    pub actual_net_win: f64,

    /// Expected value per trip
    pub expected_trip_value: f64,

    /// Per-visit potential; also the wallet ceiling for exclusion and
    /// range classification
    pub per_visit_potential: f64,

    /// Per-trip potential
    pub per_trip_potential: f64,

    /// Comps already granted in the window
    pub comps_amount: f64,

    /// Amount of the secondary promotion already offered
    pub secondary_promo_amount: f64,

    // --- Derived fields (engine output) ---
    /// max(theoretical_net, actual_net_win); informational KPI
    #[serde(default)]
    pub potential_value: f64,

    /// Potential chosen by the category policy (per-visit or per-trip)
    #[serde(default)]
    pub selected_potential: f64,

    /// Percentage applied to the selected potential (fraction, 0 when unmapped)
    #[serde(default)]
    pub applicable_percentage: f64,

    /// selected_potential * applicable_percentage, before floor/cap
    #[serde(default)]
    pub raw_amount: f64,

    /// Final reinvestment amount after floor, caps, overrides, and exclusions
    #[serde(default)]
    pub final_amount: f64,

    /// Eligibility after the full stage chain; only ever moves true -> false
    #[serde(default)]
    pub is_eligible: bool,

    /// Range bucket of the final amount relative to the wallet ceiling
    #[serde(default)]
    pub range_label: RangeLabel,

    /// Ordered log of every exclusion rule that fired; first entry is the
    /// primary reason
    #[serde(default)]
    pub exclusion_reasons: Vec<ExclusionRule>,

    /// Trip estimate over the configured trip window
    #[serde(default)]
    pub expected_trips: f64,

    /// final_amount as a share of theoretical_net (0 when denominator <= 0)
    #[serde(default)]
    pub reinv_pct_theoretical: f64,

    /// final_amount as a share of actual_net_win (0 when denominator <= 0)
    #[serde(default)]
    pub reinv_pct_actual: f64,
}

impl PlayerRecord {
    /// Create a record with the given grouping labels and all metrics zeroed
    pub fn new(country: impl Into<String>, segment: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            segment: segment.into(),
            non_manageable_flag: 0.0,
            visits: 0.0,
            estimated_visits: 0.0,
            theoretical_net: 0.0,
            actual_net_win: 0.0,
            expected_trip_value: 0.0,
            per_visit_potential: 0.0,
            per_trip_potential: 0.0,
            comps_amount: 0.0,
            secondary_promo_amount: 0.0,
            potential_value: 0.0,
            selected_potential: 0.0,
            applicable_percentage: 0.0,
            raw_amount: 0.0,
            final_amount: 0.0,
            is_eligible: false,
            range_label: RangeLabel::NotApplicable,
            exclusion_reasons: Vec::new(),
            expected_trips: 0.0,
            reinv_pct_theoretical: 0.0,
            reinv_pct_actual: 0.0,
        }
    }

    /// Primary exclusion reason, if any rule fired
    pub fn exclusion_reason(&self) -> Option<&'static str> {
        self.exclusion_reasons.first().map(|r| r.reason_label())
    }

    /// Full reason log joined for export ("; "-separated, empty when clean)
    pub fn exclusion_log(&self) -> String {
        self.exclusion_reasons
            .iter()
            .map(|r| r.reason_label())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
