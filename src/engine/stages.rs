//! Ordered amount stages of the eligibility & amount pipeline
//!
//! Each stage mutates one record against the immutable run configuration.
//! Eligibility can only move true -> false across stages; the floor, cap, and
//! override stages touch eligible rows only, so an excluded row can never be
//! resurrected by a later adjustment.

use crate::config::{PotentialSource, RunConfig, SelectionKey};
use crate::normalize::normalize_category;
use crate::player::PlayerRecord;

/// Normalized category key for a record under the configured selection key.
/// With `SelectionKey::Segment`, rows without a segment label fall back to
/// their country grouping.
pub(crate) fn category_key(record: &PlayerRecord, config: &RunConfig) -> String {
    let raw = match config.selection_key {
        SelectionKey::Segment if !record.segment.trim().is_empty() => &record.segment,
        SelectionKey::Segment => &record.country,
        SelectionKey::Country => &record.country,
    };
    normalize_category(raw)
}

/// Stage 1: informational potential KPI
pub(crate) fn compute_potential(record: &mut PlayerRecord) {
    record.potential_value = record.theoretical_net.max(record.actual_net_win);
}

/// Stage 2: pick the potential column per the category policy table
pub(crate) fn select_potential(record: &mut PlayerRecord, config: &RunConfig, key: &str) {
    record.selected_potential = match config.potential_source_for(key) {
        PotentialSource::PerVisit => record.per_visit_potential,
        PotentialSource::PerTrip => record.per_trip_potential,
    };
}

/// Stage 3: initial eligibility from the non-manageable flag.
/// Flag-excluded rows get their own primary reason entry; the later rule
/// cascade appends to it rather than standing in for it.
pub(crate) fn initial_eligibility(record: &mut PlayerRecord) {
    record.is_eligible = record.non_manageable_flag == 0.0;
    if !record.is_eligible {
        record.exclusion_reasons.push(super::ExclusionRule::NonManageable);
    }
}

/// Stage 4: percentage lookup; unmapped categories get 0
pub(crate) fn lookup_percentage(record: &mut PlayerRecord, config: &RunConfig, key: &str) {
    record.applicable_percentage = config.percentage_for(key);
}

/// Stage 5: raw amount for every row, materialized only for eligible rows
pub(crate) fn apply_base_amount(record: &mut PlayerRecord) {
    record.raw_amount = record.selected_potential * record.applicable_percentage;
    record.final_amount = if record.is_eligible {
        record.raw_amount
    } else {
        0.0
    };
}

/// Stage 6: minimum-per-wallet floor
pub(crate) fn apply_floor(record: &mut PlayerRecord, config: &RunConfig) {
    if record.is_eligible {
        record.final_amount = record.final_amount.max(config.min_wallet);
    }
}

/// Stage 7: global accumulated cap
pub(crate) fn apply_cap(record: &mut PlayerRecord, config: &RunConfig) {
    if record.is_eligible {
        record.final_amount = record.final_amount.min(config.cap);
    }
}

/// Stage 8: per-category {min, max} override, after the global cap.
/// Can both raise (to the override minimum) and lower (to the maximum).
pub(crate) fn apply_override(record: &mut PlayerRecord, config: &RunConfig, key: &str) {
    if !record.is_eligible {
        return;
    }
    if let Some(ov) = config.override_for(key) {
        // max-then-min rather than clamp: a misconfigured pair with
        // min > max must not panic the run
        record.final_amount = record.final_amount.max(ov.min).min(ov.max);
    }
}
