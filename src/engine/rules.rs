//! Ordered eligibility exclusion rules
//!
//! Each rule is a predicate+effect pair: when it triggers, the record becomes
//! ineligible, its amount drops to zero, and the reason is appended to the
//! record's reason log. Rules run in the configured order and always evaluate,
//! including against records already excluded — a zeroed amount can itself
//! trip a later rule, and that cascade is part of the business behavior.

use crate::config::RunConfig;
use crate::player::PlayerRecord;
use serde::{Deserialize, Serialize};

/// A single exclusion rule in the eligibility chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExclusionRule {
    /// The non-manageable flag is set. Recorded by the initial-eligibility
    /// stage rather than the rule chain, so flag-excluded rows carry their
    /// own primary reason instead of inheriting a cascade entry
    NonManageable,
    /// Comps already granted exceed the configured threshold
    ExcessiveComps,
    /// The reinvestment does not exceed the secondary promotion amount
    BelowSecondaryPromo,
    /// The reinvestment exceeds the per-visit wallet ceiling
    ExceedsWalletCeiling,
}

impl ExclusionRule {
    /// The canonical rule order fixed by this design
    pub fn canonical_order() -> Vec<ExclusionRule> {
        vec![
            ExclusionRule::ExcessiveComps,
            ExclusionRule::BelowSecondaryPromo,
            ExclusionRule::ExceedsWalletCeiling,
        ]
    }

    /// Reason string recorded on the excluded record
    pub fn reason_label(&self) -> &'static str {
        match self {
            ExclusionRule::NonManageable => "non-manageable flag",
            ExclusionRule::ExcessiveComps => "excessive comps",
            ExclusionRule::BelowSecondaryPromo => "does not exceed secondary promotion",
            ExclusionRule::ExceedsWalletCeiling => "exceeds wallet ceiling",
        }
    }

    /// Evaluate the rule's predicate against the record's current state
    fn triggers(&self, record: &PlayerRecord, config: &RunConfig) -> bool {
        match self {
            ExclusionRule::NonManageable => record.non_manageable_flag != 0.0,
            ExclusionRule::ExcessiveComps => record.comps_amount > config.comps_threshold,
            ExclusionRule::BelowSecondaryPromo => {
                record.final_amount <= record.secondary_promo_amount
            }
            ExclusionRule::ExceedsWalletCeiling => {
                record.final_amount > record.per_visit_potential
            }
        }
    }
}

/// Fold the configured rule chain over a record.
///
/// Eligibility is monotonic here: a triggered rule only ever moves the record
/// to excluded, never back.
pub fn apply_exclusions(record: &mut PlayerRecord, config: &RunConfig) {
    for rule in &config.exclusion_rules {
        if rule.triggers(record, config) {
            record.is_eligible = false;
            record.final_amount = 0.0;
            record.exclusion_reasons.push(*rule);
        }
    }
}
