//! Aggregate KPI tables over a finalized record set
//!
//! Produces the overall summary plus by-country and by-segment tables, each
//! total carrying its percentage of the corresponding overall total. The
//! canonical run aggregates over all rows; `RunConfig::eligible_only_totals`
//! restricts to eligible rows, and `is_eligible` stays on every record so
//! callers can filter either way.

use crate::config::RunConfig;
use crate::normalize::normalize_category;
use crate::player::PlayerRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Percentage of a total, 0 when the total is 0
fn pct_of(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        part / total * 100.0
    }
}

/// Mean over a non-empty count, 0 otherwise
fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Summed amount columns for one group of records
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AmountTotals {
    pub final_amount: f64,
    pub potential_value: f64,
    pub per_visit_potential: f64,
    pub per_trip_potential: f64,
}

impl AmountTotals {
    fn add(&mut self, record: &PlayerRecord) {
        self.final_amount += record.final_amount;
        self.potential_value += record.potential_value;
        self.per_visit_potential += record.per_visit_potential;
        self.per_trip_potential += record.per_trip_potential;
    }

    /// Each total as a percentage (0-100) of the overall totals
    fn share_of(&self, overall: &AmountTotals) -> AmountShares {
        AmountShares {
            final_amount: pct_of(self.final_amount, overall.final_amount),
            potential_value: pct_of(self.potential_value, overall.potential_value),
            per_visit_potential: pct_of(self.per_visit_potential, overall.per_visit_potential),
            per_trip_potential: pct_of(self.per_trip_potential, overall.per_trip_potential),
        }
    }
}

/// Percentage-of-total companions to [`AmountTotals`]
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AmountShares {
    pub final_amount: f64,
    pub potential_value: f64,
    pub per_visit_potential: f64,
    pub per_trip_potential: f64,
}

/// One row of a grouped summary table
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    /// Normalized group key (country or segment)
    pub key: String,
    pub records: usize,
    pub eligible_records: usize,
    pub totals: AmountTotals,
    pub share: AmountShares,
}

/// Overall run KPIs
#[derive(Debug, Clone, Serialize)]
pub struct OverallSummary {
    pub records: usize,
    pub eligible_records: usize,
    pub excluded_records: usize,
    pub totals: AmountTotals,
    /// Eligible share of the considered rows, 0-100
    pub eligibility_rate: f64,
    pub avg_reinv_share_theoretical: f64,
    pub avg_reinv_share_actual: f64,
    /// Mean of final_amount / visits over rows with recorded visits
    pub avg_reinv_per_visit: f64,
    pub avg_per_visit_potential: f64,
    pub avg_potential_value: f64,
    pub avg_expected_trip_value: f64,
}

/// Complete summary output of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub overall: OverallSummary,
    pub by_country: Vec<GroupSummary>,
    pub by_segment: Vec<GroupSummary>,
}

fn group_by<F>(records: &[&PlayerRecord], overall: &AmountTotals, key_fn: F) -> Vec<GroupSummary>
where
    F: Fn(&PlayerRecord) -> String,
{
    // BTreeMap keeps group keys sorted for deterministic output
    let mut groups: BTreeMap<String, (usize, usize, AmountTotals)> = BTreeMap::new();
    for record in records {
        let entry = groups.entry(key_fn(record)).or_default();
        entry.0 += 1;
        if record.is_eligible {
            entry.1 += 1;
        }
        entry.2.add(record);
    }

    groups
        .into_iter()
        .map(|(key, (count, eligible, totals))| GroupSummary {
            key,
            records: count,
            eligible_records: eligible,
            share: totals.share_of(overall),
            totals,
        })
        .collect()
}

/// Summarize a finalized record set
pub fn summarize(records: &[PlayerRecord], config: &RunConfig) -> RunSummary {
    let considered: Vec<&PlayerRecord> = records
        .iter()
        .filter(|r| !config.eligible_only_totals || r.is_eligible)
        .collect();

    let mut totals = AmountTotals::default();
    let mut eligible = 0usize;
    let mut sum_share_theoretical = 0.0;
    let mut sum_share_actual = 0.0;
    let mut sum_per_visit = 0.0;
    let mut visited_rows = 0usize;
    let mut sum_per_visit_potential = 0.0;
    let mut sum_potential_value = 0.0;
    let mut sum_expected_trip_value = 0.0;

    for record in &considered {
        totals.add(record);
        if record.is_eligible {
            eligible += 1;
        }
        sum_share_theoretical += record.reinv_pct_theoretical;
        sum_share_actual += record.reinv_pct_actual;
        if record.visits > 0.0 {
            sum_per_visit += record.final_amount / record.visits;
            visited_rows += 1;
        }
        sum_per_visit_potential += record.per_visit_potential;
        sum_potential_value += record.potential_value;
        sum_expected_trip_value += record.expected_trip_value;
    }

    let count = considered.len();
    let overall = OverallSummary {
        records: count,
        eligible_records: eligible,
        excluded_records: count - eligible,
        eligibility_rate: pct_of(eligible as f64, count as f64),
        avg_reinv_share_theoretical: mean(sum_share_theoretical, count),
        avg_reinv_share_actual: mean(sum_share_actual, count),
        avg_reinv_per_visit: mean(sum_per_visit, visited_rows),
        avg_per_visit_potential: mean(sum_per_visit_potential, count),
        avg_potential_value: mean(sum_potential_value, count),
        avg_expected_trip_value: mean(sum_expected_trip_value, count),
        totals,
    };

    let by_country = group_by(&considered, &overall.totals, |r| {
        normalize_category(&r.country)
    });
    let by_segment = group_by(&considered, &overall.totals, |r| {
        normalize_category(&r.segment)
    });

    RunSummary {
        overall,
        by_country,
        by_segment,
    }
}
