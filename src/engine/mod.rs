//! Eligibility & amount engine
//!
//! The per-record state machine: potential selection, percentage-based raw
//! amount, floor/cap/override transformations, the ordered exclusion-rule
//! chain, and range classification.

mod classify;
mod driver;
mod rules;
mod stages;

pub use classify::classify;
pub use driver::ReinvestmentEngine;
pub use rules::{apply_exclusions, ExclusionRule};
