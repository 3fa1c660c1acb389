//! Reinvestment Engine - per-player casino reinvestment computation
//!
//! This library provides:
//! - Header/category normalization for raw activity extracts
//! - Schema validation with complete missing-column reporting
//! - The eligibility & amount engine (percentages, floor/cap/overrides,
//!   ordered exclusion rules, range classification)
//! - KPI aggregation (overall, by-country, by-segment)
//! - CSV export of the promotion layout and summary tables

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod normalize;
pub mod player;
pub mod summary;

// Re-export commonly used types
pub use config::{CategoryOverride, PotentialSource, RunConfig, SelectionKey};
pub use engine::{ExclusionRule, ReinvestmentEngine};
pub use error::{LoadError, SchemaError};
pub use player::{load_records, PlayerRecord, RangeLabel};
pub use summary::{summarize, RunSummary};
