//! Error types for table loading and schema validation

use thiserror::Error;

/// The input table is missing required columns after normalization/rename.
///
/// Carries the complete missing set, not just the first hit, so one run
/// surfaces everything the operator has to fix in the extract.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("missing required columns: {}", .missing.join(", "))]
pub struct SchemaError {
    /// Canonical names of every absent required column
    pub missing: Vec<String>,
}

/// Failures surfaced while loading the working table.
///
/// Schema failures are fatal for the run and stop before any row processing;
/// per-cell numeric coercion issues never appear here (they degrade to 0).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed delimited input: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_lists_every_missing_column() {
        let err = SchemaError {
            missing: vec!["country".into(), "visits".into(), "comps_amount".into()],
        };
        assert_eq!(
            err.to_string(),
            "missing required columns: country, visits, comps_amount"
        );
    }
}
