//! Load player records from delimited activity extracts
//!
//! Handles the messy parts of real extracts before the engine ever sees a
//! row: junk preamble lines before the header, accented/arbitrary-cased
//! column names, the legacy Spanish header vocabulary, duplicated columns,
//! and non-numeric cells in numeric columns (coerced to 0, never fatal).

use super::PlayerRecord;
use crate::error::{LoadError, SchemaError};
use crate::normalize::{dedupe_columns, detect_header_row, normalize_column};
use csv::ReaderBuilder;
use log::warn;
use std::collections::HashMap;
use std::path::Path;

/// Canonical columns the engine requires, in reporting order
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "country",
    "segment",
    "non_manageable_flag",
    "visits",
    "theoretical_net",
    "actual_net_win",
    "per_visit_potential",
    "estimated_visits",
    "expected_trip_value",
    "per_trip_potential",
    "comps_amount",
    "secondary_promo_amount",
];

/// Minimum non-empty cells for a row to count as the header
const MIN_FILLED_FOR_HEADER: usize = 3;

/// Map a normalized header to its canonical engine column.
///
/// Covers the legacy extract vocabulary (Spanish headers, the `WxV` ceiling
/// spelling, and the per-trip-average variants) alongside the canonical
/// English names. Matching is case-insensitive; unknown columns pass through
/// untouched and are simply ignored by the engine.
fn canonical_name(normalized: &str) -> Option<&'static str> {
    let lowered = normalized.to_ascii_lowercase();
    let canonical = match lowered.as_str() {
        "pais" | "country" => "country",
        "gestion" | "segment" => "segment",
        "ng" | "non_manageable_flag" => "non_manageable_flag",
        "visitas" | "prom_visita_trip" | "visits" => "visits",
        "visitas_est" | "estimated_visits" => "estimated_visits",
        "teoriconeto" | "teorico_neto" | "prom_teoneto_trip" | "theoretical_net" => {
            "theoretical_net"
        }
        "wintotalneto" | "win_total_neto" | "prom_winneto_trip" | "actual_net_win" => {
            "actual_net_win"
        }
        "trip_esperado" | "expected_trip_value" => "expected_trip_value",
        "pot_visita" | "pot_xvisita" | "pot_x_visita" | "wxv" | "per_visit_potential" => {
            "per_visit_potential"
        }
        "pot_trip" | "per_trip_potential" => "per_trip_potential",
        "comps" | "comps_amount" => "comps_amount",
        "promo2" | "secondary_promo_amount" => "secondary_promo_amount",
        _ => return None,
    };
    Some(canonical)
}

/// Parse a numeric cell; empty cells are 0 silently, anything unparseable is
/// 0 with a warning. This coercion never fails the run.
fn coerce_numeric(cell: &str, column: &str, row_number: usize) -> f64 {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(value) => value,
        Err(_) => {
            warn!(
                "row {}: non-numeric value {:?} in column {}, coerced to 0",
                row_number, trimmed, column
            );
            0.0
        }
    }
}

/// Build player records from raw table rows (header not yet identified).
///
/// Runs header detection, normalization + canonical renaming, duplicate
/// disambiguation, then schema validation. The complete missing-column set is
/// reported in one `SchemaError`; fully empty data rows are dropped.
pub fn records_from_rows(rows: &[Vec<String>]) -> Result<Vec<PlayerRecord>, SchemaError> {
    let header_row = detect_header_row(rows, MIN_FILLED_FOR_HEADER);
    let headers: Vec<String> = rows
        .get(header_row)
        .map(|row| {
            row.iter()
                .map(|raw| {
                    let normalized = normalize_column(raw);
                    canonical_name(&normalized)
                        .map(str::to_string)
                        .unwrap_or(normalized)
                })
                .collect()
        })
        .unwrap_or_default();
    let headers = dedupe_columns(&headers);

    // First occurrence wins: duplicates carry _2/_3 suffixes from dedupe
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, name) in headers.iter().enumerate() {
        index.entry(name.as_str()).or_insert(i);
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !index.contains_key(**c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError { missing });
    }

    let cell = |row: &[String], name: &str| -> String {
        index
            .get(name)
            .and_then(|&i| row.get(i))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    let mut records = Vec::new();
    for (offset, row) in rows[header_row + 1..].iter().enumerate() {
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        // 1-based spreadsheet-style row number for warnings
        let row_number = header_row + 2 + offset;
        let num = |name: &str| coerce_numeric(&cell(row, name), name, row_number);

        let mut record = PlayerRecord::new(cell(row, "country"), cell(row, "segment"));
        record.non_manageable_flag = num("non_manageable_flag");
        record.visits = num("visits");
        record.estimated_visits = num("estimated_visits");
        record.theoretical_net = num("theoretical_net");
        record.actual_net_win = num("actual_net_win");
        record.expected_trip_value = num("expected_trip_value");
        record.per_visit_potential = num("per_visit_potential");
        record.per_trip_potential = num("per_trip_potential");
        record.comps_amount = num("comps_amount");
        record.secondary_promo_amount = num("secondary_promo_amount");
        records.push(record);
    }

    Ok(records)
}

/// Load player records from any reader carrying delimited text
pub fn load_records_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<Vec<PlayerRecord>, LoadError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(records_from_rows(&rows)?)
}

/// Load player records from a delimited file
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<PlayerRecord>, LoadError> {
    let file = std::fs::File::open(path)?;
    load_records_from_reader(file)
}
