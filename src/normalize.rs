//! Header and category normalization for raw spreadsheet extracts
//!
//! Source extracts arrive with arbitrary casing, accents, and punctuation in
//! both column names and categorical values (segment/country labels). All
//! lookups in the engine go through the canonical keys produced here.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalize a raw column name.
///
/// Trims, NFKD-decomposes and drops combining marks (accent removal),
/// replaces whitespace runs with a single underscore, removes every character
/// outside `[0-9A-Za-z_]`, collapses repeated underscores, and strips leading
/// and trailing underscores. Case is preserved; categorical values go through
/// [`normalize_category`] instead, which uppercases on top of this.
pub fn normalize_column(raw: &str) -> String {
    let decomposed: String = raw
        .trim()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let mut out = String::with_capacity(decomposed.len());
    let mut pending_underscore = false;
    for c in decomposed.chars() {
        if c.is_whitespace() || c == '_' {
            pending_underscore = true;
        } else if c.is_ascii_alphanumeric() {
            if pending_underscore && !out.is_empty() {
                out.push('_');
            }
            pending_underscore = false;
            out.push(c);
        }
        // Everything else (punctuation, symbols) is dropped outright.
    }
    out
}

/// Canonicalize a categorical value (segment or country label).
///
/// Same pipeline as [`normalize_column`], uppercased. Total over any input:
/// unparseable or empty labels normalize to the empty key and simply miss
/// every percentage/override lookup.
pub fn normalize_category(raw: &str) -> String {
    normalize_column(raw).to_ascii_uppercase()
}

/// Find the header row in a headerless raw extract: the first row with at
/// least `min_filled` non-empty cells. Falls back to row 0 when no row
/// qualifies, matching the source system's behavior on degenerate files.
pub fn detect_header_row(rows: &[Vec<String>], min_filled: usize) -> usize {
    rows.iter()
        .position(|row| row.iter().filter(|c| !c.trim().is_empty()).count() >= min_filled)
        .unwrap_or(0)
}

/// Disambiguate duplicate column names with `_2`, `_3`, ... suffixes,
/// stable left-to-right. The first occurrence keeps the bare name.
pub fn dedupe_columns(names: &[String]) -> Vec<String> {
    let mut counts: std::collections::HashMap<&str, u32> = std::collections::HashMap::new();
    names
        .iter()
        .map(|name| {
            let seen = counts.entry(name.as_str()).or_insert(0);
            *seen += 1;
            if *seen == 1 {
                name.clone()
            } else {
                format!("{}_{}", name, seen)
            }
        })
        .collect()
}
