//! CSV export of the promotion layout and summary tables

use crate::player::PlayerRecord;
use crate::summary::{GroupSummary, OverallSummary};
use csv::Writer;
use std::io::Write;
use std::path::Path;

/// Result-table column order: the original input columns followed by the
/// engine's derived fields
const LAYOUT_HEADER: [&str; 23] = [
    "country",
    "segment",
    "non_manageable_flag",
    "visits",
    "estimated_visits",
    "theoretical_net",
    "actual_net_win",
    "expected_trip_value",
    "per_visit_potential",
    "per_trip_potential",
    "comps_amount",
    "secondary_promo_amount",
    "potential_value",
    "selected_potential",
    "applicable_percentage",
    "raw_amount",
    "final_amount",
    "is_eligible",
    "range_label",
    "exclusion_reason",
    "expected_trips",
    "reinv_pct_theoretical",
    "reinv_pct_actual",
];

/// Write the promotion layout to any writer
pub fn write_result_table<W: Write>(writer: W, records: &[PlayerRecord]) -> Result<(), csv::Error> {
    let mut csv_writer = Writer::from_writer(writer);
    csv_writer.write_record(LAYOUT_HEADER)?;

    for r in records {
        csv_writer.write_record(&[
            r.country.clone(),
            r.segment.clone(),
            r.non_manageable_flag.to_string(),
            r.visits.to_string(),
            r.estimated_visits.to_string(),
            r.theoretical_net.to_string(),
            r.actual_net_win.to_string(),
            r.expected_trip_value.to_string(),
            r.per_visit_potential.to_string(),
            r.per_trip_potential.to_string(),
            r.comps_amount.to_string(),
            r.secondary_promo_amount.to_string(),
            r.potential_value.to_string(),
            r.selected_potential.to_string(),
            r.applicable_percentage.to_string(),
            r.raw_amount.to_string(),
            format!("{:.2}", r.final_amount),
            r.is_eligible.to_string(),
            r.range_label.as_str().to_string(),
            r.exclusion_log(),
            format!("{:.4}", r.expected_trips),
            format!("{:.6}", r.reinv_pct_theoretical),
            format!("{:.6}", r.reinv_pct_actual),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the promotion layout to a CSV file
pub fn write_result_csv<P: AsRef<Path>>(
    path: P,
    records: &[PlayerRecord],
) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path).map_err(csv::Error::from)?;
    write_result_table(file, records)
}

/// Write a grouped summary table (by-country or by-segment)
pub fn write_group_table<W: Write>(writer: W, groups: &[GroupSummary]) -> Result<(), csv::Error> {
    let mut csv_writer = Writer::from_writer(writer);
    csv_writer.write_record([
        "key",
        "records",
        "eligible_records",
        "total_final_amount",
        "total_potential_value",
        "total_per_visit_potential",
        "total_per_trip_potential",
        "pct_final_amount",
        "pct_potential_value",
        "pct_per_visit_potential",
        "pct_per_trip_potential",
    ])?;

    for g in groups {
        csv_writer.write_record(&[
            g.key.clone(),
            g.records.to_string(),
            g.eligible_records.to_string(),
            format!("{:.2}", g.totals.final_amount),
            format!("{:.2}", g.totals.potential_value),
            format!("{:.2}", g.totals.per_visit_potential),
            format!("{:.2}", g.totals.per_trip_potential),
            format!("{:.4}", g.share.final_amount),
            format!("{:.4}", g.share.potential_value),
            format!("{:.4}", g.share.per_visit_potential),
            format!("{:.4}", g.share.per_trip_potential),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the overall KPI summary as metric/value pairs
pub fn write_overall_table<W: Write>(
    writer: W,
    overall: &OverallSummary,
) -> Result<(), csv::Error> {
    let mut csv_writer = Writer::from_writer(writer);
    csv_writer.write_record(["metric", "value"])?;

    let rows: [(&str, String); 12] = [
        ("records", overall.records.to_string()),
        ("eligible_records", overall.eligible_records.to_string()),
        ("excluded_records", overall.excluded_records.to_string()),
        ("total_final_amount", format!("{:.2}", overall.totals.final_amount)),
        ("total_potential_value", format!("{:.2}", overall.totals.potential_value)),
        ("eligibility_rate", format!("{:.4}", overall.eligibility_rate)),
        (
            "avg_reinv_share_theoretical",
            format!("{:.6}", overall.avg_reinv_share_theoretical),
        ),
        (
            "avg_reinv_share_actual",
            format!("{:.6}", overall.avg_reinv_share_actual),
        ),
        ("avg_reinv_per_visit", format!("{:.4}", overall.avg_reinv_per_visit)),
        (
            "avg_per_visit_potential",
            format!("{:.4}", overall.avg_per_visit_potential),
        ),
        ("avg_potential_value", format!("{:.4}", overall.avg_potential_value)),
        (
            "avg_expected_trip_value",
            format!("{:.4}", overall.avg_expected_trip_value),
        ),
    ];
    for (metric, value) in rows {
        csv_writer.write_record([metric, value.as_str()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::engine::ReinvestmentEngine;
    use crate::summary::summarize;

    fn processed_records() -> Vec<PlayerRecord> {
        let mut record = PlayerRecord::new("ARG", "ARG");
        record.per_trip_potential = 1_000.0;
        record.per_visit_potential = 5_000.0;
        record.secondary_promo_amount = 50.0;

        let mut records = vec![record];
        ReinvestmentEngine::new(RunConfig::default()).run(&mut records);
        records
    }

    #[test]
    fn test_layout_header_and_row() {
        let records = processed_records();
        let mut buf = Vec::new();
        write_result_table(&mut buf, &records).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("country,segment,"));
        assert!(header.ends_with("reinv_pct_actual"));

        let row = lines.next().unwrap();
        assert!(row.contains("100.00"));
        assert!(row.contains("UNDER_HALF"));
        assert!(row.contains("true"));
    }

    #[test]
    fn test_group_table_writes_shares() {
        let records = processed_records();
        let summary = summarize(&records, &RunConfig::default());

        let mut buf = Vec::new();
        write_group_table(&mut buf, &summary.by_segment).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("ARG"));
        assert!(text.contains("100.0000")); // sole group carries 100% share
    }

    #[test]
    fn test_overall_table_metric_rows() {
        let records = processed_records();
        let summary = summarize(&records, &RunConfig::default());

        let mut buf = Vec::new();
        write_overall_table(&mut buf, &summary.overall).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("total_final_amount,100.00"));
        assert!(text.contains("eligible_records,1"));
    }
}
