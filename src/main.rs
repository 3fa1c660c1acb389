//! Reinvestment Engine CLI
//!
//! Loads a player activity extract, runs the reinvestment computation, and
//! writes the promotion layout plus summary tables.

use anyhow::Context;
use clap::Parser;
use reinvestment_engine::{export, load_records, summarize, ReinvestmentEngine, RunConfig};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    name = "reinvestment_engine",
    version,
    about = "Compute per-player casino reinvestment amounts and KPI summaries"
)]
struct Cli {
    /// Input activity extract (delimited text with a detectable header row)
    #[arg(short, long)]
    input: PathBuf,

    /// Run configuration JSON; built-in defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output promotion layout CSV
    #[arg(short, long, default_value = "promotion_layout.csv")]
    output: PathBuf,

    /// Directory for the summary tables (overall.csv, by_country.csv,
    /// by_segment.csv); skipped when omitted
    #[arg(long)]
    summary_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    println!("Reinvestment Engine v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Run started {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let config = match &cli.config {
        Some(path) => RunConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => RunConfig::default(),
    };

    let start = Instant::now();
    let mut records = load_records(&cli.input)
        .with_context(|| format!("loading extract from {}", cli.input.display()))?;
    println!("Loaded {} records in {:?}", records.len(), start.elapsed());

    let engine = ReinvestmentEngine::new(config);
    let run_start = Instant::now();
    engine.run(&mut records);
    println!("Computation complete in {:?}", run_start.elapsed());

    let summary = summarize(&records, engine.config());

    export::write_result_csv(&cli.output, &records)
        .with_context(|| format!("writing layout to {}", cli.output.display()))?;
    println!("Promotion layout written to: {}", cli.output.display());

    if let Some(dir) = &cli.summary_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating summary directory {}", dir.display()))?;

        let overall_path = dir.join("overall.csv");
        let file = std::fs::File::create(&overall_path)?;
        export::write_overall_table(file, &summary.overall)?;

        let country_path = dir.join("by_country.csv");
        let file = std::fs::File::create(&country_path)?;
        export::write_group_table(file, &summary.by_country)?;

        let segment_path = dir.join("by_segment.csv");
        let file = std::fs::File::create(&segment_path)?;
        export::write_group_table(file, &summary.by_segment)?;

        println!("Summary tables written to: {}", dir.display());
    }

    let overall = &summary.overall;
    println!("\nSummary:");
    println!("  Records: {}", overall.records);
    println!("  Eligible Players: {}", overall.eligible_records);
    println!("  Excluded Players: {}", overall.excluded_records);
    println!("  Eligibility Rate: {:.2}%", overall.eligibility_rate);
    println!("  Total Reinvestment: {:.2}", overall.totals.final_amount);
    println!("  Total Potential: {:.2}", overall.totals.potential_value);
    println!("  Avg Reinvestment per Visit: {:.2}", overall.avg_reinv_per_visit);

    println!("\nReinvestment by Country:");
    for group in &summary.by_country {
        println!(
            "  {:>12} {:>14.2} ({:>6.2}%)",
            group.key, group.totals.final_amount, group.share.final_amount
        );
    }

    println!("\nReinvestment by Segment:");
    for group in &summary.by_segment {
        println!(
            "  {:>12} {:>14.2} ({:>6.2}%)",
            group.key, group.totals.final_amount, group.share.final_amount
        );
    }

    Ok(())
}
