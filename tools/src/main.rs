//! stat-sync: pull crime and travel statistics into a local SQLite database.
//!
//! Usage:
//!   stat-sync --config ingest.json --db stats.db cyber
//!   stat-sync --config ingest.json --db stats.db travel --year 2024 --month 1 --country 112
//!   stat-sync --config ingest.json --db stats.db travel-csv
//!   stat-sync --config ingest.json check-config

use anyhow::{bail, Result};
use crimestat_core::{
    config::IngestConfig,
    http::ReqwestTransport,
    ingest::{CsvSyncSummary, Ingestor},
    outcome::SyncReport,
    store::IngestStore,
    types::Direction,
};
use std::env;

const COMMANDS: &str = "cyber | voice | travel | travel-csv | all | check-config | show";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config_path = flag_value(&args, "--config").unwrap_or("ingest.json");
    let db = flag_value(&args, "--db").unwrap_or("stats.db");
    let Some(command) = positional(&args) else {
        bail!("missing command, expected one of: {COMMANDS}");
    };

    log::info!("stat-sync {command}: config={config_path} db={db}");
    let config = IngestConfig::load(config_path)?;
    if command == "check-config" {
        println!("{}", serde_json::to_string_pretty(&config.key_report())?);
        return Ok(());
    }

    let store = IngestStore::open(db)?;
    store.migrate()?;
    if command == "show" {
        return print_store(&store);
    }

    let transport = ReqwestTransport::new()?;
    let ingestor = Ingestor::new(&config, &transport, &store);

    match command {
        "cyber" => print_report(&ingestor.sync_cyber_scam()?),
        "voice" => print_report(&ingestor.sync_voice_phishing()?),
        "travel" => {
            let year = parse_arg(&args, "--year", 2024i32);
            let month = parse_arg(&args, "--month", 1u32);
            let country = flag_value(&args, "--country").unwrap_or("112");
            let direction: Direction = match flag_value(&args, "--direction") {
                Some(flag) => flag.parse::<Direction>().map_err(anyhow::Error::msg)?,
                None => Direction::default(),
            };
            print_report(&ingestor.sync_travel_stats(year, month, country, direction)?);
        }
        "travel-csv" => print_csv_summary(&ingestor.sync_travel_csv()?),
        "all" => {
            print_report(&ingestor.sync_cyber_scam()?);
            print_report(&ingestor.sync_voice_phishing()?);
            print_csv_summary(&ingestor.sync_travel_csv()?);
        }
        other => bail!("unknown command '{other}', expected one of: {COMMANDS}"),
    }
    Ok(())
}

fn print_report(report: &SyncReport) {
    println!("=== {} SYNC ===", report.source.as_str().to_uppercase());
    println!("  run_id:    {}", report.run_id);
    println!("  accepted:  {}", report.accepted);
    println!("  skipped:   {}", report.skipped);
    for (reason, count) in &report.reasons {
        println!("    {reason:<20} {count}");
    }
}

fn print_csv_summary(summary: &CsvSyncSummary) {
    print_report(&summary.report);
    println!("  saved rows:  {}", summary.saved_rows);
    println!("  table rows:  {}", summary.total_rows);
    println!();
    println!("  year   all-countries   watch-list");
    for (year, total) in &summary.year_totals {
        let crime = summary.crime_totals.get(year).copied().unwrap_or(0);
        println!("  {year}  {total:>13}  {crime:>11}");
    }
    println!("  all years: {}", summary.total_all_years);
}

fn print_store(store: &IngestStore) -> Result<()> {
    println!("=== STORE ===");
    println!("  cyber_scam_stat:     {}", store.cyber_scam_count()?);
    println!("  voice_phishing_stat: {}", store.voice_phishing_count()?);
    println!("  travel_stat:         {}", store.travel_count()?);
    println!();
    println!("=== RECENT SYNC RUNS ===");
    let runs = store.recent_sync_runs(10)?;
    if runs.is_empty() {
        println!("  (none yet)");
    }
    for run in runs {
        println!(
            "  {} | {:<14} | accepted {:>5} | skipped {:>4}",
            run.started_at, run.source, run.accepted, run.skipped
        );
    }
    Ok(())
}

/// First argument that is neither a flag nor a flag's value.
fn positional(args: &[String]) -> Option<&str> {
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            iter.next();
            continue;
        }
        return Some(arg.as_str());
    }
    None
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    flag_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
