//! Regional departure CSV parsing and bulk sync.

mod common;

use common::{config, store, CannedTransport};
use crimestat_core::{
    config::CsvLayout,
    error::IngestError,
    ingest::Ingestor,
    outcome::SkipReason,
    sources::travel_csv::{parse_long_table, parse_wide_table, DepartureRow},
    types::Direction,
};
use std::collections::BTreeMap;
use std::fs;

/// Wide export: 중국 and 미국 head-count columns, each followed by a
/// year-over-year ratio column that must be ignored.
fn wide_table(years: &[(i32, i64, i64)]) -> String {
    let mut csv = String::from("출국 통계,,,,,,\n,,,중국,,미국,\n,,,명수,전년대비,명수,전년대비\n");
    // Data before any year marker has no year context.
    csv.push_str(",1월,,999999,0.0,999999,0.0\n");
    for &(year, china_base, usa_base) in years {
        csv.push_str(&format!("{year}년,,,,,,\n"));
        for month in 1..=12i64 {
            csv.push_str(&format!(
                ",{month}월,,\"{}\",12.5,{},-4.0\n",
                format_thousands(china_base + month),
                usa_base * month
            ));
        }
        csv.push_str(",합계,,1,1,1,1\n");
    }
    csv
}

fn format_thousands(n: i64) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[test]
fn wide_table_sums_twelve_months_per_country() {
    let rows = parse_wide_table(wide_table(&[(2019, 1000, 200)]).as_bytes(), "asia").unwrap();
    assert_eq!(
        rows,
        vec![
            DepartureRow {
                year: 2019, month: 0, country: "미국".into(), region: "asia".into(),
                departures: 200 * 78,
            },
            DepartureRow {
                year: 2019, month: 0, country: "중국".into(), region: "asia".into(),
                departures: 12 * 1000 + 78,
            },
        ]
    );
}

#[test]
fn wide_table_tracks_year_context() {
    let rows = parse_wide_table(
        wide_table(&[(2019, 10, 1), (2020, 20, 2)]).as_bytes(),
        "asia",
    )
    .unwrap();
    assert_eq!(rows.len(), 4);
    let china_2020 = rows
        .iter()
        .find(|r| r.year == 2020 && r.country == "중국")
        .unwrap();
    assert_eq!(china_2020.departures, 12 * 20 + 78);
}

#[test]
fn wide_table_ignores_unlabelled_and_blank_columns() {
    let csv = "x,,,,,\n,,,일본,,\n,,,count,ratio,명수\n2021년,,,,,\n,1월,,5,1.0,7\n,2월,,-,1.0,7\n";
    let rows = parse_wide_table(csv.as_bytes(), "asia").unwrap();
    // Column 5 is labelled 명수 but has no country name.
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].country, "일본");
    assert_eq!(rows[0].departures, 5);
}

#[test]
fn wide_table_without_data_rows_is_empty() {
    assert!(parse_wide_table("a\nb\n".as_bytes(), "asia").unwrap().is_empty());
}

#[test]
fn long_table_lowercases_and_drops_duplicates() {
    let csv = "year,month,Japan,USA\n\
               2020,1,100,50\n\
               2020,2,\"1,100\",-\n\
               2020,1,999,999\n\
               2020,13,1,1\n\
               abc,1,1,1\n";
    let outcome = parse_long_table(csv.as_bytes(), "asia").unwrap();

    let keyed: Vec<_> = outcome
        .accepted
        .iter()
        .map(|r| (r.month, r.country.as_str(), r.departures))
        .collect();
    assert_eq!(
        keyed,
        vec![(1, "japan", 100), (1, "usa", 50), (2, "japan", 1100), (2, "usa", 0)]
    );
    assert_eq!(
        outcome.skipped.iter().map(|s| s.reason.clone()).collect::<Vec<_>>(),
        vec![
            SkipReason::MonthOutOfRange(13),
            SkipReason::NotNumeric { field: "year", value: "abc".to_string() },
        ]
    );
}

#[test]
fn long_table_requires_year_and_month_headers() {
    let err = parse_long_table("yr,month,japan\n2020,1,5\n".as_bytes(), "asia").unwrap_err();
    assert!(matches!(err, IngestError::Layout(_)));
}

#[test]
fn csv_sync_persists_annual_rows_and_reports_totals() {
    let dir = tempfile::tempdir().unwrap();
    let asia = dir.path().join("asia.csv");
    fs::write(&asia, wide_table(&[(2019, 1000, 200), (2020, 100, 10)])).unwrap();
    let europe = dir.path().join("europe.csv");
    fs::write(
        &europe,
        "x,,,,\n,,,영국,\n,,,명수,전년대비\n2019년,,,,\n,1월,,300,1\n,2월,,400,1\n",
    )
    .unwrap();

    let mut config = config();
    config.csv_files = BTreeMap::from([
        ("asia".to_string(), asia.display().to_string()),
        ("europe".to_string(), europe.display().to_string()),
        ("africa".to_string(), dir.path().join("missing.csv").display().to_string()),
        ("oceania".to_string(), String::new()),
    ]);
    config.crime_countries = vec!["중국".to_string(), "영국".to_string()];
    let store = store();
    let transport = CannedTransport::new();
    let ingestor = Ingestor::new(&config, &transport, &store);

    let summary = ingestor.sync_travel_csv().unwrap();
    assert_eq!(summary.saved_rows, 5);
    assert_eq!(summary.total_rows, 5);

    let china_2019 = 12 * 1000 + 78;
    let usa_2019 = 200 * 78;
    let uk_2019 = 700;
    let china_2020 = 12 * 100 + 78;
    let usa_2020 = 10 * 78;
    assert_eq!(
        summary.year_totals,
        BTreeMap::from([(2019, china_2019 + usa_2019 + uk_2019), (2020, china_2020 + usa_2020)])
    );
    assert_eq!(
        summary.crime_totals,
        BTreeMap::from([(2019, china_2019 + uk_2019), (2020, china_2020)])
    );
    assert_eq!(
        summary.total_all_years,
        china_2019 + usa_2019 + uk_2019 + china_2020 + usa_2020
    );

    let uk = store
        .travel_stat(2019, 0, "europe:영국", Direction::Outbound)
        .unwrap()
        .expect("annual UK row");
    assert_eq!(uk.departures, uk_2019);
    assert_eq!(uk.region.as_deref(), Some("europe"));
    assert_eq!(uk.country_name.as_deref(), Some("영국"));

    // Re-running the bulk load keeps one row per natural key.
    let again = ingestor.sync_travel_csv().unwrap();
    assert_eq!(again.total_rows, 5);
    assert_eq!(store.travel_count().unwrap(), 5);
}

#[test]
fn same_country_in_two_region_files_keeps_both_rows() {
    let dir = tempfile::tempdir().unwrap();
    let asia = dir.path().join("asia.csv");
    fs::write(&asia, "x,,,\n,,,러시아\n,,,명수\n2019년,,,\n,1월,,100\n").unwrap();
    let europe = dir.path().join("europe.csv");
    fs::write(&europe, "x,,,\n,,,러시아\n,,,명수\n2019년,,,\n,1월,,40\n").unwrap();

    let mut config = config();
    config.csv_files = BTreeMap::from([
        ("asia".to_string(), asia.display().to_string()),
        ("europe".to_string(), europe.display().to_string()),
    ]);
    let store = store();
    let transport = CannedTransport::new();

    let summary = Ingestor::new(&config, &transport, &store).sync_travel_csv().unwrap();
    assert_eq!(summary.saved_rows, 2);
    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.year_totals, BTreeMap::from([(2019, 140)]));

    let stored: i64 = store.travel_stats().unwrap().iter().map(|r| r.departures).sum();
    assert_eq!(stored, 140);

    let europe_row = store
        .travel_stat(2019, 0, "europe:러시아", Direction::Outbound)
        .unwrap()
        .expect("europe row");
    assert_eq!(europe_row.departures, 40);
    assert_eq!(europe_row.country_name.as_deref(), Some("러시아"));
    assert_eq!(europe_row.region.as_deref(), Some("europe"));
}

#[test]
fn csv_sync_long_layout_keeps_months() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("america.csv");
    fs::write(&path, "year,month,USA\n2021,1,10\n2021,2,20\n2022,1,5\n").unwrap();

    let mut config = config();
    config.csv_layout = CsvLayout::Long;
    config.csv_files = BTreeMap::from([("america".to_string(), path.display().to_string())]);
    let store = store();
    let transport = CannedTransport::new();

    let summary = Ingestor::new(&config, &transport, &store).sync_travel_csv().unwrap();
    assert_eq!(summary.saved_rows, 3);
    assert_eq!(summary.year_totals, BTreeMap::from([(2021, 30), (2022, 5)]));
    assert!(summary.crime_totals.is_empty());

    let feb = store.travel_stat(2021, 2, "america:usa", Direction::Outbound).unwrap().unwrap();
    assert_eq!(feb.departures, 20);
}
