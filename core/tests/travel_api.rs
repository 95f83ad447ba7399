//! Live tourism API: XML/JSON item extraction and keyed upserts.

mod common;

use common::{config, store, travel_url, CannedTransport};
use crimestat_core::{
    error::IngestError,
    ingest::Ingestor,
    sources::travel::{extract_item, normalize_travel_item, year_month},
    types::Direction,
    xml::{get_ci, lookup_path, xml_to_value},
};
use serde_json::json;

fn xml_with_items(items: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<response>
  <header><resultCode>0000</resultCode><resultMsg>OK</resultMsg></header>
  <body>
    <items>{items}</items>
    <numOfRows>10</numOfRows><pageNo>1</pageNo><totalCount>1</totalCount>
  </body>
</response>"#
    )
}

const JAPAN_ITEM: &str = "<item><ed>국민해외관광객</ed><edCd>D</edCd><natCd>112</natCd>\
    <natKorNm>일  본</natKorNm><num>1,234,567</num><ym>202401</ym></item>";

#[test]
fn xml_converts_to_nested_value() {
    let doc = xml_to_value(&xml_with_items(JAPAN_ITEM)).unwrap();
    assert_eq!(
        lookup_path(&doc, &["response", "header", "resultCode"]),
        Some(&json!("0000"))
    );
    let item = lookup_path(&doc, &["response", "body", "items", "item"]).unwrap();
    assert_eq!(item["natCd"], json!("112"));
    assert_eq!(item["num"], json!("1,234,567"));
}

#[test]
fn xml_repeated_tags_become_arrays_and_empty_tags_null() {
    let doc = xml_to_value(r#"<a x="1"><b>one</b><b>two</b><c/><d></d></a>"#).unwrap();
    assert_eq!(
        doc,
        json!({ "a": { "@x": "1", "b": ["one", "two"], "c": null, "d": null } })
    );
    assert!(xml_to_value("<a><b></a>").is_err());
    assert!(xml_to_value("").is_err());
}

#[test]
fn case_insensitive_field_lookup() {
    let item = json!({ "NUM": "12" });
    assert_eq!(get_ci(&item, "num"), Some(&json!("12")));
    assert_eq!(get_ci(&item, "ratio"), None);
}

#[test]
fn extract_item_handles_missing_and_multiple() {
    assert_eq!(extract_item(&xml_with_items("")), None);
    assert_eq!(extract_item("<response><header/></response>"), None);
    assert_eq!(extract_item("definitely not a document <<<"), None);

    let two = format!("{JAPAN_ITEM}<item><natCd>100</natCd><num>5</num></item>");
    let item = extract_item(&xml_with_items(&two)).unwrap();
    assert_eq!(item["natCd"], json!("112"));

    let as_json = json!({ "response": { "body": { "items": { "item": [{ "Num": 77 }] } } } });
    let item = extract_item(&as_json.to_string()).unwrap();
    assert_eq!(item, json!({ "Num": 77 }));
}

#[test]
fn normalize_item_reads_count_name_and_ratio() {
    let item = json!({ "num": "1,200", "natKorNm": "일본", "Ratio": "-3.5" });
    let record = normalize_travel_item(&item, 2024, 1, "112", Direction::Outbound);
    assert_eq!(record.departures, 1200);
    assert_eq!(record.country_name.as_deref(), Some("일본"));
    assert_eq!(record.ratio, Some(-3.5));

    let garbled = json!({ "num": "n/a" });
    let record = normalize_travel_item(&garbled, 2024, 1, "112", Direction::Outbound);
    assert_eq!(record.departures, 0);
    assert_eq!(record.ratio, None);
}

#[test]
fn year_month_is_zero_padded_and_validated() {
    assert_eq!(year_month(2024, 1).unwrap(), "202401");
    assert_eq!(year_month(2019, 12).unwrap(), "201912");
    assert!(matches!(year_month(2024, 13), Err(IngestError::Config(_))));
}

#[test]
fn sync_upserts_one_keyed_row() {
    let transport = CannedTransport::new().with_body(&travel_url(), xml_with_items(JAPAN_ITEM));
    let config = config();
    let store = store();
    let ingestor = Ingestor::new(&config, &transport, &store);

    let report = ingestor.sync_travel_stats(2024, 1, "112", Direction::Outbound).unwrap();
    assert_eq!(report.accepted, 1);
    ingestor.sync_travel_stats(2024, 1, "112", Direction::Outbound).unwrap();
    assert_eq!(store.travel_count().unwrap(), 1);

    let call = transport.last_call();
    assert_eq!(call.param("YM"), Some("202401"));
    assert_eq!(call.param("NAT_CD"), Some("112"));
    assert_eq!(call.param("ED_CD"), Some("D"));

    let stored = store
        .travel_stat(2024, 1, "112", Direction::Outbound)
        .unwrap()
        .expect("row stored");
    assert_eq!(stored.departures, 1_234_567);
    assert_eq!(stored.country_name.as_deref(), Some("일  본"));

    // Same month and country, other direction: a distinct natural key.
    ingestor.sync_travel_stats(2024, 1, "112", Direction::Inbound).unwrap();
    assert_eq!(store.travel_count().unwrap(), 2);
}

#[test]
fn no_item_writes_nothing() {
    let transport = CannedTransport::new().with_body(&travel_url(), xml_with_items(""));
    let config = config();
    let store = store();
    let report = Ingestor::new(&config, &transport, &store)
        .sync_travel_stats(2024, 2, "112", Direction::Outbound)
        .unwrap();
    assert_eq!(report.accepted, 0);
    assert_eq!(store.travel_count().unwrap(), 0);
}

#[test]
fn transport_failure_is_fatal() {
    let transport = CannedTransport::new().with_status(&travel_url(), 503);
    let config = config();
    let store = store();
    let err = Ingestor::new(&config, &transport, &store)
        .sync_travel_stats(2024, 2, "112", Direction::Outbound)
        .unwrap_err();
    assert!(matches!(err, IngestError::HttpStatus { status: 503, .. }));
}
