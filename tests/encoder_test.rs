mod common;

use common::*;
use rask_metric_reporter::domain::{HeaderInfo, MetricRecord, ReportBatch, ValueStatistics};
use rask_metric_reporter::encoder::{DurationBasis, FixedClock, GroupLayout, JsonEncoder};
use serde_json::Value;
use std::sync::Arc;

fn encoder() -> JsonEncoder {
    JsonEncoder::new(Arc::new(FixedClock::at(NOW)))
}

#[test]
fn test_counter() {
    assert_eq!(
        encoder().encode_record(&counter_metric()).unwrap(),
        r#"{"type":"counter","name":"org.test.CounterFoo.doStuff","count":10,"dur":0}"#
    );
}

#[test]
fn test_gauge_metric() {
    assert_eq!(
        encoder().encode_record(&gauge_metric()).unwrap(),
        r#"{"type":"gauge","name":"org.test.GaugeFoo.doStuff","value":24.0}"#
    );
}

#[test]
fn test_value_metric() {
    assert_eq!(
        encoder().encode_record(&value_metric()).unwrap(),
        r#"{"type":"value","name":"org.test.ValueFoo.doStuff","n":{"count":3,"avg":14,"max":16,"sum":42,"dur":0}}"#
    );
}

#[test]
fn test_timed_metric() {
    // values converted into microseconds
    assert_eq!(
        encoder().encode_record(&timed_metric()).unwrap(),
        r#"{"type":"timed","name":"org.test.TimedFoo.doStuff","n":{"count":3,"avg":120,"max":140,"sum":360,"dur":0},"e":{"count":2,"avg":210,"max":220,"sum":420,"dur":0}}"#
    );
}

#[test]
fn test_timed_metric_without_errors() {
    let record = MetricRecord::timed(
        "org.test.TimedFoo.quiet",
        collect(&[50], NOW - 2_600),
        ValueStatistics::empty(NOW - 2_600),
    );

    assert_eq!(
        encoder().encode_record(&record).unwrap(),
        r#"{"type":"timed","name":"org.test.TimedFoo.quiet","n":{"count":1,"avg":50,"max":50,"sum":50,"dur":3},"e":{"count":0}}"#
    );
}

#[test]
fn test_metric_list() {
    let metrics = vec![value_metric(), gauge_metric(), counter_metric(), timed_metric()];
    let header = HeaderInfo::default()
        .with_key("key-val")
        .with_env("dev")
        .with_app("app-val")
        .with_server("server-val");

    let json = encoder().encode(&header, &metrics, NOW).unwrap();

    assert!(json.contains(r#""env":"dev""#));
    assert!(json.contains(r#""app":"app-val""#));
    assert!(json.contains(r#""server":"server-val""#));

    let parsed: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["time"], NOW);
    assert_eq!(parsed["key"], "key-val");
    assert_eq!(parsed["env"], "dev");
    assert_eq!(parsed["app"], "app-val");
    assert_eq!(parsed["server"], "server-val");

    let metric_array = parsed["metrics"].as_array().unwrap();
    assert_eq!(metric_array.len(), 4);

    let types: Vec<_> = metric_array.iter().map(|m| m["type"].as_str().unwrap()).collect();
    assert_eq!(types, ["value", "gauge", "counter", "timed"]);
}

#[test]
fn test_header_key_order() {
    let header = HeaderInfo::new("k", "a", "e", "s");
    let json = encoder().encode(&header, &[gauge_metric()], 42).unwrap();

    assert!(json.starts_with(
        r#"{"time":42,"key":"k","app":"a","env":"e","server":"s","metrics":[{"type":"gauge""#
    ));
    assert!(json.ends_with("}]}"));
}

#[test]
fn test_unset_header_fields_are_empty_strings() {
    let json = encoder().encode(&HeaderInfo::default(), &[], NOW).unwrap();
    let parsed: Value = serde_json::from_str(&json).unwrap();

    for field in ["key", "app", "env", "server"] {
        assert_eq!(parsed[field], "", "field {field}");
    }
}

#[test]
fn test_sanitized_header_round_trips() {
    let header = HeaderInfo::default().with_server(r#"O'Brien "the gauge""#);
    let json = encoder().encode(&header, &[], NOW).unwrap();
    let parsed: Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed["server"], "OBrien the gauge");
}

#[test]
fn test_same_snapshot_encodes_identically() {
    let encoder = encoder();
    let batch = ReportBatch::new(
        HeaderInfo::new("k", "a", "e", "s"),
        NOW,
        vec![counter_metric(), gauge_metric(), value_metric(), timed_metric()],
    );

    assert_eq!(
        encoder.encode_batch(&batch).unwrap(),
        encoder.encode_batch(&batch).unwrap()
    );
}

#[test]
fn test_zero_count_statistics_only_carry_count() {
    let records = vec![
        MetricRecord::value("a", ValueStatistics::empty(NOW - 10_000)),
        MetricRecord::timed("b", ValueStatistics::empty(0), ValueStatistics::empty(0)),
    ];
    let json = encoder().encode(&HeaderInfo::default(), &records, NOW).unwrap();
    let parsed: Value = serde_json::from_str(&json).unwrap();

    let blocks = [
        &parsed["metrics"][0]["n"],
        &parsed["metrics"][1]["n"],
        &parsed["metrics"][1]["e"],
    ];
    for block in blocks {
        let keys: Vec<_> = block.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["count"]);
    }
}

#[test]
fn test_gauge_group_is_valid_json_object() {
    let json = encoder()
        .encode(&HeaderInfo::default(), &[gauge_group_metric()], NOW)
        .unwrap();
    let parsed: Value = serde_json::from_str(&json).unwrap();

    let group = &parsed["metrics"][0]["group"];
    assert_eq!(group["heap"], 128.5);
    assert_eq!(group["nonHeap"], 64.0);
}

#[test]
fn test_legacy_group_layout() {
    let json = encoder()
        .with_group_layout(GroupLayout::LegacyArray)
        .encode_record(&gauge_group_metric())
        .unwrap();

    assert_eq!(
        json,
        r#"{"type":"gaugeGroup","name":"jvm.memory","group":["heap":128.5, "nonHeap":64.0]}"#
    );
}

#[test]
fn test_collection_time_basis_ignores_live_clock() {
    let clock = FixedClock::at(NOW + 3_600_000);
    let encoder = JsonEncoder::new(Arc::new(clock))
        .with_duration_basis(DurationBasis::CollectionTime);

    let json = encoder.encode(&HeaderInfo::default(), &[counter_metric()], NOW).unwrap();
    assert!(json.contains(r#""count":10,"dur":0"#));
}

#[test]
fn test_non_finite_gauge_is_null() {
    let json = encoder()
        .encode(&HeaderInfo::default(), &[MetricRecord::gauge("g", f64::NAN)], NOW)
        .unwrap();
    let parsed: Value = serde_json::from_str(&json).unwrap();

    assert!(parsed["metrics"][0]["value"].is_null());
}
