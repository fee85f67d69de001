//! Registry -> snapshot -> JSON payload tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use serde_json::{json, Value};

use stashmetrics_core::builder::build_snapshot;
use stashmetrics_core::{Fields, PercentileSpec, Registry};

fn payload(registry: &Registry, defaults: &Fields) -> Value {
    let snap = build_snapshot(registry, defaults, &PercentileSpec::default());
    let bytes = snap.serialize().unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn all_basic_kinds() {
    let registry = Registry::new();
    registry.get_or_register_counter("test_counter").unwrap().inc(6);
    registry.get_or_register_counter("test_counter").unwrap().inc(2);
    registry.get_or_register_gauge("test_gauge").unwrap().update(2);
    registry.get_or_register_gauge("test_gauge").unwrap().update(3);
    registry.get_or_register_gauge_float64("test_gaugeFloat64").unwrap().update(4.0);
    registry.get_or_register_gauge_float64("test_gaugeFloat64").unwrap().update(5.0);
    let h = registry.get_or_register_histogram("test_histogram", 2).unwrap();
    h.update(9);
    h.update(10);

    let expected = json!({
        "test_counter.count": 8,
        "test_gauge": 3.0,
        "test_gaugeFloat64": 5.0,
        "test_histogram.count": 2.0,
        "test_histogram.min": 9.0,
        "test_histogram.max": 10.0,
        "test_histogram.mean": 9.5,
        "test_histogram.stddev": 0.5,
        "test_histogram.var": 0.25,
        "test_histogram.p50": 9.5,
        "test_histogram.p75": 10.0,
        "test_histogram.p95": 10.0,
        "test_histogram.p99": 10.0,
        "test_histogram.p99_9": 10.0
    });
    assert_eq!(payload(&registry, &Fields::new()), expected);
}

#[test]
fn defaults_present_in_every_payload() {
    let registry = Registry::new();
    registry.get_or_register_counter("test_counter").unwrap().inc(6);

    let mut defaults = Fields::new();
    defaults.insert("client".into(), "dummy-client".into());
    defaults.insert("metric".into(), "doc".into());

    let expected = json!({
        "client": "dummy-client",
        "metric": "doc",
        "test_counter.count": 6
    });
    assert_eq!(payload(&registry, &defaults), expected);
    assert_eq!(payload(&registry, &defaults), expected);
}

#[test]
fn meter_and_timer_keys() {
    let registry = Registry::new();
    registry.get_or_register_meter("requests").unwrap().mark(3);
    let t = registry.get_or_register_timer("latency").unwrap();
    t.update(Duration::from_millis(5));
    t.update(Duration::from_millis(15));

    let v = payload(&registry, &Fields::new());
    let obj = v.as_object().unwrap();

    assert_eq!(obj["requests.count"], json!(3.0));
    for k in ["requests.rate1", "requests.rate5", "requests.rate15", "requests.mean"] {
        assert!(obj[k].is_f64(), "{k}");
    }

    assert_eq!(obj["latency.count"], json!(2.0));
    assert_eq!(obj["latency.min"], json!(5.0));
    assert_eq!(obj["latency.max"], json!(15.0));
    assert_eq!(obj["latency.mean"], json!(10.0));
    assert_eq!(obj["latency.stddev"], json!(5.0));
    assert_eq!(obj["latency.p50"], json!(10.0));
    assert_eq!(obj["latency.p99_9"], json!(15.0));
    assert!(!obj.contains_key("latency.rate1"));
}
