//! Flattening of kind-tagged metric state into snapshot fields.
//!
//! Naming scheme (`<name>` is the registered metric name):
//! - Counter: `<name>.count` (integer)
//! - Gauge / GaugeFloat64: `<name>` (float)
//! - Histogram: `.count .max .min .mean .stddev .var` plus one `.p<suffix>`
//!   key per configured percentile
//! - Meter: `.count .rate1 .rate5 .rate15 .mean`
//! - Timer: histogram keys, durations converted to milliseconds
//!
//! Unsupported kinds produce no fields.

use crate::metrics::{MetricSource, MetricState, SampleSnapshot};
use crate::percentile::PercentileSpec;
use crate::snapshot::{FieldValue, Fields, Snapshot};

const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Derive the fields for one metric. Pure: the same state always yields the
/// same output.
pub fn flatten(name: &str, state: &MetricState, percentiles: &PercentileSpec) -> Vec<(String, FieldValue)> {
    let key = |suffix: &str| format!("{name}.{suffix}");

    match state {
        MetricState::Counter(count) => vec![(key("count"), FieldValue::Int(*count))],
        MetricState::Gauge(v) => vec![(name.to_string(), FieldValue::Float(*v as f64))],
        MetricState::GaugeFloat64(v) => vec![(name.to_string(), FieldValue::Float(*v))],
        MetricState::Histogram(s) => sample_fields(name, s, percentiles, 1.0),
        MetricState::Meter(m) => vec![
            (key("count"), FieldValue::Float(m.count as f64)),
            (key("rate1"), FieldValue::Float(m.rate1)),
            (key("rate5"), FieldValue::Float(m.rate5)),
            (key("rate15"), FieldValue::Float(m.rate15)),
            (key("mean"), FieldValue::Float(m.rate_mean)),
        ],
        MetricState::Timer(t) => sample_fields(name, &t.durations, percentiles, NANOS_PER_MILLI),
        MetricState::Unsupported(kind) => {
            tracing::debug!(metric = %name, kind = %kind, "unsupported metric kind skipped");
            Vec::new()
        }
    }
}

/// Histogram-shaped fields; every value-valued statistic is divided by
/// `scale` (variance by `scale²`). All fields read the same frozen sample.
fn sample_fields(
    name: &str,
    s: &SampleSnapshot,
    percentiles: &PercentileSpec,
    scale: f64,
) -> Vec<(String, FieldValue)> {
    let key = |suffix: &str| format!("{name}.{suffix}");

    let mut out = Vec::with_capacity(6 + percentiles.len());
    out.push((key("count"), FieldValue::Float(s.count() as f64)));
    out.push((key("max"), FieldValue::Float(s.max() as f64 / scale)));
    out.push((key("min"), FieldValue::Float(s.min() as f64 / scale)));
    out.push((key("mean"), FieldValue::Float(s.mean() / scale)));
    out.push((key("stddev"), FieldValue::Float(s.std_dev() / scale)));
    out.push((key("var"), FieldValue::Float(s.variance() / (scale * scale))));

    for (p, suffix) in percentiles.iter() {
        out.push((key(suffix), FieldValue::Float(s.percentile(p) / scale)));
    }
    out
}

/// Build a fresh snapshot: defaults first, then every enumerated metric.
///
/// A rejected field is dropped and enumeration continues.
pub fn build_snapshot(source: &dyn MetricSource, defaults: &Fields, percentiles: &PercentileSpec) -> Snapshot {
    let mut snap = Snapshot::new(defaults);
    source.each(&mut |name, state| {
        for (k, v) in flatten(name, &state, percentiles) {
            if let Err(e) = snap.set(k, v) {
                tracing::debug!(metric = %name, error = %e, "field skipped");
            }
        }
    });
    snap
}
