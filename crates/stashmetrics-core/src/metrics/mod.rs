//! Measurement objects and the enumeration contract the flush engine reads.
//!
//! The engine never registers, removes, or resets a metric; it only calls
//! [`MetricSource::each`] and flattens whatever state is handed to it. The
//! in-memory [`Registry`] is the default source, but anything that can
//! enumerate `(name, MetricState)` pairs can be flushed.

pub mod gauge;
pub mod histogram;
pub mod meter;
pub mod registry;
pub mod timer;

pub use gauge::{Counter, Gauge, GaugeFloat64};
pub use histogram::{Histogram, SampleSnapshot, UniformSample};
pub use meter::{Meter, MeterSnapshot};
pub use registry::Registry;
pub use timer::{Timer, TimerSnapshot};

/// Point-in-time state of one metric, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricState {
    Counter(i64),
    Gauge(i64),
    GaugeFloat64(f64),
    Histogram(SampleSnapshot),
    Meter(MeterSnapshot),
    Timer(TimerSnapshot),
    /// A kind the flattener does not know; carries the kind name for logs.
    Unsupported(String),
}

impl MetricState {
    pub fn kind_name(&self) -> &str {
        match self {
            MetricState::Counter(_) => "counter",
            MetricState::Gauge(_) => "gauge",
            MetricState::GaugeFloat64(_) => "gauge_float64",
            MetricState::Histogram(_) => "histogram",
            MetricState::Meter(_) => "meter",
            MetricState::Timer(_) => "timer",
            MetricState::Unsupported(kind) => kind,
        }
    }
}

/// Enumerable registry of named metrics.
///
/// `each` must call `f` exactly once per registered metric. No ordering is
/// implied, and implementors handle their own synchronization against
/// concurrent updates.
pub trait MetricSource: Send + Sync {
    fn each(&self, f: &mut dyn FnMut(&str, MetricState));
}
