//! In-memory metric registry backed by `DashMap`.
//!
//! Metrics are created on first use and shared as `Arc`s, so call sites keep
//! updating them without touching the map again. A name belongs to exactly
//! one kind; asking for it as another kind is an error rather than a silent
//! replacement.

use std::sync::Arc;

use dashmap::DashMap;

use super::{
    Counter, Gauge, GaugeFloat64, Histogram, Meter, MetricSource, MetricState, Timer,
};
use crate::error::{Result, StashError};

#[derive(Debug, Clone)]
enum Metric {
    Counter(Arc<Counter>),
    Gauge(Arc<Gauge>),
    GaugeFloat64(Arc<GaugeFloat64>),
    Histogram(Arc<Histogram>),
    Meter(Arc<Meter>),
    Timer(Arc<Timer>),
}

impl Metric {
    fn kind_name(&self) -> &'static str {
        match self {
            Metric::Counter(_) => "counter",
            Metric::Gauge(_) => "gauge",
            Metric::GaugeFloat64(_) => "gauge_float64",
            Metric::Histogram(_) => "histogram",
            Metric::Meter(_) => "meter",
            Metric::Timer(_) => "timer",
        }
    }

    fn state(&self) -> MetricState {
        match self {
            Metric::Counter(c) => MetricState::Counter(c.count()),
            Metric::Gauge(g) => MetricState::Gauge(g.value()),
            Metric::GaugeFloat64(g) => MetricState::GaugeFloat64(g.value()),
            Metric::Histogram(h) => MetricState::Histogram(h.snapshot()),
            Metric::Meter(m) => MetricState::Meter(m.snapshot()),
            Metric::Timer(t) => MetricState::Timer(t.snapshot()),
        }
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    map: DashMap<String, Metric>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_register<T>(
        &self,
        name: &str,
        make: impl FnOnce() -> Metric,
        pick: impl Fn(&Metric) -> Option<Arc<T>>,
    ) -> Result<Arc<T>> {
        let entry = self.map.entry(name.to_string()).or_insert_with(make);
        let metric = entry.value();
        match pick(metric) {
            Some(m) => Ok(m),
            None => Err(StashError::KindMismatch {
                name: name.to_string(),
                existing: metric.kind_name(),
            }),
        }
    }

    pub fn get_or_register_counter(&self, name: &str) -> Result<Arc<Counter>> {
        self.get_or_register(
            name,
            || Metric::Counter(Arc::new(Counter::new())),
            |m| match m {
                Metric::Counter(c) => Some(Arc::clone(c)),
                _ => None,
            },
        )
    }

    pub fn get_or_register_gauge(&self, name: &str) -> Result<Arc<Gauge>> {
        self.get_or_register(
            name,
            || Metric::Gauge(Arc::new(Gauge::new())),
            |m| match m {
                Metric::Gauge(g) => Some(Arc::clone(g)),
                _ => None,
            },
        )
    }

    pub fn get_or_register_gauge_float64(&self, name: &str) -> Result<Arc<GaugeFloat64>> {
        self.get_or_register(
            name,
            || Metric::GaugeFloat64(Arc::new(GaugeFloat64::new())),
            |m| match m {
                Metric::GaugeFloat64(g) => Some(Arc::clone(g)),
                _ => None,
            },
        )
    }

    /// `capacity` only applies when the histogram is created by this call.
    pub fn get_or_register_histogram(&self, name: &str, capacity: usize) -> Result<Arc<Histogram>> {
        self.get_or_register(
            name,
            || Metric::Histogram(Arc::new(Histogram::new(capacity))),
            |m| match m {
                Metric::Histogram(h) => Some(Arc::clone(h)),
                _ => None,
            },
        )
    }

    pub fn get_or_register_meter(&self, name: &str) -> Result<Arc<Meter>> {
        self.get_or_register(
            name,
            || Metric::Meter(Arc::new(Meter::new())),
            |m| match m {
                Metric::Meter(meter) => Some(Arc::clone(meter)),
                _ => None,
            },
        )
    }

    pub fn get_or_register_timer(&self, name: &str) -> Result<Arc<Timer>> {
        self.get_or_register(
            name,
            || Metric::Timer(Arc::new(Timer::default())),
            |m| match m {
                Metric::Timer(t) => Some(Arc::clone(t)),
                _ => None,
            },
        )
    }

    /// Returns whether a metric was removed.
    pub fn unregister(&self, name: &str) -> bool {
        self.map.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl MetricSource for Registry {
    fn each(&self, f: &mut dyn FnMut(&str, MetricState)) {
        // Clone the handles out first so `f` never runs under a shard lock.
        let entries: Vec<(String, Metric)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        for (name, metric) in entries {
            f(&name, metric.state());
        }
    }
}
