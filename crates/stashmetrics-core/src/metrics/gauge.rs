//! Lock-free scalar metrics: counters and gauges backed by atomics.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Monotonic (by convention) integer count. Never reset by the reporter.
#[derive(Debug, Default)]
pub struct Counter {
    count: AtomicI64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment by an arbitrary value.
    pub fn inc(&self, v: i64) {
        self.count.fetch_add(v, Ordering::Relaxed);
    }

    pub fn dec(&self, v: i64) {
        self.count.fetch_sub(v, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.count.store(0, Ordering::Relaxed);
    }

    pub fn count(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Last-set integer value.
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, v: i64) {
        self.value.store(v, Ordering::Relaxed);
    }

    pub fn value(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Last-set float value, stored as raw bits.
#[derive(Debug)]
pub struct GaugeFloat64 {
    bits: AtomicU64,
}

impl Default for GaugeFloat64 {
    fn default() -> Self {
        Self {
            bits: AtomicU64::new(0f64.to_bits()),
        }
    }
}

impl GaugeFloat64 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, v: f64) {
        self.bits.store(v.to_bits(), Ordering::Relaxed);
    }

    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}
