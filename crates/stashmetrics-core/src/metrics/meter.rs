//! Event-rate meter with 1/5/15-minute exponentially weighted moving averages.
//!
//! Rates tick every [`TICK_INTERVAL`]. There is no background ticker: pending
//! ticks are applied lazily whenever the meter is marked or read, so an idle
//! meter still decays correctly the next time it is observed.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

pub const TICK_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
struct Ewma {
    alpha: f64,
    rate: f64,
    initialized: bool,
}

impl Ewma {
    fn with_minutes(minutes: f64) -> Self {
        let secs = TICK_INTERVAL.as_secs_f64();
        Self {
            alpha: 1.0 - (-secs / 60.0 / minutes).exp(),
            rate: 0.0,
            initialized: false,
        }
    }

    /// Fold `uncounted` events observed during one tick into the average.
    fn tick(&mut self, uncounted: i64) {
        let instant = uncounted as f64 / TICK_INTERVAL.as_secs_f64();
        if self.initialized {
            self.rate += self.alpha * (instant - self.rate);
        } else {
            self.rate = instant;
            self.initialized = true;
        }
    }
}

/// Frozen meter state, rates in events per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterSnapshot {
    pub count: i64,
    pub rate1: f64,
    pub rate5: f64,
    pub rate15: f64,
    pub rate_mean: f64,
}

#[derive(Debug)]
struct MeterInner {
    count: i64,
    uncounted: i64,
    m1: Ewma,
    m5: Ewma,
    m15: Ewma,
    started: Instant,
    last_tick: Instant,
}

impl MeterInner {
    fn catch_up(&mut self, now: Instant) {
        while now.saturating_duration_since(self.last_tick) >= TICK_INTERVAL {
            let uncounted = std::mem::take(&mut self.uncounted);
            self.m1.tick(uncounted);
            self.m5.tick(uncounted);
            self.m15.tick(uncounted);
            self.last_tick += TICK_INTERVAL;
        }
    }
}

#[derive(Debug)]
pub struct Meter {
    inner: Mutex<MeterInner>,
}

impl Default for Meter {
    fn default() -> Self {
        Self::new()
    }
}

impl Meter {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            inner: Mutex::new(MeterInner {
                count: 0,
                uncounted: 0,
                m1: Ewma::with_minutes(1.0),
                m5: Ewma::with_minutes(5.0),
                m15: Ewma::with_minutes(15.0),
                started: now,
                last_tick: now,
            }),
        }
    }

    /// Record `n` events.
    pub fn mark(&self, n: i64) {
        self.mark_at(n, Instant::now());
    }

    fn mark_at(&self, n: i64, now: Instant) {
        let mut inner = self.inner.lock();
        inner.catch_up(now);
        inner.count += n;
        inner.uncounted += n;
    }

    pub fn count(&self) -> i64 {
        self.inner.lock().count
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        self.snapshot_at(Instant::now())
    }

    fn snapshot_at(&self, now: Instant) -> MeterSnapshot {
        let mut inner = self.inner.lock();
        inner.catch_up(now);
        let elapsed = now.saturating_duration_since(inner.started).as_secs_f64();
        let rate_mean = if elapsed > 0.0 {
            inner.count as f64 / elapsed
        } else {
            0.0
        };
        MeterSnapshot {
            count: inner.count,
            rate1: inner.m1.rate,
            rate5: inner.m5.rate,
            rate15: inner.m15.rate,
            rate_mean,
        }
    }
}
