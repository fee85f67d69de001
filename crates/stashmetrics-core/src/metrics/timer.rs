//! Timer: a nanosecond-duration histogram plus a meter of timed events.

use std::time::{Duration, Instant};

use super::histogram::{Histogram, SampleSnapshot};
use super::meter::{Meter, MeterSnapshot};

/// Reservoir size used when a timer is created without an explicit capacity.
pub const DEFAULT_TIMER_CAPACITY: usize = 1028;

#[derive(Debug, Clone, PartialEq)]
pub struct TimerSnapshot {
    /// Durations in nanoseconds.
    pub durations: SampleSnapshot,
    pub rate: MeterSnapshot,
}

#[derive(Debug)]
pub struct Timer {
    histogram: Histogram,
    meter: Meter,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(DEFAULT_TIMER_CAPACITY)
    }
}

impl Timer {
    pub fn new(capacity: usize) -> Self {
        Self {
            histogram: Histogram::new(capacity),
            meter: Meter::new(),
        }
    }

    pub fn update(&self, d: Duration) {
        let nanos = i64::try_from(d.as_nanos()).unwrap_or(i64::MAX);
        self.histogram.update(nanos);
        self.meter.mark(1);
    }

    pub fn update_since(&self, start: Instant) {
        self.update(start.elapsed());
    }

    /// Run `f` and record how long it took.
    pub fn time<T>(&self, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.update_since(start);
        out
    }

    pub fn count(&self) -> i64 {
        self.histogram.count()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            durations: self.histogram.snapshot(),
            rate: self.meter.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_nanoseconds() {
        let t = Timer::new(4);
        t.update(Duration::from_millis(2));
        t.update(Duration::from_millis(4));

        let s = t.snapshot();
        assert_eq!(s.durations.count(), 2);
        assert_eq!(s.durations.min(), 2_000_000);
        assert_eq!(s.durations.max(), 4_000_000);
        assert_eq!(s.rate.count, 2);
    }

    #[test]
    fn time_returns_closure_output() {
        let t = Timer::default();
        let v = t.time(|| 41 + 1);
        assert_eq!(v, 42);
        assert_eq!(t.count(), 1);
    }
}
