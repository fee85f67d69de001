//! Histogram over a uniform reservoir sample.
//!
//! Statistics are always derived from a frozen [`SampleSnapshot`]: one copy of
//! the retained values is taken under the lock, sorted once, and every
//! statistic (count, min, max, mean, variance, percentiles) reads that copy.

use parking_lot::Mutex;
use rand::Rng;

/// Fixed-capacity reservoir (Vitter's algorithm R).
#[derive(Debug)]
pub struct UniformSample {
    capacity: usize,
    inner: Mutex<SampleInner>,
}

#[derive(Debug, Default)]
struct SampleInner {
    count: i64,
    values: Vec<i64>,
}

impl UniformSample {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(SampleInner {
                count: 0,
                values: Vec::with_capacity(capacity),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn update(&self, v: i64) {
        let mut inner = self.inner.lock();
        inner.count += 1;
        if inner.values.len() < self.capacity {
            inner.values.push(v);
            return;
        }
        if self.capacity == 0 {
            return;
        }
        let r = rand::thread_rng().gen_range(0..inner.count);
        if let Ok(idx) = usize::try_from(r) {
            if idx < inner.values.len() {
                inner.values[idx] = v;
            }
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.count = 0;
        inner.values.clear();
    }

    pub fn snapshot(&self) -> SampleSnapshot {
        let inner = self.inner.lock();
        SampleSnapshot::new(inner.count, inner.values.clone())
    }
}

/// Frozen, sorted copy of a sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSnapshot {
    count: i64,
    values: Vec<i64>,
}

impl SampleSnapshot {
    /// `count` is the number of updates ever seen, which may exceed the
    /// number of retained `values`.
    pub fn new(count: i64, mut values: Vec<i64>) -> Self {
        values.sort_unstable();
        Self { count, values }
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn min(&self) -> i64 {
        self.values.first().copied().unwrap_or(0)
    }

    pub fn max(&self) -> i64 {
        self.values.last().copied().unwrap_or(0)
    }

    /// Widened so a full reservoir of large values cannot overflow.
    pub fn sum(&self) -> i128 {
        self.values.iter().map(|&v| i128::from(v)).sum()
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.sum() as f64 / self.values.len() as f64
    }

    /// Population variance.
    pub fn variance(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let m = self.mean();
        let sum: f64 = self
            .values
            .iter()
            .map(|&v| {
                let d = v as f64 - m;
                d * d
            })
            .sum();
        sum / self.values.len() as f64
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Interpolated percentile at fraction `p` (`pos = p * (n + 1)`).
    pub fn percentile(&self, p: f64) -> f64 {
        let n = self.values.len();
        if n == 0 {
            return 0.0;
        }
        let pos = p * (n + 1) as f64;
        if pos < 1.0 {
            return self.values[0] as f64;
        }
        if pos >= n as f64 {
            return self.values[n - 1] as f64;
        }
        let idx = pos.floor() as usize;
        let lower = self.values[idx - 1] as f64;
        let upper = self.values[idx] as f64;
        lower + (pos - pos.floor()) * (upper - lower)
    }

    pub fn percentiles(&self, ps: &[f64]) -> Vec<f64> {
        ps.iter().map(|&p| self.percentile(p)).collect()
    }
}

/// Distribution of integer observations.
#[derive(Debug)]
pub struct Histogram {
    sample: UniformSample,
}

impl Histogram {
    pub fn new(capacity: usize) -> Self {
        Self {
            sample: UniformSample::new(capacity),
        }
    }

    pub fn update(&self, v: i64) {
        self.sample.update(v);
    }

    pub fn clear(&self) {
        self.sample.clear();
    }

    pub fn count(&self) -> i64 {
        self.sample.snapshot().count()
    }

    pub fn snapshot(&self) -> SampleSnapshot {
        self.sample.snapshot()
    }
}
