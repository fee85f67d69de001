//! Percentile points reported for histograms and timers.

use crate::error::{Result, StashError};

/// Points used unless the caller overrides them.
pub const DEFAULT_PERCENTILES: [f64; 5] = [0.50, 0.75, 0.95, 0.99, 0.999];

/// Ordered percentile fractions and the key suffix derived from each.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileSpec {
    points: Vec<(f64, String)>,
}

impl PercentileSpec {
    /// Every fraction must lie in `[0, 1]` and map to a distinct suffix.
    pub fn new(fractions: &[f64]) -> Result<Self> {
        let mut points = Vec::with_capacity(fractions.len());
        for &p in fractions {
            if !(0.0..=1.0).contains(&p) {
                return Err(StashError::BadConfig(format!(
                    "percentile {p} must be between 0 and 1"
                )));
            }
            let suffix = suffix_for(p);
            if points.iter().any(|(_, s)| *s == suffix) {
                return Err(StashError::BadConfig(format!(
                    "percentile {p} collides with another point on key suffix {suffix}"
                )));
            }
            points.push((p, suffix));
        }
        Ok(Self { points })
    }

    pub fn fractions(&self) -> Vec<f64> {
        self.points.iter().map(|(p, _)| *p).collect()
    }

    /// `(fraction, suffix)` pairs, e.g. `(0.999, "p99_9")`.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &str)> {
        self.points.iter().map(|(p, s)| (*p, s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Default for PercentileSpec {
    fn default() -> Self {
        Self {
            points: DEFAULT_PERCENTILES
                .iter()
                .map(|&p| (p, suffix_for(p)))
                .collect(),
        }
    }
}

/// `0.5 -> "p50"`, `0.999 -> "p99_9"`.
///
/// The percentage is rounded to four decimals first so float noise such as
/// `99.89999999999999` never leaks into a key.
pub fn suffix_for(fraction: f64) -> String {
    let pct = (fraction * 100.0 * 10_000.0).round() / 10_000.0;
    format!("p{pct}").replace('.', "_")
}
