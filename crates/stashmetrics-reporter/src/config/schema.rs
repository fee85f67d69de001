use std::time::Duration;

use serde::Deserialize;
use stashmetrics_core::error::{Result, StashError};
use stashmetrics_core::{Fields, PercentileSpec};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReporterConfig {
    pub version: u32,

    pub reporter: ReporterSection,
}

impl ReporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(StashError::BadConfig(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.reporter.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReporterSection {
    /// Destination `host:port`.
    pub address: String,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default)]
    pub percentiles: Option<Vec<f64>>,

    #[serde(default)]
    pub defaults: Fields,
}

impl ReporterSection {
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(StashError::BadConfig(
                "reporter.address must not be empty".into(),
            ));
        }
        if !(100..=3_600_000).contains(&self.interval_ms) {
            return Err(StashError::BadConfig(
                "reporter.interval_ms must be between 100 and 3600000".into(),
            ));
        }
        if self.defaults.keys().any(|k| k.is_empty()) {
            return Err(StashError::BadConfig(
                "reporter.defaults must not contain an empty key".into(),
            ));
        }
        self.percentile_spec()?;
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn percentile_spec(&self) -> Result<PercentileSpec> {
        match &self.percentiles {
            Some(ps) => PercentileSpec::new(ps),
            None => Ok(PercentileSpec::default()),
        }
    }
}

fn default_interval_ms() -> u64 {
    10_000
}
