//! Reporter: builds one snapshot from a metric source and ships it.

use std::sync::Arc;

use stashmetrics_core::builder::build_snapshot;
use stashmetrics_core::error::Result;
use stashmetrics_core::{Fields, MetricSource, PercentileSpec};

use crate::transport::{Transport, UdpTransport};

/// `{"client": label}`: the usual identifying default field.
pub fn client_defaults(label: &str) -> Fields {
    let mut f = Fields::new();
    f.insert("client".to_string(), label.into());
    f
}

pub struct Reporter {
    source: Arc<dyn MetricSource>,
    transport: Box<dyn Transport>,
    defaults: Fields,
    percentiles: PercentileSpec,
}

impl Reporter {
    /// Connect a UDP transport to `addr` and report `source` through it.
    ///
    /// Fails with `Resolution` or `Connect`; construction is never retried.
    pub async fn connect(
        source: Arc<dyn MetricSource>,
        addr: &str,
        defaults: Option<Fields>,
    ) -> Result<Self> {
        let transport = UdpTransport::connect(addr).await?;
        tracing::info!(peer = %transport.peer(), "reporter connected");
        Ok(Self::with_transport(source, Box::new(transport), defaults))
    }

    pub fn with_transport(
        source: Arc<dyn MetricSource>,
        transport: Box<dyn Transport>,
        defaults: Option<Fields>,
    ) -> Self {
        Self {
            source,
            transport,
            defaults: defaults.unwrap_or_default(),
            percentiles: PercentileSpec::default(),
        }
    }

    pub fn with_percentiles(mut self, percentiles: PercentileSpec) -> Self {
        self.percentiles = percentiles;
        self
    }

    pub fn defaults(&self) -> &Fields {
        &self.defaults
    }

    pub fn percentiles(&self) -> &PercentileSpec {
        &self.percentiles
    }

    /// Build, serialize, and write one snapshot. Errors go to the caller.
    pub async fn flush_once(&self) -> Result<()> {
        let snap = build_snapshot(self.source.as_ref(), &self.defaults, &self.percentiles);
        let fields = snap.len();
        let payload = snap.serialize()?;
        let bytes = payload.len();
        self.transport.write(payload).await?;
        tracing::trace!(fields, bytes, "snapshot flushed");
        Ok(())
    }

    pub fn close(&mut self) {
        self.transport.close();
    }
}
