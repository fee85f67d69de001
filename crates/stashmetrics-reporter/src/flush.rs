//! Scheduled flush loop.
//!
//! One long-lived task flushes on every tick of a fixed interval. A flush
//! runs to completion before the next tick is taken; ticks missed while a
//! slow flush was in progress are skipped, not queued.
//!
//! Nothing that happens inside a flush may leave the loop: returned errors
//! are logged, and panics raised by collaborators (metric sources,
//! transports) are caught at the tick boundary, logged as
//! `UnexpectedFault`, and the loop keeps ticking.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use stashmetrics_core::error::{ErrorKind, StashError};
use stashmetrics_core::metrics::Counter;

use crate::reporter::Reporter;

/// Result of a single scheduled flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Sent,
    Failed(ErrorKind),
}

pub struct FlushLoop {
    reporter: Reporter,
    interval: Duration,
    ticks: Option<Arc<Counter>>,
}

impl FlushLoop {
    pub fn new(reporter: Reporter, interval: Duration) -> Self {
        Self {
            reporter,
            interval,
            ticks: None,
        }
    }

    /// Count every tick, successful or not, on `counter`.
    pub fn with_tick_counter(mut self, counter: Arc<Counter>) -> Self {
        self.ticks = Some(counter);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one flush with full fault isolation.
    pub async fn tick(&self) -> TickOutcome {
        if let Some(ticks) = &self.ticks {
            ticks.inc(1);
        }
        let res = AssertUnwindSafe(self.reporter.flush_once())
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(StashError::UnexpectedFault(panic_message(&*panic))));

        match res {
            Ok(()) => TickOutcome::Sent,
            Err(e @ StashError::UnexpectedFault(_)) => {
                tracing::error!(error = %e, code = e.kind().as_str(), "flush fault recovered");
                TickOutcome::Failed(e.kind())
            }
            Err(e) => {
                tracing::warn!(error = %e, code = e.kind().as_str(), "flush failed");
                TickOutcome::Failed(e.kind())
            }
        }
    }

    /// Flush forever, first flush one interval after start.
    pub async fn run(self) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(interval_ms = self.interval.as_millis() as u64, "flush loop started");
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
