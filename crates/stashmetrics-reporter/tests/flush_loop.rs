//! Scheduled loop resilience: write failures and collaborator panics must not
//! stop the loop.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout, Instant};

use stashmetrics_core::error::{ErrorKind, Result, StashError};
use stashmetrics_core::{MetricSource, MetricState, Registry};
use stashmetrics_reporter::{FlushLoop, Reporter, TickOutcome, Transport};

/// Fails the first `failures` writes, then forwards payloads to a channel.
struct FlakyTransport {
    failures: usize,
    writes: AtomicUsize,
    tx: mpsc::UnboundedSender<Bytes>,
}

#[async_trait]
impl Transport for FlakyTransport {
    async fn write(&self, payload: Bytes) -> Result<()> {
        let n = self.writes.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            return Err(StashError::TransportWrite("destination unreachable".into()));
        }
        self.tx
            .send(payload)
            .map_err(|_| StashError::TransportWrite("receiver gone".into()))
    }

    fn close(&mut self) {}
}

struct PanickingTransport;

#[async_trait]
impl Transport for PanickingTransport {
    async fn write(&self, _payload: Bytes) -> Result<()> {
        panic!("transport exploded");
    }

    fn close(&mut self) {}
}

/// Records when each write starts; the first write takes `first_write`.
struct SlowFirstTransport {
    started: Instant,
    first_write: Duration,
    writes: AtomicUsize,
    tx: mpsc::UnboundedSender<u128>,
}

#[async_trait]
impl Transport for SlowFirstTransport {
    async fn write(&self, _payload: Bytes) -> Result<()> {
        let _ = self.tx.send(self.started.elapsed().as_millis());
        if self.writes.fetch_add(1, Ordering::SeqCst) == 0 {
            sleep(self.first_write).await;
        }
        Ok(())
    }

    fn close(&mut self) {}
}

/// Panics during the first `panics` enumerations.
struct PanickySource {
    panics: usize,
    calls: AtomicUsize,
}

impl MetricSource for PanickySource {
    fn each(&self, f: &mut dyn FnMut(&str, MetricState)) {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.panics {
            panic!("registry poisoned");
        }
        f("calls", MetricState::Counter(n as i64));
    }
}

fn flaky(failures: usize) -> (Box<FlakyTransport>, mpsc::UnboundedReceiver<Bytes>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let t = FlakyTransport {
        failures,
        writes: AtomicUsize::new(0),
        tx,
    };
    (Box::new(t), rx)
}

async fn next_payload(rx: &mut mpsc::UnboundedReceiver<Bytes>) -> Value {
    let bytes = timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("loop stopped flushing")
        .expect("channel closed");
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn tick_reports_write_failure_then_recovers() {
    let registry = Arc::new(Registry::new());
    registry.get_or_register_counter("c").unwrap().inc(1);
    let (transport, mut rx) = flaky(1);
    let flush = FlushLoop::new(
        Reporter::with_transport(registry, transport, None),
        Duration::from_secs(60),
    );

    assert_eq!(flush.tick().await, TickOutcome::Failed(ErrorKind::TransportWrite));
    assert_eq!(flush.tick().await, TickOutcome::Sent);
    assert_eq!(next_payload(&mut rx).await, json!({"c.count": 1}));
}

#[tokio::test]
async fn tick_converts_panic_into_fault() {
    let registry = Arc::new(Registry::new());
    let flush = FlushLoop::new(
        Reporter::with_transport(registry, Box::new(PanickingTransport), None),
        Duration::from_secs(60),
    );

    assert_eq!(flush.tick().await, TickOutcome::Failed(ErrorKind::UnexpectedFault));
    assert_eq!(flush.tick().await, TickOutcome::Failed(ErrorKind::UnexpectedFault));
}

#[tokio::test]
async fn loop_survives_source_panic() {
    let source = Arc::new(PanickySource {
        panics: 1,
        calls: AtomicUsize::new(0),
    });
    let (transport, mut rx) = flaky(0);
    let reporter = Reporter::with_transport(source.clone(), transport, None);
    let handle = FlushLoop::new(reporter, Duration::from_millis(20)).spawn();

    let got = next_payload(&mut rx).await;
    assert_eq!(got, json!({"calls.count": 1}));
    assert!(!handle.is_finished());
    assert!(source.calls.load(Ordering::SeqCst) >= 2);

    handle.abort();
}

#[tokio::test]
async fn loop_keeps_ticking_after_write_failures() {
    let registry = Arc::new(Registry::new());
    let counter = registry.get_or_register_counter("ticks").unwrap();
    counter.inc(3);
    let (transport, mut rx) = flaky(2);
    let reporter = Reporter::with_transport(registry, transport, None);
    let handle = FlushLoop::new(reporter, Duration::from_millis(20)).spawn();

    assert_eq!(next_payload(&mut rx).await, json!({"ticks.count": 3}));
    counter.inc(1);

    // Counters are never reset between flushes.
    let mut latest = next_payload(&mut rx).await;
    while latest != json!({"ticks.count": 4}) {
        assert_eq!(latest, json!({"ticks.count": 3}));
        latest = next_payload(&mut rx).await;
    }

    handle.abort();
}

#[tokio::test]
async fn tick_counter_counts_every_tick() {
    let registry = Arc::new(Registry::new());
    let ticks = registry.get_or_register_counter("reporter.flush_ticks").unwrap();
    let (transport, mut rx) = flaky(1);
    let flush = FlushLoop::new(
        Reporter::with_transport(registry, transport, None),
        Duration::from_secs(60),
    )
    .with_tick_counter(ticks.clone());

    assert_eq!(flush.tick().await, TickOutcome::Failed(ErrorKind::TransportWrite));
    assert_eq!(flush.tick().await, TickOutcome::Sent);
    assert_eq!(ticks.count(), 2);
    assert_eq!(next_payload(&mut rx).await, json!({"reporter.flush_ticks.count": 2}));
}

#[tokio::test(start_paused = true)]
async fn overrun_ticks_are_skipped() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let transport = SlowFirstTransport {
        started: Instant::now(),
        first_write: Duration::from_millis(350),
        writes: AtomicUsize::new(0),
        tx,
    };
    let reporter = Reporter::with_transport(Arc::new(Registry::new()), Box::new(transport), None);
    let handle = FlushLoop::new(reporter, Duration::from_millis(100)).spawn();

    sleep(Duration::from_millis(720)).await;
    handle.abort();

    let mut starts = Vec::new();
    while let Ok(ms) = rx.try_recv() {
        starts.push(ms);
    }
    // The ticks due at 200, 300 and 400 collapse into one late flush at 450,
    // then the schedule realigns to the original 100 ms grid.
    assert_eq!(starts, vec![100, 450, 500, 600, 700]);
}
