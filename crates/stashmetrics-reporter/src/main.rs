//! stashmetrics reporter
//!
//! Loads `stashmetrics.yaml` (or the path given as the first argument) and
//! flushes process metrics to the configured endpoint until Ctrl-C.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing_subscriber::{fmt, EnvFilter};

use stashmetrics_core::Registry;
use stashmetrics_reporter::{config, FlushLoop, Reporter};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "stashmetrics.yaml".into());
    if let Err(e) = run(&path).await {
        tracing::error!(error = %e, code = e.kind().as_str(), "reporter failed to start");
        std::process::exit(1);
    }
}

async fn run(path: &str) -> stashmetrics_core::Result<()> {
    let cfg = config::load_from_file(path)?;
    let section = cfg.reporter;

    let registry = Arc::new(Registry::new());
    let uptime = registry.get_or_register_gauge_float64("process.uptime_secs")?;
    let flush_ticks = registry.get_or_register_counter("reporter.flush_ticks")?;

    let reporter = Reporter::connect(registry.clone(), &section.address, Some(section.defaults.clone()))
        .await?
        .with_percentiles(section.percentile_spec()?);
    let flusher = FlushLoop::new(reporter, section.interval())
        .with_tick_counter(flush_ticks)
        .spawn();

    let started = Instant::now();
    let uptime_task = tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(1));
        loop {
            tick.tick().await;
            uptime.update(started.elapsed().as_secs_f64());
        }
    });

    tracing::info!(address = %section.address, "stashmetrics-reporter running");
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler failed; stopping");
    }

    uptime_task.abort();
    flusher.abort();
    tracing::info!("stashmetrics-reporter stopped");
    Ok(())
}
