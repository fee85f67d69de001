//! stashmetrics core: snapshot aggregation for periodic metric flushes.
//!
//! This crate turns a collection of live measurement objects into a flat
//! field set ready to be shipped as one JSON document. It carries no
//! transport or runtime dependencies; the reporter crate owns sockets and
//! scheduling.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. A metrics
//! reporter must never take its host process down, so every fallible path
//! surfaces as `StashError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod builder;
pub mod error;
pub mod metrics;
pub mod percentile;
pub mod snapshot;

/// Shared result type.
pub use error::{ErrorKind, Result, StashError};
pub use metrics::{MetricSource, MetricState, Registry};
pub use percentile::PercentileSpec;
pub use snapshot::{FieldValue, Fields, Snapshot};
