//! stashmetrics reporter library entry.
//!
//! This crate wires a metric source, the snapshot builder, and a datagram
//! transport into a periodic reporter. It is consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod config;
pub mod flush;
pub mod reporter;
pub mod transport;

pub use flush::{FlushLoop, TickOutcome};
pub use reporter::{client_defaults, Reporter};
pub use transport::{Transport, UdpTransport};
