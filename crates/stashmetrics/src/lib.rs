//! Top-level facade crate for stashmetrics.
//!
//! Re-exports the snapshot engine and the reporter so users can depend on a single crate.

pub mod core {
    pub use stashmetrics_core::*;
}

pub mod reporter {
    pub use stashmetrics_reporter::*;
}
