//! Transport layer (best-effort datagrams).
//!
//! A transport delivers one encoded snapshot per call. Delivery is
//! fire-and-forget: nothing is retried or buffered, a failed write is simply
//! reported back to the caller.

pub mod udp;

use async_trait::async_trait;
use bytes::Bytes;

use stashmetrics_core::error::Result;

pub use udp::UdpTransport;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one payload as a single message.
    async fn write(&self, payload: Bytes) -> Result<()>;

    /// Release the underlying handle; later writes fail.
    fn close(&mut self);
}
