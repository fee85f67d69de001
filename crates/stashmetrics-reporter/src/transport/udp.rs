//! Connected UDP socket transport.

use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::net::{lookup_host, UdpSocket};

use stashmetrics_core::error::{Result, StashError};

use super::Transport;

#[derive(Debug)]
pub struct UdpTransport {
    peer: SocketAddr,
    socket: Option<UdpSocket>,
}

impl UdpTransport {
    /// Resolve `addr` (`host:port`) and connect an ephemeral local socket to it.
    ///
    /// IPv4 destinations are preferred when the name resolves to both families.
    pub async fn connect(addr: &str) -> Result<Self> {
        let peer = resolve(addr).await?;

        let local: SocketAddr = if peer.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|e| StashError::Connect(format!("bind {local} failed: {e}")))?;
        socket
            .connect(peer)
            .await
            .map_err(|e| StashError::Connect(format!("connect {peer} failed: {e}")))?;

        tracing::debug!(%peer, "udp transport connected");
        Ok(Self {
            peer,
            socket: Some(socket),
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn is_closed(&self) -> bool {
        self.socket.is_none()
    }
}

async fn resolve(addr: &str) -> Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = lookup_host(addr)
        .await
        .map_err(|e| StashError::Resolution(format!("{addr}: {e}")))?
        .collect();

    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| StashError::Resolution(format!("{addr}: no addresses")))
}

#[async_trait]
impl Transport for UdpTransport {
    async fn write(&self, payload: Bytes) -> Result<()> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| StashError::TransportWrite("socket closed".into()))?;

        let n = socket
            .send(&payload)
            .await
            .map_err(|e| StashError::TransportWrite(format!("send to {} failed: {e}", self.peer)))?;
        if n != payload.len() {
            return Err(StashError::TransportWrite(format!(
                "short write to {}: {n} of {} bytes",
                self.peer,
                payload.len()
            )));
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.socket.take().is_some() {
            tracing::debug!(peer = %self.peer, "udp transport closed");
        }
    }
}
