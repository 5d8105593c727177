//! # Transports
//!
//! Byte-stream transports the link runs over. A [`Transport`] knows how to open itself into a
//! [`TransportChannel`] (a split reader/writer pair); the connection supervisor opens it on
//! connect and again on every reconnection attempt, so implementations must support repeated
//! opening.

mod mem;
mod serial;
mod tcp;

pub use mem::MemoryTransport;
pub use serial::SerialTransport;
pub use tcp::TcpTransport;

use std::fmt::{Debug, Formatter};
use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::errors::Result;

/// Information about a transport endpoint.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, PartialEq, Eq)]
pub struct LinkInfo {
    details: LinkDetails,
}

/// Endpoint-specific transport details.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkDetails {
    /// Serial port.
    Serial {
        /// Port path.
        path: String,
        /// Baud rate.
        baud_rate: u32,
    },
    /// TCP client.
    Tcp {
        /// Remote address.
        remote_addr: SocketAddr,
    },
    /// In-process pipe, used in tests and simulators.
    Memory,
}

impl LinkInfo {
    pub(crate) fn new(details: LinkDetails) -> Self {
        Self { details }
    }

    /// Endpoint-specific details.
    pub fn details(&self) -> &LinkDetails {
        &self.details
    }
}

impl Debug for LinkInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.details.fmt(f)
    }
}

/// An open byte stream, split into its read and write halves.
pub struct TransportChannel {
    /// Inbound byte stream.
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
    /// Outbound byte stream.
    pub writer: Box<dyn AsyncWrite + Send + Unpin>,
}

/// A way to reach the vehicle.
///
/// Implementations are factories, not live connections: [`open`](Transport::open) may be
/// called repeatedly, once per (re)connection attempt.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Endpoint description used in log records and connection events.
    fn info(&self) -> LinkInfo;

    /// Opens the transport into a live byte stream.
    async fn open(&self) -> Result<TransportChannel>;
}
