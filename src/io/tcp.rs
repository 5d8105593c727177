//! TCP client transport.

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::net::TcpStream;

use crate::errors::Result;
use crate::io::{LinkDetails, LinkInfo, Transport, TransportChannel};

/// TCP client transport (SITL simulators, network bridges).
#[derive(Clone, Debug)]
pub struct TcpTransport {
    remote_addr: SocketAddr,
}

impl TcpTransport {
    /// Creates a transport that connects to `remote_addr`.
    pub fn new(remote_addr: SocketAddr) -> Self {
        Self { remote_addr }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    fn info(&self) -> LinkInfo {
        LinkInfo::new(LinkDetails::Tcp {
            remote_addr: self.remote_addr,
        })
    }

    async fn open(&self) -> Result<TransportChannel> {
        let stream = TcpStream::connect(self.remote_addr).await?;
        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();
        Ok(TransportChannel {
            reader: Box::new(reader),
            writer: Box::new(writer),
        })
    }
}
