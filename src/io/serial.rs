//! Serial port transport.

use async_trait::async_trait;
use tokio_serial::SerialPortBuilderExt;

use crate::consts::DEFAULT_SERIAL_BAUD_RATE;
use crate::errors::Result;
use crate::io::{LinkDetails, LinkInfo, Transport, TransportChannel};

/// Serial port transport (USB telemetry radios, FTDI adapters).
#[derive(Clone, Debug)]
pub struct SerialTransport {
    path: String,
    baud_rate: u32,
}

impl SerialTransport {
    /// Creates a transport for the port at `path` with the default telemetry baud rate.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud_rate: DEFAULT_SERIAL_BAUD_RATE,
        }
    }

    /// Sets a non-default baud rate.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }
}

#[async_trait]
impl Transport for SerialTransport {
    fn info(&self) -> LinkInfo {
        LinkInfo::new(LinkDetails::Serial {
            path: self.path.clone(),
            baud_rate: self.baud_rate,
        })
    }

    async fn open(&self) -> Result<TransportChannel> {
        let port = tokio_serial::new(&self.path, self.baud_rate)
            .open_native_async()
            .map_err(std::io::Error::from)?;
        let (reader, writer) = tokio::io::split(port);
        Ok(TransportChannel {
            reader: Box::new(reader),
            writer: Box::new(writer),
        })
    }
}
