//! In-process transport over a duplex pipe.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::DuplexStream;

use crate::errors::{Error, Result};
use crate::io::{LinkDetails, LinkInfo, Transport, TransportChannel};

const PIPE_CAPACITY: usize = 64 * 1024;

/// In-process transport backed by [`tokio::io::duplex`] pipes.
///
/// Each [`open`](Transport::open) consumes one pre-fed pipe, so reconnection behavior is
/// testable: feed one pipe and the second open attempt fails, feed two and it succeeds.
/// Dropping a peer half closes the corresponding link.
#[derive(Clone)]
pub struct MemoryTransport {
    pipes: Arc<Mutex<VecDeque<DuplexStream>>>,
}

impl MemoryTransport {
    /// Creates a transport with no pipes; [`feed`](Self::feed) before opening.
    pub fn new() -> Self {
        Self {
            pipes: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Queues one more openable pipe and returns its peer half.
    pub fn feed(&self) -> DuplexStream {
        let (local, peer) = tokio::io::duplex(PIPE_CAPACITY);
        match self.pipes.lock() {
            Ok(mut pipes) => pipes.push_back(local),
            Err(poisoned) => poisoned.into_inner().push_back(local),
        }
        peer
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn info(&self) -> LinkInfo {
        LinkInfo::new(LinkDetails::Memory)
    }

    async fn open(&self) -> Result<TransportChannel> {
        let pipe = {
            let mut pipes = match self.pipes.lock() {
                Ok(pipes) => pipes,
                Err(poisoned) => poisoned.into_inner(),
            };
            pipes.pop_front()
        };
        let Some(pipe) = pipe else {
            return Err(Error::Transport(Arc::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "no pipe available",
            ))));
        };
        let (reader, writer) = tokio::io::split(pipe);
        Ok(TransportChannel {
            reader: Box::new(reader),
            writer: Box::new(writer),
        })
    }
}
