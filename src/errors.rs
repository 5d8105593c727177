//! # Groundlink errors
//!
//! All fallible operations in this crate return [`Result`] with [`Error`] as the error variant.
//!
//! Frame checksum failures never appear here: they are local to the decoder, which recovers by
//! discarding the corrupted frame and resynchronizing. Transport failures surface to callers only
//! as connection-state changes and drive the reconnection policy.

use std::sync::Arc;

use crate::protocol::{MavResult, MissionResult};

/// Result type returned by Groundlink operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Groundlink error.
#[derive(Clone, Debug, thiserror::Error)]
pub enum Error {
    /// Transport I/O failure.
    ///
    /// Reported to the supervisor, which applies the reconnection policy. Callers observe it
    /// only through connection-state events.
    #[error("transport failure: {0}")]
    Transport(Arc<std::io::Error>),

    /// Operation requires an established connection.
    ///
    /// Returned synchronously, before any wire activity.
    #[error("link is not connected")]
    NotConnected,

    /// No acknowledgement or response arrived within the configured budget, retries included.
    #[error("operation timed out")]
    Timeout,

    /// The wait was cancelled by a disconnect or link shutdown.
    #[error("operation cancelled")]
    Cancelled,

    /// A mission operation was attempted while another one is active.
    #[error("another mission operation is in progress")]
    Busy,

    /// The vehicle sent a response inconsistent with the active session.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// The vehicle rejected a command, carrying the reported reason code.
    #[error("command rejected by vehicle: {0:?}")]
    CommandRejected(MavResult),

    /// The vehicle rejected a mission transfer, carrying the reported reason code.
    #[error("mission transfer rejected by vehicle: {0:?}")]
    MissionRejected(MissionResult),

    /// The requested flight mode name is not in the mode table.
    #[error("unknown flight mode: {0}")]
    UnknownMode(String),

    /// A mission or waypoint failed local validation before any wire activity.
    #[error("invalid mission: {0}")]
    InvalidMission(String),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Transport(Arc::new(value))
    }
}
