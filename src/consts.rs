//! # Common constants

use std::time::Duration;

/// Default heartbeat watchdog window.
///
/// The link is considered lost when no heartbeat has been observed for this long.
pub const DEFAULT_HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(3);

/// Default interval between reconnection attempts.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(5);

/// Default maximum number of consecutive reconnection attempts.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: usize = 30;

/// Default per-attempt command acknowledgement timeout.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(1500);

/// Default number of command retransmissions before giving up.
pub const DEFAULT_COMMAND_RETRIES: u8 = 3;

/// Default per-item mission transfer timeout.
pub const DEFAULT_MISSION_ITEM_TIMEOUT: Duration = Duration::from_millis(1500);

/// Default number of mission item re-requests before giving up.
pub const DEFAULT_MISSION_RETRIES: u8 = 3;

/// Default serial link bit rate.
pub const DEFAULT_SERIAL_BAUD_RATE: u32 = 57600;

/// Default telemetry stream rate requested from the vehicle.
pub const DEFAULT_STREAM_RATE_HZ: u16 = 4;

/// Default system `ID` of this ground station.
pub const DEFAULT_SYSTEM_ID: u8 = 255;

/// Default component `ID` of this ground station.
pub const DEFAULT_COMPONENT_ID: u8 = 190;

/// Default system `ID` of the vehicle.
pub const DEFAULT_TARGET_SYSTEM: u8 = 1;

/// Default component `ID` of the vehicle autopilot.
pub const DEFAULT_TARGET_COMPONENT: u8 = 1;

pub(crate) const WORKER_TICK_INTERVAL: Duration = Duration::from_millis(50);

pub(crate) const TRANSPORT_OPEN_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) const EVENT_CHAN_CAPACITY: usize = 128;
pub(crate) const INBOUND_CHAN_CAPACITY: usize = 1024;
pub(crate) const OUTGOING_CHAN_CAPACITY: usize = 1024;

pub(crate) const READ_BUF_SIZE: usize = 4096;
