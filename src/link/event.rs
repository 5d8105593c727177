//! Link events.

use crate::io::LinkInfo;
use crate::mission::Waypoint;

/// Connection lifecycle state, as reported in [`LinkEvent::Connection`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport is open and none is being opened.
    Disconnected,
    /// A transport is open (or opening) but no heartbeat has confirmed liveness yet.
    Connecting,
    /// Heartbeats are arriving within the watchdog window.
    Connected,
}

/// Events broadcast to subscribers of [`VehicleLink::events`](crate::link::VehicleLink::events).
#[derive(Clone, Debug)]
pub enum LinkEvent {
    /// The connection lifecycle state changed.
    Connection {
        /// New state.
        state: ConnectionState,
        /// Endpoint the state refers to.
        info: LinkInfo,
    },
    /// The vehicle's stored mission changed: a transfer completed or the mission was cleared.
    MissionUpdated(Vec<Waypoint>),
}
