//! # Basic imports
//!
//! Commonly used types re-exported for convenience.

pub use crate::errors::{Error, Result};
pub use crate::io::{LinkInfo, MemoryTransport, SerialTransport, TcpTransport, Transport};
pub use crate::link::{ConnectionState, LinkConfig, LinkEvent, VehicleLink};
pub use crate::mission::{MissionPlan, Waypoint};
pub use crate::protocol::Message;
pub use crate::telemetry::VehicleState;
