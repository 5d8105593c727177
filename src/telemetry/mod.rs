//! # Vehicle state
//!
//! The canonical telemetry snapshot and the reducer that folds decoded messages into it.
//!
//! [`VehicleState`] has exactly one writer — the [`TelemetryAggregator`](reducer::TelemetryAggregator)
//! inside the link worker — and any number of readers via immutable copies delivered through a
//! [`watch`](tokio::sync::watch) subscription.

mod reducer;

pub(crate) use reducer::TelemetryAggregator;

use std::time::SystemTime;

/// Battery status in display units.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Battery {
    /// Voltage in volts.
    pub voltage: f32,
    /// Current in amperes.
    pub current: f32,
    /// Remaining energy in percent, -1 if unestimated.
    pub percentage: f32,
}

/// GNSS receiver status.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Gps {
    /// Fix type (0-1: no fix, 2: 2D, 3: 3D, higher: augmented).
    pub fix_type: u8,
    /// Number of visible satellites.
    pub satellites: u8,
    /// Horizontal dilution of position in meters.
    pub hdop: f32,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl Default for Gps {
    fn default() -> Self {
        Self {
            fix_type: 0,
            satellites: 0,
            hdop: 99.99,
            lat: 0.0,
            lon: 0.0,
        }
    }
}

/// Fused global position.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Position {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Altitude above mean sea level in meters.
    pub alt_amsl: f32,
    /// Altitude above home in meters.
    pub alt_rel: f32,
    /// Heading in degrees.
    pub heading: f32,
}

/// Velocity components in meters per second.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Velocity {
    /// Horizontal ground speed.
    pub ground_speed: f32,
    /// Airspeed.
    pub air_speed: f32,
    /// Vertical speed, positive up.
    pub vertical_speed: f32,
}

/// Attitude angles in degrees.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attitude {
    /// Roll angle.
    pub roll: f32,
    /// Pitch angle.
    pub pitch: f32,
    /// Yaw angle.
    pub yaw: f32,
}

/// RC receiver status.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rc {
    /// Receive signal strength, 255 if unknown.
    pub rssi: u8,
    /// Raw values of up to eight channels, in microseconds.
    pub channels: Vec<u16>,
}

/// Autopilot system status.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct System {
    /// Mainloop load in percent.
    pub load: f32,
    /// Communication error count.
    pub errors: u16,
}

/// Mission execution progress.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MissionProgress {
    /// Sequence number of the active waypoint.
    pub current_wp: u16,
    /// Number of waypoints in the stored mission, as last transferred.
    pub total_wp: u16,
}

/// Canonical vehicle-state snapshot.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleState {
    /// `true` while a heartbeat has been observed within the watchdog window.
    pub connected: bool,
    /// `true` when the safety-armed flag is set.
    pub armed: bool,
    /// Flight mode display name, `UNKNOWN(n)` for unrecognized modes.
    pub mode: String,
    /// Battery status.
    pub battery: Battery,
    /// GNSS status.
    pub gps: Gps,
    /// Fused position.
    pub position: Position,
    /// Velocity components.
    pub velocity: Velocity,
    /// Attitude angles.
    pub attitude: Attitude,
    /// RC receiver status.
    pub rc: Rc,
    /// Autopilot system status.
    pub system: System,
    /// Mission progress.
    pub mission: MissionProgress,
    /// Wall-clock time of the last heartbeat, if any.
    pub last_heartbeat: Option<SystemTime>,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            connected: false,
            armed: false,
            mode: "UNKNOWN".to_string(),
            battery: Battery::default(),
            gps: Gps::default(),
            position: Position::default(),
            velocity: Velocity::default(),
            attitude: Attitude::default(),
            rc: Rc::default(),
            system: System::default(),
            mission: MissionProgress::default(),
            last_heartbeat: None,
        }
    }
}
