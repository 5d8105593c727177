//! # Command dispatch
//!
//! Builders that turn operator intents into wire messages, and the tracker that correlates
//! COMMAND_LONG transmissions with their COMMAND_ACK responses.
//!
//! Acknowledgements carry the command id, not a sequence number, so correlation is keyed by
//! command id and at most one command per id may be in flight. Unacknowledged commands are
//! retransmitted with an incremented `confirmation` field and fail with
//! [`Error::Timeout`](crate::errors::Error::Timeout) once the retry budget is spent.

mod tracker;

pub(crate) use tracker::CommandTracker;

use crate::protocol::{
    cmd, frame_kind, stream, CommandLong, Message, RequestDataStream, SetMode,
    SetPositionTargetGlobalInt, FORCE_DISARM_MAGIC, MOUNT_MODE_MAVLINK_TARGETING,
    MAV_MODE_FLAG_CUSTOM_MODE_ENABLED,
};

/// Position-only type mask for guided go-to: ignore velocity, acceleration, yaw, and yaw rate.
const POSITION_TARGET_TYPE_MASK: u16 = 0x0DF8;

fn command(id: u16, target_system: u8, target_component: u8) -> CommandLong {
    CommandLong {
        command: id,
        target_system,
        target_component,
        ..Default::default()
    }
}

/// COMPONENT_ARM_DISARM. `force` bypasses the vehicle's safety checks on disarm.
pub fn arm_disarm(arm: bool, force: bool, target_system: u8, target_component: u8) -> CommandLong {
    CommandLong {
        param1: if arm { 1.0 } else { 0.0 },
        param2: if force { FORCE_DISARM_MAGIC } else { 0.0 },
        ..command(cmd::COMPONENT_ARM_DISARM, target_system, target_component)
    }
}

/// NAV_TAKEOFF to `altitude` meters above home.
pub fn takeoff(altitude: f32, target_system: u8, target_component: u8) -> CommandLong {
    CommandLong {
        param7: altitude,
        ..command(cmd::NAV_TAKEOFF, target_system, target_component)
    }
}

/// NAV_RETURN_TO_LAUNCH.
pub fn return_to_launch(target_system: u8, target_component: u8) -> CommandLong {
    command(cmd::NAV_RETURN_TO_LAUNCH, target_system, target_component)
}

/// NAV_LAND at the current position.
pub fn land(target_system: u8, target_component: u8) -> CommandLong {
    command(cmd::NAV_LAND, target_system, target_component)
}

/// NAV_LOITER_UNLIM: hold at a position until commanded otherwise. Zero coordinates mean
/// the current position.
pub fn loiter_unlimited(
    lat: f64,
    lon: f64,
    alt: f32,
    target_system: u8,
    target_component: u8,
) -> CommandLong {
    CommandLong {
        param5: lat as f32,
        param6: lon as f32,
        param7: alt,
        ..command(cmd::NAV_LOITER_UNLIM, target_system, target_component)
    }
}

/// NAV_LOITER_TIME: hold at a position for `seconds`.
pub fn loiter_time(
    seconds: f32,
    lat: f64,
    lon: f64,
    alt: f32,
    target_system: u8,
    target_component: u8,
) -> CommandLong {
    CommandLong {
        param1: seconds,
        param5: lat as f32,
        param6: lon as f32,
        param7: alt,
        ..command(cmd::NAV_LOITER_TIME, target_system, target_component)
    }
}

/// DO_SET_HOME at an explicit position; pass `use_current` to take the present position instead.
pub fn set_home(
    use_current: bool,
    lat: f64,
    lon: f64,
    alt: f32,
    target_system: u8,
    target_component: u8,
) -> CommandLong {
    CommandLong {
        param1: if use_current { 1.0 } else { 0.0 },
        param5: lat as f32,
        param6: lon as f32,
        param7: alt,
        ..command(cmd::DO_SET_HOME, target_system, target_component)
    }
}

/// DO_SET_ROI: aim the camera at a ground point.
pub fn set_roi(lat: f64, lon: f64, alt: f32, target_system: u8, target_component: u8) -> CommandLong {
    CommandLong {
        param5: lat as f32,
        param6: lon as f32,
        param7: alt,
        ..command(cmd::DO_SET_ROI, target_system, target_component)
    }
}

/// DO_MOUNT_CONTROL: point the gimbal. Angles in degrees.
pub fn control_gimbal(
    pitch: f32,
    yaw: f32,
    roll: f32,
    target_system: u8,
    target_component: u8,
) -> CommandLong {
    CommandLong {
        param1: pitch,
        param2: roll,
        param3: yaw,
        param7: MOUNT_MODE_MAVLINK_TARGETING,
        ..command(cmd::DO_MOUNT_CONTROL, target_system, target_component)
    }
}

/// MISSION_START: begin executing the stored mission from the first item.
pub fn start_mission(target_system: u8, target_component: u8) -> CommandLong {
    command(cmd::MISSION_START, target_system, target_component)
}

/// DO_PAUSE_CONTINUE: `hold == true` pauses the mission in place, `false` resumes it.
pub fn pause_continue(hold: bool, target_system: u8, target_component: u8) -> CommandLong {
    CommandLong {
        param1: if hold { 0.0 } else { 1.0 },
        ..command(cmd::DO_PAUSE_CONTINUE, target_system, target_component)
    }
}

/// SET_MODE with the custom-mode flag set.
///
/// Mode changes carry no acknowledgement; the switch is confirmed by the next heartbeat.
pub fn set_mode(custom_mode: u32, target_system: u8) -> Message {
    Message::SetMode(SetMode {
        custom_mode,
        target_system,
        base_mode: MAV_MODE_FLAG_CUSTOM_MODE_ENABLED,
    })
}

/// SET_POSITION_TARGET_GLOBAL_INT: guided-mode go-to at `alt` meters above home.
///
/// Position-only: velocity, acceleration, and yaw fields are masked out.
pub fn goto_position(
    lat: f64,
    lon: f64,
    alt: f32,
    target_system: u8,
    target_component: u8,
) -> Message {
    Message::SetPositionTargetGlobalInt(SetPositionTargetGlobalInt {
        lat_int: (lat * 1e7) as i32,
        lon_int: (lon * 1e7) as i32,
        alt,
        type_mask: POSITION_TARGET_TYPE_MASK,
        target_system,
        target_component,
        coordinate_frame: frame_kind::GLOBAL_RELATIVE_ALT_INT,
        ..Default::default()
    })
}

/// REQUEST_DATA_STREAM: ask the vehicle to stream all telemetry at `rate_hz`.
pub fn request_all_streams(rate_hz: u16, target_system: u8, target_component: u8) -> Message {
    Message::RequestDataStream(RequestDataStream {
        req_message_rate: rate_hz,
        target_system,
        target_component,
        req_stream_id: stream::ALL,
        start_stop: 1,
    })
}
