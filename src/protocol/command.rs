//! Command ids, coordinate frames, and result codes.

/// `MAV_CMD` ids this bridge can issue, in missions or as direct commands.
pub mod cmd {
    /// Navigate to waypoint.
    pub const NAV_WAYPOINT: u16 = 16;
    /// Loiter at location indefinitely.
    pub const NAV_LOITER_UNLIM: u16 = 17;
    /// Loiter for a number of turns.
    pub const NAV_LOITER_TURNS: u16 = 18;
    /// Loiter for a number of seconds.
    pub const NAV_LOITER_TIME: u16 = 19;
    /// Return to launch location.
    pub const NAV_RETURN_TO_LAUNCH: u16 = 20;
    /// Land at location.
    pub const NAV_LAND: u16 = 21;
    /// Takeoff to altitude.
    pub const NAV_TAKEOFF: u16 = 22;
    /// Set the home position.
    pub const DO_SET_HOME: u16 = 179;
    /// Pause or continue the current mission.
    pub const DO_PAUSE_CONTINUE: u16 = 193;
    /// Point camera or vehicle at a region of interest.
    pub const DO_SET_ROI: u16 = 201;
    /// Control the camera mount/gimbal.
    pub const DO_MOUNT_CONTROL: u16 = 205;
    /// Start the uploaded mission.
    pub const MISSION_START: u16 = 300;
    /// Arm or disarm the vehicle.
    pub const COMPONENT_ARM_DISARM: u16 = 400;
}

/// `MAV_FRAME` coordinate frame numbers used by this bridge.
pub mod frame_kind {
    /// Global latitude/longitude with altitude above mean sea level.
    pub const GLOBAL: u8 = 0;
    /// Global latitude/longitude with altitude relative to home.
    pub const GLOBAL_RELATIVE_ALT: u8 = 3;
    /// Scaled-integer global frame, altitude above mean sea level.
    pub const GLOBAL_INT: u8 = 5;
    /// Scaled-integer global frame, altitude relative to home.
    pub const GLOBAL_RELATIVE_ALT_INT: u8 = 6;
}

/// `MAV_DATA_STREAM` ids for [`RequestDataStream`](crate::protocol::RequestDataStream).
pub mod stream {
    /// All data streams.
    pub const ALL: u8 = 0;
}

/// Magic value in `param2` of COMPONENT_ARM_DISARM that forces disarm regardless of state.
pub const FORCE_DISARM_MAGIC: f32 = 21196.0;

/// `MAV_MOUNT_MODE_MAVLINK_TARGETING` for DO_MOUNT_CONTROL `param7`.
pub const MOUNT_MODE_MAVLINK_TARGETING: f32 = 2.0;

/// `MAV_RESULT`: vehicle's verdict on a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MavResult {
    /// Command accepted and executed.
    Accepted,
    /// Command valid but cannot be executed right now.
    TemporarilyRejected,
    /// Command invalid in the current state.
    Denied,
    /// Command not supported.
    Unsupported,
    /// Command valid but execution failed.
    Failed,
    /// Command accepted, execution in progress.
    InProgress,
    /// Command cancelled.
    Cancelled,
    /// Result code outside the known set.
    Other(u8),
}

impl MavResult {
    /// Decodes the wire result code.
    pub fn from_wire(value: u8) -> Self {
        match value {
            0 => MavResult::Accepted,
            1 => MavResult::TemporarilyRejected,
            2 => MavResult::Denied,
            3 => MavResult::Unsupported,
            4 => MavResult::Failed,
            5 => MavResult::InProgress,
            6 => MavResult::Cancelled,
            other => MavResult::Other(other),
        }
    }
}

/// `MAV_MISSION_RESULT`: vehicle's verdict on a mission transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissionResult {
    /// Mission accepted.
    Accepted,
    /// Generic error.
    Error,
    /// Coordinate frame not supported.
    UnsupportedFrame,
    /// Command not supported.
    Unsupported,
    /// Mission exceeds storage space.
    NoSpace,
    /// One of the parameters has an invalid value.
    Invalid,
    /// Received item out of sequence.
    InvalidSequence,
    /// Mission rejected, vehicle is denying uploads.
    Denied,
    /// Transfer cancelled.
    OperationCancelled,
    /// Result code outside the known set.
    Other(u8),
}

impl MissionResult {
    /// Decodes the wire result code.
    pub fn from_wire(value: u8) -> Self {
        match value {
            0 => MissionResult::Accepted,
            1 => MissionResult::Error,
            2 => MissionResult::UnsupportedFrame,
            3 => MissionResult::Unsupported,
            4 => MissionResult::NoSpace,
            5 => MissionResult::Invalid,
            13 => MissionResult::InvalidSequence,
            14 => MissionResult::Denied,
            15 => MissionResult::OperationCancelled,
            other => MissionResult::Other(other),
        }
    }

    /// Wire code for this result.
    pub fn to_wire(self) -> u8 {
        match self {
            MissionResult::Accepted => 0,
            MissionResult::Error => 1,
            MissionResult::UnsupportedFrame => 2,
            MissionResult::Unsupported => 3,
            MissionResult::NoSpace => 4,
            MissionResult::Invalid => 5,
            MissionResult::InvalidSequence => 13,
            MissionResult::Denied => 14,
            MissionResult::OperationCancelled => 15,
            MissionResult::Other(other) => other,
        }
    }
}

#[cfg(test)]
mod test_command {
    use super::*;

    #[test]
    fn mav_result_decodes_known_and_unknown_codes() {
        assert_eq!(MavResult::from_wire(0), MavResult::Accepted);
        assert_eq!(MavResult::from_wire(2), MavResult::Denied);
        assert_eq!(MavResult::from_wire(42), MavResult::Other(42));
    }

    #[test]
    fn mission_result_round_trips() {
        for code in [0, 1, 2, 3, 4, 5, 13, 14, 15, 99] {
            assert_eq!(MissionResult::from_wire(code).to_wire(), code);
        }
    }
}
