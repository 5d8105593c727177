//! # Wire protocol
//!
//! MAVLink 1 framing, checksums, and the message set this bridge speaks.
//!
//! The codec converts an unbounded byte stream into discrete [`Message`]s and back, tolerating
//! partial reads and transmission noise. A corrupted frame costs exactly itself: the decoder
//! discards one byte and resumes scanning, so the next well-formed frame still decodes.

mod command;
pub mod crc;
mod frame;
mod messages;
pub mod mode;

pub use command::{cmd, frame_kind, stream, MavResult, MissionResult, FORCE_DISARM_MAGIC, MOUNT_MODE_MAVLINK_TARGETING};
pub use frame::{FrameDecoder, FrameEncoder, RawFrame, CHECKSUM_LEN, HEADER_LEN, STX};
pub use messages::{
    Attitude, CommandAck, CommandLong, GlobalPositionInt, GpsRawInt, Heartbeat, Message,
    MissionAck, MissionClearAll, MissionCount, MissionCurrent, MissionItemInt, MissionRequest,
    MissionRequestInt, MissionRequestList, PayloadError, RcChannels, RequestDataStream, SetMode,
    SetPositionTargetGlobalInt, SysStatus, VfrHud, MAV_MODE_FLAG_CUSTOM_MODE_ENABLED,
    MAV_MODE_FLAG_SAFETY_ARMED,
};
