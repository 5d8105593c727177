//! Typed message set and payload serialization.
//!
//! Payload fields are serialized in MAVLink order (sorted by decreasing field size, declaration
//! order within a size class), little-endian throughout. Each struct lists its fields in wire
//! order so the serializers stay mechanical.

use std::fmt;

/// `MAV_MODE_FLAG_SAFETY_ARMED`: the vehicle reports armed when this bit is set in `base_mode`.
pub const MAV_MODE_FLAG_SAFETY_ARMED: u8 = 128;

/// `MAV_MODE_FLAG_CUSTOM_MODE_ENABLED`: `custom_mode` carries the autopilot-specific mode.
pub const MAV_MODE_FLAG_CUSTOM_MODE_ENABLED: u8 = 1;

/// Payload could not be decoded as the claimed message kind.
///
/// This is a local decoder condition, handled like a corrupted frame; it never surfaces through
/// the public API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayloadError {
    /// Message `ID` the frame claimed.
    pub id: u8,
    /// Payload length the message kind requires.
    pub expected: usize,
    /// Payload length actually received.
    pub actual: usize,
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "message {} expects a {}-byte payload, got {}",
            self.id, self.expected, self.actual
        )
    }
}

impl std::error::Error for PayloadError {}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn u8(&mut self) -> u8 {
        let v = self.buf[self.pos];
        self.pos += 1;
        v
    }

    fn i8(&mut self) -> i8 {
        self.u8() as i8
    }

    fn u16(&mut self) -> u16 {
        let v = u16::from_le_bytes([self.buf[self.pos], self.buf[self.pos + 1]]);
        self.pos += 2;
        v
    }

    fn i16(&mut self) -> i16 {
        self.u16() as i16
    }

    fn u32(&mut self) -> u32 {
        let v = u32::from_le_bytes([
            self.buf[self.pos],
            self.buf[self.pos + 1],
            self.buf[self.pos + 2],
            self.buf[self.pos + 3],
        ]);
        self.pos += 4;
        v
    }

    fn i32(&mut self) -> i32 {
        self.u32() as i32
    }

    fn u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.buf[self.pos..self.pos + 8]);
        self.pos += 8;
        u64::from_le_bytes(bytes)
    }

    fn f32(&mut self) -> f32 {
        f32::from_bits(self.u32())
    }
}

#[derive(Default)]
struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn i8(&mut self, v: i8) {
        self.u8(v as u8);
    }

    fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn f32(&mut self, v: f32) {
        self.u32(v.to_bits());
    }
}

/// HEARTBEAT (0): periodic liveness message.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Heartbeat {
    /// Autopilot-specific mode.
    pub custom_mode: u32,
    /// Vehicle or component type (`MAV_TYPE`).
    pub type_: u8,
    /// Autopilot kind (`MAV_AUTOPILOT`).
    pub autopilot: u8,
    /// System mode bitmap (`MAV_MODE_FLAG`).
    pub base_mode: u8,
    /// System status (`MAV_STATE`).
    pub system_status: u8,
    /// MAVLink version.
    pub mavlink_version: u8,
}

/// SYS_STATUS (1): onboard status, battery, and error counters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SysStatus {
    /// Sensors present bitmap.
    pub sensors_present: u32,
    /// Sensors enabled bitmap.
    pub sensors_enabled: u32,
    /// Sensors health bitmap.
    pub sensors_health: u32,
    /// Mainloop load in tenths of a percent.
    pub load: u16,
    /// Battery voltage in millivolts.
    pub voltage_battery: u16,
    /// Battery current in centiamperes, -1 if unmeasured.
    pub current_battery: i16,
    /// Communication drop rate in hundredths of a percent.
    pub drop_rate_comm: u16,
    /// Communication error count.
    pub errors_comm: u16,
    /// Autopilot-specific error count 1.
    pub errors_count1: u16,
    /// Autopilot-specific error count 2.
    pub errors_count2: u16,
    /// Autopilot-specific error count 3.
    pub errors_count3: u16,
    /// Autopilot-specific error count 4.
    pub errors_count4: u16,
    /// Remaining battery energy in percent, -1 if unestimated.
    pub battery_remaining: i8,
}

/// SET_MODE (11): dedicated mode-change request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetMode {
    /// Autopilot-specific mode number.
    pub custom_mode: u32,
    /// Target system `ID`.
    pub target_system: u8,
    /// New base mode bitmap.
    pub base_mode: u8,
}

/// GPS_RAW_INT (24): raw GNSS fix.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GpsRawInt {
    /// Timestamp in microseconds.
    pub time_usec: u64,
    /// Latitude in degrees * 1e7.
    pub lat: i32,
    /// Longitude in degrees * 1e7.
    pub lon: i32,
    /// Altitude (MSL) in millimeters.
    pub alt: i32,
    /// Horizontal dilution of position in centimeters.
    pub eph: u16,
    /// Vertical dilution of position in centimeters.
    pub epv: u16,
    /// Ground speed in centimeters per second.
    pub vel: u16,
    /// Course over ground in centidegrees.
    pub cog: u16,
    /// GNSS fix type.
    pub fix_type: u8,
    /// Number of visible satellites.
    pub satellites_visible: u8,
}

/// ATTITUDE (30): attitude in radians.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attitude {
    /// Timestamp in milliseconds since boot.
    pub time_boot_ms: u32,
    /// Roll angle in radians.
    pub roll: f32,
    /// Pitch angle in radians.
    pub pitch: f32,
    /// Yaw angle in radians.
    pub yaw: f32,
    /// Roll rate in radians per second.
    pub rollspeed: f32,
    /// Pitch rate in radians per second.
    pub pitchspeed: f32,
    /// Yaw rate in radians per second.
    pub yawspeed: f32,
}

/// GLOBAL_POSITION_INT (33): fused global position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlobalPositionInt {
    /// Timestamp in milliseconds since boot.
    pub time_boot_ms: u32,
    /// Latitude in degrees * 1e7.
    pub lat: i32,
    /// Longitude in degrees * 1e7.
    pub lon: i32,
    /// Altitude (MSL) in millimeters.
    pub alt: i32,
    /// Altitude above home in millimeters.
    pub relative_alt: i32,
    /// Ground speed X (North) in centimeters per second.
    pub vx: i16,
    /// Ground speed Y (East) in centimeters per second.
    pub vy: i16,
    /// Ground speed Z (Down) in centimeters per second.
    pub vz: i16,
    /// Heading in centidegrees, `u16::MAX` if unknown.
    pub hdg: u16,
}

/// MISSION_REQUEST (40): vehicle asks for a mission item during upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MissionRequest {
    /// Requested waypoint sequence number.
    pub seq: u16,
    /// Target system `ID`.
    pub target_system: u8,
    /// Target component `ID`.
    pub target_component: u8,
}

/// MISSION_CURRENT (42): currently active mission item.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MissionCurrent {
    /// Active waypoint sequence number.
    pub seq: u16,
}

/// MISSION_REQUEST_LIST (43): request the mission item count.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MissionRequestList {
    /// Target system `ID`.
    pub target_system: u8,
    /// Target component `ID`.
    pub target_component: u8,
}

/// MISSION_COUNT (44): number of items in the mission about to be transferred.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MissionCount {
    /// Item count.
    pub count: u16,
    /// Target system `ID`.
    pub target_system: u8,
    /// Target component `ID`.
    pub target_component: u8,
}

/// MISSION_CLEAR_ALL (45): delete all mission items.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MissionClearAll {
    /// Target system `ID`.
    pub target_system: u8,
    /// Target component `ID`.
    pub target_component: u8,
}

/// MISSION_ACK (47): final acknowledgement of a mission transfer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MissionAck {
    /// Target system `ID`.
    pub target_system: u8,
    /// Target component `ID`.
    pub target_component: u8,
    /// Result code (`MAV_MISSION_RESULT`).
    pub result: u8,
}

/// MISSION_REQUEST_INT (51): item request with integer-position items.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MissionRequestInt {
    /// Requested waypoint sequence number.
    pub seq: u16,
    /// Target system `ID`.
    pub target_system: u8,
    /// Target component `ID`.
    pub target_component: u8,
}

/// RC_CHANNELS (65): RC receiver channel values.
#[derive(Clone, Debug, PartialEq)]
pub struct RcChannels {
    /// Timestamp in milliseconds since boot.
    pub time_boot_ms: u32,
    /// Raw channel values in microseconds, `u16::MAX` when unset.
    pub channels: [u16; 18],
    /// Number of valid channels.
    pub chancount: u8,
    /// Receive signal strength, 255 if unknown.
    pub rssi: u8,
}

impl Default for RcChannels {
    fn default() -> Self {
        Self {
            time_boot_ms: 0,
            channels: [0; 18],
            chancount: 0,
            rssi: 0,
        }
    }
}

/// REQUEST_DATA_STREAM (66): ask the vehicle to start or stop a telemetry stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestDataStream {
    /// Requested rate in hertz.
    pub req_message_rate: u16,
    /// Target system `ID`.
    pub target_system: u8,
    /// Target component `ID`.
    pub target_component: u8,
    /// Stream `ID` (`MAV_DATA_STREAM`).
    pub req_stream_id: u8,
    /// 1 to start, 0 to stop.
    pub start_stop: u8,
}

/// MISSION_ITEM_INT (73): one mission item with scaled-integer position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MissionItemInt {
    /// Command-specific parameter 1.
    pub param1: f32,
    /// Command-specific parameter 2.
    pub param2: f32,
    /// Command-specific parameter 3.
    pub param3: f32,
    /// Command-specific parameter 4.
    pub param4: f32,
    /// Latitude in degrees * 1e7 (for global frames).
    pub x: i32,
    /// Longitude in degrees * 1e7 (for global frames).
    pub y: i32,
    /// Altitude in meters.
    pub z: f32,
    /// Waypoint sequence number.
    pub seq: u16,
    /// Scheduled action (`MAV_CMD`).
    pub command: u16,
    /// Target system `ID`.
    pub target_system: u8,
    /// Target component `ID`.
    pub target_component: u8,
    /// Coordinate frame (`MAV_FRAME`).
    pub frame: u8,
    /// 1 when this is the active item.
    pub current: u8,
    /// Autocontinue to the next item.
    pub autocontinue: u8,
}

/// VFR_HUD (74): head-up display metrics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VfrHud {
    /// Airspeed in meters per second.
    pub airspeed: f32,
    /// Ground speed in meters per second.
    pub groundspeed: f32,
    /// Altitude (MSL) in meters.
    pub alt: f32,
    /// Climb rate in meters per second.
    pub climb: f32,
    /// Heading in degrees.
    pub heading: i16,
    /// Throttle in percent.
    pub throttle: u16,
}

/// COMMAND_LONG (76): generic command with up to seven parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandLong {
    /// Parameter 1.
    pub param1: f32,
    /// Parameter 2.
    pub param2: f32,
    /// Parameter 3.
    pub param3: f32,
    /// Parameter 4.
    pub param4: f32,
    /// Parameter 5.
    pub param5: f32,
    /// Parameter 6.
    pub param6: f32,
    /// Parameter 7.
    pub param7: f32,
    /// Command `ID` (`MAV_CMD`).
    pub command: u16,
    /// Target system `ID`.
    pub target_system: u8,
    /// Target component `ID`.
    pub target_component: u8,
    /// Zero for the first transmission, incremented on each retransmission.
    pub confirmation: u8,
}

/// COMMAND_ACK (77): acknowledgement of a [`CommandLong`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandAck {
    /// Command `ID` being acknowledged.
    pub command: u16,
    /// Result code (`MAV_RESULT`).
    pub result: u8,
}

/// SET_POSITION_TARGET_GLOBAL_INT (86): guided-mode destination target.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetPositionTargetGlobalInt {
    /// Timestamp in milliseconds since boot.
    pub time_boot_ms: u32,
    /// Latitude in degrees * 1e7.
    pub lat_int: i32,
    /// Longitude in degrees * 1e7.
    pub lon_int: i32,
    /// Altitude in meters.
    pub alt: f32,
    /// Target velocity X in meters per second.
    pub vx: f32,
    /// Target velocity Y in meters per second.
    pub vy: f32,
    /// Target velocity Z in meters per second.
    pub vz: f32,
    /// Target acceleration X.
    pub afx: f32,
    /// Target acceleration Y.
    pub afy: f32,
    /// Target acceleration Z.
    pub afz: f32,
    /// Target yaw in radians.
    pub yaw: f32,
    /// Target yaw rate in radians per second.
    pub yaw_rate: f32,
    /// Bitmap of dimensions to ignore.
    pub type_mask: u16,
    /// Target system `ID`.
    pub target_system: u8,
    /// Target component `ID`.
    pub target_component: u8,
    /// Coordinate frame (`MAV_FRAME`).
    pub coordinate_frame: u8,
}

/// Tagged union over the message kinds this bridge understands.
///
/// Unknown kinds are preserved as [`Message::Unknown`] with the raw payload, never dropped
/// silently, but ignored by the telemetry reducer.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    /// HEARTBEAT (0).
    Heartbeat(Heartbeat),
    /// SYS_STATUS (1).
    SysStatus(SysStatus),
    /// SET_MODE (11).
    SetMode(SetMode),
    /// GPS_RAW_INT (24).
    GpsRawInt(GpsRawInt),
    /// ATTITUDE (30).
    Attitude(Attitude),
    /// GLOBAL_POSITION_INT (33).
    GlobalPositionInt(GlobalPositionInt),
    /// MISSION_REQUEST (40).
    MissionRequest(MissionRequest),
    /// MISSION_CURRENT (42).
    MissionCurrent(MissionCurrent),
    /// MISSION_REQUEST_LIST (43).
    MissionRequestList(MissionRequestList),
    /// MISSION_COUNT (44).
    MissionCount(MissionCount),
    /// MISSION_CLEAR_ALL (45).
    MissionClearAll(MissionClearAll),
    /// MISSION_ACK (47).
    MissionAck(MissionAck),
    /// MISSION_REQUEST_INT (51).
    MissionRequestInt(MissionRequestInt),
    /// RC_CHANNELS (65).
    RcChannels(RcChannels),
    /// REQUEST_DATA_STREAM (66).
    RequestDataStream(RequestDataStream),
    /// MISSION_ITEM_INT (73).
    MissionItemInt(MissionItemInt),
    /// VFR_HUD (74).
    VfrHud(VfrHud),
    /// COMMAND_LONG (76).
    CommandLong(CommandLong),
    /// COMMAND_ACK (77).
    CommandAck(CommandAck),
    /// SET_POSITION_TARGET_GLOBAL_INT (86).
    SetPositionTargetGlobalInt(SetPositionTargetGlobalInt),
    /// Any message kind outside the supported set, payload preserved verbatim.
    Unknown {
        /// Message `ID`.
        id: u8,
        /// Raw payload bytes.
        payload: Vec<u8>,
    },
}

impl Message {
    /// Message `ID` as it appears in the frame header.
    pub fn id(&self) -> u8 {
        match self {
            Message::Heartbeat(_) => 0,
            Message::SysStatus(_) => 1,
            Message::SetMode(_) => 11,
            Message::GpsRawInt(_) => 24,
            Message::Attitude(_) => 30,
            Message::GlobalPositionInt(_) => 33,
            Message::MissionRequest(_) => 40,
            Message::MissionCurrent(_) => 42,
            Message::MissionRequestList(_) => 43,
            Message::MissionCount(_) => 44,
            Message::MissionClearAll(_) => 45,
            Message::MissionAck(_) => 47,
            Message::MissionRequestInt(_) => 51,
            Message::RcChannels(_) => 65,
            Message::RequestDataStream(_) => 66,
            Message::MissionItemInt(_) => 73,
            Message::VfrHud(_) => 74,
            Message::CommandLong(_) => 76,
            Message::CommandAck(_) => 77,
            Message::SetPositionTargetGlobalInt(_) => 86,
            Message::Unknown { id, .. } => *id,
        }
    }

    /// Wire payload length of a message kind, or `None` for unsupported ids.
    pub fn payload_len(id: u8) -> Option<usize> {
        Some(match id {
            0 => 9,
            1 => 31,
            11 => 6,
            24 => 30,
            30 => 28,
            33 => 28,
            40 => 4,
            42 => 2,
            43 => 2,
            44 => 4,
            45 => 2,
            47 => 3,
            51 => 4,
            65 => 42,
            66 => 6,
            73 => 37,
            74 => 20,
            76 => 33,
            77 => 3,
            86 => 53,
            _ => return None,
        })
    }

    /// Decodes a payload into a typed message.
    ///
    /// Unsupported ids yield [`Message::Unknown`]. A supported id with the wrong payload length
    /// is a [`PayloadError`], handled by the caller like any other corrupted frame.
    pub fn decode(id: u8, payload: &[u8]) -> Result<Message, PayloadError> {
        let expected = match Self::payload_len(id) {
            Some(len) => len,
            None => {
                return Ok(Message::Unknown {
                    id,
                    payload: payload.to_vec(),
                })
            }
        };
        if payload.len() != expected {
            return Err(PayloadError {
                id,
                expected,
                actual: payload.len(),
            });
        }

        let mut r = Reader::new(payload);
        Ok(match id {
            0 => Message::Heartbeat(Heartbeat {
                custom_mode: r.u32(),
                type_: r.u8(),
                autopilot: r.u8(),
                base_mode: r.u8(),
                system_status: r.u8(),
                mavlink_version: r.u8(),
            }),
            1 => Message::SysStatus(SysStatus {
                sensors_present: r.u32(),
                sensors_enabled: r.u32(),
                sensors_health: r.u32(),
                load: r.u16(),
                voltage_battery: r.u16(),
                current_battery: r.i16(),
                drop_rate_comm: r.u16(),
                errors_comm: r.u16(),
                errors_count1: r.u16(),
                errors_count2: r.u16(),
                errors_count3: r.u16(),
                errors_count4: r.u16(),
                battery_remaining: r.i8(),
            }),
            11 => Message::SetMode(SetMode {
                custom_mode: r.u32(),
                target_system: r.u8(),
                base_mode: r.u8(),
            }),
            24 => Message::GpsRawInt(GpsRawInt {
                time_usec: r.u64(),
                lat: r.i32(),
                lon: r.i32(),
                alt: r.i32(),
                eph: r.u16(),
                epv: r.u16(),
                vel: r.u16(),
                cog: r.u16(),
                fix_type: r.u8(),
                satellites_visible: r.u8(),
            }),
            30 => Message::Attitude(Attitude {
                time_boot_ms: r.u32(),
                roll: r.f32(),
                pitch: r.f32(),
                yaw: r.f32(),
                rollspeed: r.f32(),
                pitchspeed: r.f32(),
                yawspeed: r.f32(),
            }),
            33 => Message::GlobalPositionInt(GlobalPositionInt {
                time_boot_ms: r.u32(),
                lat: r.i32(),
                lon: r.i32(),
                alt: r.i32(),
                relative_alt: r.i32(),
                vx: r.i16(),
                vy: r.i16(),
                vz: r.i16(),
                hdg: r.u16(),
            }),
            40 => Message::MissionRequest(MissionRequest {
                seq: r.u16(),
                target_system: r.u8(),
                target_component: r.u8(),
            }),
            42 => Message::MissionCurrent(MissionCurrent { seq: r.u16() }),
            43 => Message::MissionRequestList(MissionRequestList {
                target_system: r.u8(),
                target_component: r.u8(),
            }),
            44 => Message::MissionCount(MissionCount {
                count: r.u16(),
                target_system: r.u8(),
                target_component: r.u8(),
            }),
            45 => Message::MissionClearAll(MissionClearAll {
                target_system: r.u8(),
                target_component: r.u8(),
            }),
            47 => Message::MissionAck(MissionAck {
                target_system: r.u8(),
                target_component: r.u8(),
                result: r.u8(),
            }),
            51 => Message::MissionRequestInt(MissionRequestInt {
                seq: r.u16(),
                target_system: r.u8(),
                target_component: r.u8(),
            }),
            65 => {
                let time_boot_ms = r.u32();
                let mut channels = [0u16; 18];
                for slot in channels.iter_mut() {
                    *slot = r.u16();
                }
                Message::RcChannels(RcChannels {
                    time_boot_ms,
                    channels,
                    chancount: r.u8(),
                    rssi: r.u8(),
                })
            }
            66 => Message::RequestDataStream(RequestDataStream {
                req_message_rate: r.u16(),
                target_system: r.u8(),
                target_component: r.u8(),
                req_stream_id: r.u8(),
                start_stop: r.u8(),
            }),
            73 => Message::MissionItemInt(MissionItemInt {
                param1: r.f32(),
                param2: r.f32(),
                param3: r.f32(),
                param4: r.f32(),
                x: r.i32(),
                y: r.i32(),
                z: r.f32(),
                seq: r.u16(),
                command: r.u16(),
                target_system: r.u8(),
                target_component: r.u8(),
                frame: r.u8(),
                current: r.u8(),
                autocontinue: r.u8(),
            }),
            74 => Message::VfrHud(VfrHud {
                airspeed: r.f32(),
                groundspeed: r.f32(),
                alt: r.f32(),
                climb: r.f32(),
                heading: r.i16(),
                throttle: r.u16(),
            }),
            76 => Message::CommandLong(CommandLong {
                param1: r.f32(),
                param2: r.f32(),
                param3: r.f32(),
                param4: r.f32(),
                param5: r.f32(),
                param6: r.f32(),
                param7: r.f32(),
                command: r.u16(),
                target_system: r.u8(),
                target_component: r.u8(),
                confirmation: r.u8(),
            }),
            77 => Message::CommandAck(CommandAck {
                command: r.u16(),
                result: r.u8(),
            }),
            86 => Message::SetPositionTargetGlobalInt(SetPositionTargetGlobalInt {
                time_boot_ms: r.u32(),
                lat_int: r.i32(),
                lon_int: r.i32(),
                alt: r.f32(),
                vx: r.f32(),
                vy: r.f32(),
                vz: r.f32(),
                afx: r.f32(),
                afy: r.f32(),
                afz: r.f32(),
                yaw: r.f32(),
                yaw_rate: r.f32(),
                type_mask: r.u16(),
                target_system: r.u8(),
                target_component: r.u8(),
                coordinate_frame: r.u8(),
            }),
            _ => unreachable!("payload_len covers all supported ids"),
        })
    }

    /// Serializes the payload in wire order.
    pub fn encode_payload(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::payload_len(self.id()).unwrap_or(0));
        match self {
            Message::Heartbeat(m) => {
                w.u32(m.custom_mode);
                w.u8(m.type_);
                w.u8(m.autopilot);
                w.u8(m.base_mode);
                w.u8(m.system_status);
                w.u8(m.mavlink_version);
            }
            Message::SysStatus(m) => {
                w.u32(m.sensors_present);
                w.u32(m.sensors_enabled);
                w.u32(m.sensors_health);
                w.u16(m.load);
                w.u16(m.voltage_battery);
                w.i16(m.current_battery);
                w.u16(m.drop_rate_comm);
                w.u16(m.errors_comm);
                w.u16(m.errors_count1);
                w.u16(m.errors_count2);
                w.u16(m.errors_count3);
                w.u16(m.errors_count4);
                w.i8(m.battery_remaining);
            }
            Message::SetMode(m) => {
                w.u32(m.custom_mode);
                w.u8(m.target_system);
                w.u8(m.base_mode);
            }
            Message::GpsRawInt(m) => {
                w.u64(m.time_usec);
                w.i32(m.lat);
                w.i32(m.lon);
                w.i32(m.alt);
                w.u16(m.eph);
                w.u16(m.epv);
                w.u16(m.vel);
                w.u16(m.cog);
                w.u8(m.fix_type);
                w.u8(m.satellites_visible);
            }
            Message::Attitude(m) => {
                w.u32(m.time_boot_ms);
                w.f32(m.roll);
                w.f32(m.pitch);
                w.f32(m.yaw);
                w.f32(m.rollspeed);
                w.f32(m.pitchspeed);
                w.f32(m.yawspeed);
            }
            Message::GlobalPositionInt(m) => {
                w.u32(m.time_boot_ms);
                w.i32(m.lat);
                w.i32(m.lon);
                w.i32(m.alt);
                w.i32(m.relative_alt);
                w.i16(m.vx);
                w.i16(m.vy);
                w.i16(m.vz);
                w.u16(m.hdg);
            }
            Message::MissionRequest(m) => {
                w.u16(m.seq);
                w.u8(m.target_system);
                w.u8(m.target_component);
            }
            Message::MissionCurrent(m) => {
                w.u16(m.seq);
            }
            Message::MissionRequestList(m) => {
                w.u8(m.target_system);
                w.u8(m.target_component);
            }
            Message::MissionCount(m) => {
                w.u16(m.count);
                w.u8(m.target_system);
                w.u8(m.target_component);
            }
            Message::MissionClearAll(m) => {
                w.u8(m.target_system);
                w.u8(m.target_component);
            }
            Message::MissionAck(m) => {
                w.u8(m.target_system);
                w.u8(m.target_component);
                w.u8(m.result);
            }
            Message::MissionRequestInt(m) => {
                w.u16(m.seq);
                w.u8(m.target_system);
                w.u8(m.target_component);
            }
            Message::RcChannels(m) => {
                w.u32(m.time_boot_ms);
                for value in m.channels {
                    w.u16(value);
                }
                w.u8(m.chancount);
                w.u8(m.rssi);
            }
            Message::RequestDataStream(m) => {
                w.u16(m.req_message_rate);
                w.u8(m.target_system);
                w.u8(m.target_component);
                w.u8(m.req_stream_id);
                w.u8(m.start_stop);
            }
            Message::MissionItemInt(m) => {
                w.f32(m.param1);
                w.f32(m.param2);
                w.f32(m.param3);
                w.f32(m.param4);
                w.i32(m.x);
                w.i32(m.y);
                w.f32(m.z);
                w.u16(m.seq);
                w.u16(m.command);
                w.u8(m.target_system);
                w.u8(m.target_component);
                w.u8(m.frame);
                w.u8(m.current);
                w.u8(m.autocontinue);
            }
            Message::VfrHud(m) => {
                w.f32(m.airspeed);
                w.f32(m.groundspeed);
                w.f32(m.alt);
                w.f32(m.climb);
                w.i16(m.heading);
                w.u16(m.throttle);
            }
            Message::CommandLong(m) => {
                w.f32(m.param1);
                w.f32(m.param2);
                w.f32(m.param3);
                w.f32(m.param4);
                w.f32(m.param5);
                w.f32(m.param6);
                w.f32(m.param7);
                w.u16(m.command);
                w.u8(m.target_system);
                w.u8(m.target_component);
                w.u8(m.confirmation);
            }
            Message::CommandAck(m) => {
                w.u16(m.command);
                w.u8(m.result);
            }
            Message::SetPositionTargetGlobalInt(m) => {
                w.u32(m.time_boot_ms);
                w.i32(m.lat_int);
                w.i32(m.lon_int);
                w.f32(m.alt);
                w.f32(m.vx);
                w.f32(m.vy);
                w.f32(m.vz);
                w.f32(m.afx);
                w.f32(m.afy);
                w.f32(m.afz);
                w.f32(m.yaw);
                w.f32(m.yaw_rate);
                w.u16(m.type_mask);
                w.u8(m.target_system);
                w.u8(m.target_component);
                w.u8(m.coordinate_frame);
            }
            Message::Unknown { payload, .. } => {
                w.buf.extend_from_slice(payload);
            }
        }
        w.buf
    }
}

#[cfg(test)]
mod test_messages {
    use super::*;

    fn samples() -> Vec<Message> {
        vec![
            Message::Heartbeat(Heartbeat {
                custom_mode: 4,
                type_: 2,
                autopilot: 3,
                base_mode: 0x81,
                system_status: 4,
                mavlink_version: 3,
            }),
            Message::SysStatus(SysStatus {
                sensors_present: 0x0F,
                sensors_enabled: 0x0E,
                sensors_health: 0x0D,
                load: 321,
                voltage_battery: 12600,
                current_battery: 1530,
                drop_rate_comm: 5,
                errors_comm: 2,
                errors_count1: 1,
                errors_count2: 0,
                errors_count3: 0,
                errors_count4: 0,
                battery_remaining: 87,
            }),
            Message::SetMode(SetMode {
                custom_mode: 4,
                target_system: 1,
                base_mode: 1,
            }),
            Message::GpsRawInt(GpsRawInt {
                time_usec: 1_234_567,
                lat: 407128000,
                lon: -740060000,
                alt: 12000,
                eph: 121,
                epv: 150,
                vel: 512,
                cog: 9000,
                fix_type: 3,
                satellites_visible: 11,
            }),
            Message::Attitude(Attitude {
                time_boot_ms: 42,
                roll: 0.1,
                pitch: -0.2,
                yaw: 1.5,
                rollspeed: 0.0,
                pitchspeed: 0.01,
                yawspeed: -0.02,
            }),
            Message::GlobalPositionInt(GlobalPositionInt {
                time_boot_ms: 42,
                lat: 407128000,
                lon: -740060000,
                alt: 55000,
                relative_alt: 50000,
                vx: 300,
                vy: 400,
                vz: -100,
                hdg: 9000,
            }),
            Message::MissionRequest(MissionRequest {
                seq: 3,
                target_system: 255,
                target_component: 190,
            }),
            Message::MissionCurrent(MissionCurrent { seq: 2 }),
            Message::MissionRequestList(MissionRequestList {
                target_system: 1,
                target_component: 1,
            }),
            Message::MissionCount(MissionCount {
                count: 5,
                target_system: 1,
                target_component: 1,
            }),
            Message::MissionClearAll(MissionClearAll {
                target_system: 1,
                target_component: 1,
            }),
            Message::MissionAck(MissionAck {
                target_system: 1,
                target_component: 1,
                result: 0,
            }),
            Message::MissionRequestInt(MissionRequestInt {
                seq: 4,
                target_system: 1,
                target_component: 1,
            }),
            Message::RcChannels(RcChannels {
                time_boot_ms: 42,
                channels: [1500; 18],
                chancount: 8,
                rssi: 201,
            }),
            Message::RequestDataStream(RequestDataStream {
                req_message_rate: 4,
                target_system: 1,
                target_component: 1,
                req_stream_id: 0,
                start_stop: 1,
            }),
            Message::MissionItemInt(MissionItemInt {
                param1: 0.0,
                param2: 2.0,
                param3: 0.0,
                param4: 0.0,
                x: 407128000,
                y: -740060000,
                z: 30.0,
                seq: 1,
                command: 16,
                target_system: 1,
                target_component: 1,
                frame: 6,
                current: 0,
                autocontinue: 1,
            }),
            Message::VfrHud(VfrHud {
                airspeed: 12.5,
                groundspeed: 11.0,
                alt: 50.0,
                climb: -0.5,
                heading: 90,
                throttle: 55,
            }),
            Message::CommandLong(CommandLong {
                param1: 1.0,
                param2: 0.0,
                param3: 0.0,
                param4: 0.0,
                param5: 0.0,
                param6: 0.0,
                param7: 0.0,
                command: 400,
                target_system: 1,
                target_component: 1,
                confirmation: 0,
            }),
            Message::CommandAck(CommandAck {
                command: 400,
                result: 0,
            }),
            Message::SetPositionTargetGlobalInt(SetPositionTargetGlobalInt {
                time_boot_ms: 0,
                lat_int: 407128000,
                lon_int: -740060000,
                alt: 25.0,
                type_mask: 0x0DF8,
                target_system: 1,
                target_component: 1,
                coordinate_frame: 6,
                ..Default::default()
            }),
        ]
    }

    #[test]
    fn decode_inverts_encode_for_every_kind() {
        for message in samples() {
            let payload = message.encode_payload();
            assert_eq!(
                payload.len(),
                Message::payload_len(message.id()).unwrap(),
                "wire length mismatch for id {}",
                message.id()
            );
            let decoded = Message::decode(message.id(), &payload).unwrap();
            assert_eq!(decoded, message, "round trip failed for id {}", message.id());
        }
    }

    #[test]
    fn unsupported_id_decodes_to_unknown() {
        let decoded = Message::decode(150, &[1, 2, 3]).unwrap();
        assert_eq!(
            decoded,
            Message::Unknown {
                id: 150,
                payload: vec![1, 2, 3]
            }
        );
        assert_eq!(decoded.encode_payload(), vec![1, 2, 3]);
    }

    #[test]
    fn wrong_length_is_a_payload_error() {
        let err = Message::decode(0, &[0; 8]).unwrap_err();
        assert_eq!(err.id, 0);
        assert_eq!(err.expected, 9);
        assert_eq!(err.actual, 8);
    }
}
