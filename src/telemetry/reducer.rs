//! Telemetry reducer: `state' = reduce(state, message)`.

use std::time::SystemTime;

use crate::protocol::{mode, Message, MAV_MODE_FLAG_SAFETY_ARMED};
use crate::telemetry::VehicleState;

/// Owns the canonical [`VehicleState`] and folds decoded messages into it.
///
/// Only messages carrying telemetry mutate the state; mission-protocol and acknowledgement
/// traffic is a no-op here and handled by the transfer and dispatch layers instead.
#[derive(Debug, Default)]
pub(crate) struct TelemetryAggregator {
    state: VehicleState,
}

impl TelemetryAggregator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn state(&self) -> &VehicleState {
        &self.state
    }

    /// Marks the link live or lost. Driven by the connection supervisor, not by messages.
    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.state.connected = connected;
    }

    /// Records the stored mission size after a completed transfer.
    pub(crate) fn set_mission_total(&mut self, total: u16) {
        self.state.mission.total_wp = total;
    }

    /// Applies one decoded message. Returns `true` when the snapshot changed.
    pub(crate) fn apply(&mut self, message: &Message) -> bool {
        let state = &mut self.state;
        match message {
            Message::Heartbeat(m) => {
                state.connected = true;
                state.last_heartbeat = Some(SystemTime::now());
                state.armed = m.base_mode & MAV_MODE_FLAG_SAFETY_ARMED != 0;
                state.mode = mode::mode_name(m.custom_mode);
            }
            Message::SysStatus(m) => {
                state.battery.voltage = m.voltage_battery as f32 / 1000.0; // mV to V
                state.battery.current = m.current_battery as f32 / 100.0; // cA to A
                state.battery.percentage = m.battery_remaining as f32;
                state.system.load = m.load as f32 / 10.0; // 0.1% units
                state.system.errors = m.errors_comm;
            }
            Message::GlobalPositionInt(m) => {
                state.position.lat = m.lat as f64 / 1e7;
                state.position.lon = m.lon as f64 / 1e7;
                state.position.alt_amsl = m.alt as f32 / 1000.0; // mm to m
                state.position.alt_rel = m.relative_alt as f32 / 1000.0; // mm to m
                state.position.heading = m.hdg as f32 / 100.0; // cdeg to deg

                let vx = m.vx as f32 / 100.0; // cm/s to m/s
                let vy = m.vy as f32 / 100.0;
                state.velocity.ground_speed = (vx * vx + vy * vy).sqrt();
                // NED to positive-up convention.
                state.velocity.vertical_speed = -(m.vz as f32) / 100.0;
            }
            Message::Attitude(m) => {
                state.attitude.roll = m.roll.to_degrees();
                state.attitude.pitch = m.pitch.to_degrees();
                state.attitude.yaw = m.yaw.to_degrees();
            }
            Message::GpsRawInt(m) => {
                state.gps.fix_type = m.fix_type;
                state.gps.satellites = m.satellites_visible;
                state.gps.hdop = m.eph as f32 / 100.0; // cm to m
                state.gps.lat = m.lat as f64 / 1e7;
                state.gps.lon = m.lon as f64 / 1e7;
            }
            Message::VfrHud(m) => {
                state.velocity.air_speed = m.airspeed;
                state.velocity.ground_speed = m.groundspeed;
            }
            Message::RcChannels(m) => {
                state.rc.rssi = m.rssi;
                state.rc.channels = m.channels[..8].to_vec();
            }
            Message::MissionCurrent(m) => {
                state.mission.current_wp = m.seq;
            }
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod test_reducer {
    use super::*;
    use crate::protocol::{
        Attitude, GlobalPositionInt, GpsRawInt, Heartbeat, MissionAck, RcChannels, SysStatus,
        VfrHud,
    };

    #[test]
    fn heartbeat_sets_liveness_arming_and_mode() {
        let mut agg = TelemetryAggregator::new();
        assert!(!agg.state().connected);

        let changed = agg.apply(&Message::Heartbeat(Heartbeat {
            custom_mode: 4,
            base_mode: 0x81,
            ..Default::default()
        }));

        assert!(changed);
        assert!(agg.state().connected);
        assert!(agg.state().armed);
        assert_eq!(agg.state().mode, "GUIDED");
        assert!(agg.state().last_heartbeat.is_some());
    }

    #[test]
    fn unrecognized_mode_renders_as_unknown() {
        let mut agg = TelemetryAggregator::new();
        agg.apply(&Message::Heartbeat(Heartbeat {
            custom_mode: 77,
            ..Default::default()
        }));
        assert_eq!(agg.state().mode, "UNKNOWN(77)");
        assert!(!agg.state().armed);
    }

    #[test]
    fn sys_status_scales_to_display_units() {
        let mut agg = TelemetryAggregator::new();
        agg.apply(&Message::SysStatus(SysStatus {
            voltage_battery: 12600,
            current_battery: 1530,
            battery_remaining: 87,
            load: 345,
            errors_comm: 2,
            ..Default::default()
        }));

        let state = agg.state();
        assert!((state.battery.voltage - 12.6).abs() < 1e-6);
        assert!((state.battery.current - 15.3).abs() < 1e-6);
        assert_eq!(state.battery.percentage, 87.0);
        assert!((state.system.load - 34.5).abs() < 1e-6);
        assert_eq!(state.system.errors, 2);
    }

    #[test]
    fn global_position_example_from_new_york() {
        let mut agg = TelemetryAggregator::new();
        agg.apply(&Message::GlobalPositionInt(GlobalPositionInt {
            lat: 407128000,
            lon: -740060000,
            relative_alt: 50000,
            hdg: 9000,
            ..Default::default()
        }));

        let position = &agg.state().position;
        assert!((position.lat - 40.7128).abs() < 1e-9);
        assert!((position.lon - -74.0060).abs() < 1e-9);
        assert!((position.alt_rel - 50.0).abs() < 1e-6);
        assert!((position.heading - 90.0).abs() < 1e-6);
    }

    #[test]
    fn ground_speed_is_planar_magnitude_and_sink_positive_up() {
        let mut agg = TelemetryAggregator::new();
        agg.apply(&Message::GlobalPositionInt(GlobalPositionInt {
            vx: 300,
            vy: 400,
            vz: 150,
            ..Default::default()
        }));

        let velocity = &agg.state().velocity;
        assert!((velocity.ground_speed - 5.0).abs() < 1e-6);
        assert!((velocity.vertical_speed - -1.5).abs() < 1e-6);
    }

    #[test]
    fn attitude_converts_radians_to_degrees() {
        let mut agg = TelemetryAggregator::new();
        agg.apply(&Message::Attitude(Attitude {
            roll: std::f32::consts::FRAC_PI_2,
            pitch: -std::f32::consts::FRAC_PI_4,
            yaw: std::f32::consts::PI,
            ..Default::default()
        }));

        let attitude = &agg.state().attitude;
        assert!((attitude.roll - 90.0).abs() < 1e-3);
        assert!((attitude.pitch - -45.0).abs() < 1e-3);
        assert!((attitude.yaw - 180.0).abs() < 1e-3);
    }

    #[test]
    fn gps_raw_scales_hdop() {
        let mut agg = TelemetryAggregator::new();
        agg.apply(&Message::GpsRawInt(GpsRawInt {
            fix_type: 3,
            satellites_visible: 11,
            eph: 121,
            lat: 407128000,
            lon: -740060000,
            ..Default::default()
        }));

        let gps = &agg.state().gps;
        assert_eq!(gps.fix_type, 3);
        assert_eq!(gps.satellites, 11);
        assert!((gps.hdop - 1.21).abs() < 1e-6);
    }

    #[test]
    fn vfr_hud_overrides_ground_speed() {
        let mut agg = TelemetryAggregator::new();
        agg.apply(&Message::VfrHud(VfrHud {
            airspeed: 12.5,
            groundspeed: 11.0,
            ..Default::default()
        }));
        assert_eq!(agg.state().velocity.air_speed, 12.5);
        assert_eq!(agg.state().velocity.ground_speed, 11.0);
    }

    #[test]
    fn rc_keeps_first_eight_channels() {
        let mut agg = TelemetryAggregator::new();
        let mut channels = [0u16; 18];
        for (i, slot) in channels.iter_mut().enumerate() {
            *slot = 1000 + i as u16;
        }
        agg.apply(&Message::RcChannels(RcChannels {
            channels,
            rssi: 201,
            ..Default::default()
        }));

        assert_eq!(agg.state().rc.rssi, 201);
        assert_eq!(agg.state().rc.channels.len(), 8);
        assert_eq!(agg.state().rc.channels[7], 1007);
    }

    #[test]
    fn non_telemetry_messages_are_no_ops() {
        let mut agg = TelemetryAggregator::new();
        let before = agg.state().clone();

        assert!(!agg.apply(&Message::MissionAck(MissionAck::default())));
        assert!(!agg.apply(&Message::Unknown {
            id: 150,
            payload: vec![1, 2, 3]
        }));
        assert_eq!(agg.state(), &before);
    }
}
