//! # Missions
//!
//! Waypoints, the locally edited [`MissionPlan`], and the wire transfer state machine.
//!
//! The transfer protocol is a strict request/response handshake. Download: request the list,
//! receive the count, request each item, acknowledge. Upload: announce the count, answer each
//! item request, await the final acknowledgement. At most one session is live at a time; a
//! concurrent operation is rejected with [`Busy`](crate::errors::Error::Busy).

mod session;

pub(crate) use session::{MissionSession, SessionStep, TransferDirection};

use crate::errors::{Error, Result};
use crate::protocol::MissionItemInt;

/// One mission item.
///
/// `seq == 0` is the home position: it is carried in transfers like any other item but is
/// immutable and non-deletable at the planning layer.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Waypoint {
    /// Unique 0-based sequence number; ordering is sequence order.
    pub seq: u16,
    /// Coordinate frame (`MAV_FRAME`).
    pub frame: u8,
    /// Scheduled action (`MAV_CMD`).
    pub command: u16,
    /// 1 when this is the active item.
    pub current: u8,
    /// Autocontinue to the next item.
    pub autocontinue: u8,
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
}

impl Waypoint {
    /// Plain navigation waypoint at a global position with altitude relative to home.
    pub fn nav(seq: u16, lat: f64, lon: f64, alt: f32) -> Self {
        Self {
            seq,
            frame: crate::protocol::frame_kind::GLOBAL_RELATIVE_ALT_INT,
            command: crate::protocol::cmd::NAV_WAYPOINT,
            autocontinue: 1,
            x: (lat * 1e7) as i32,
            y: (lon * 1e7) as i32,
            z: alt,
            ..Default::default()
        }
    }

    pub(crate) fn from_item(item: &MissionItemInt) -> Self {
        Self {
            seq: item.seq,
            frame: item.frame,
            command: item.command,
            current: item.current,
            autocontinue: item.autocontinue,
            param1: item.param1,
            param2: item.param2,
            param3: item.param3,
            param4: item.param4,
            x: item.x,
            y: item.y,
            z: item.z,
        }
    }

    pub(crate) fn to_item(&self, target_system: u8, target_component: u8) -> MissionItemInt {
        MissionItemInt {
            param1: self.param1,
            param2: self.param2,
            param3: self.param3,
            param4: self.param4,
            x: self.x,
            y: self.y,
            z: self.z,
            seq: self.seq,
            command: self.command,
            target_system,
            target_component,
            frame: self.frame,
            current: self.current,
            autocontinue: self.autocontinue,
        }
    }
}

/// Validates that waypoint sequence numbers are contiguous from zero and unique.
pub(crate) fn validate_sequence(waypoints: &[Waypoint]) -> Result<()> {
    for (index, waypoint) in waypoints.iter().enumerate() {
        if waypoint.seq as usize != index {
            return Err(Error::InvalidMission(format!(
                "waypoint at index {index} has sequence number {}, expected {index}",
                waypoint.seq
            )));
        }
    }
    Ok(())
}

/// Locally edited, ordered waypoint list.
///
/// Keeps sequence numbers contiguous and unique on every edit. The home item (`seq == 0`)
/// cannot be removed; such requests are rejected here, before any wire activity.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MissionPlan {
    waypoints: Vec<Waypoint>,
}

impl MissionPlan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a plan from an existing list, validating sequence contiguity.
    pub fn from_waypoints(waypoints: Vec<Waypoint>) -> Result<Self> {
        validate_sequence(&waypoints)?;
        Ok(Self { waypoints })
    }

    /// Read-only view of the waypoints in sequence order.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Number of waypoints in the plan.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// `true` when the plan holds no waypoints.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Appends a waypoint, assigning the next sequence number.
    pub fn push(&mut self, mut waypoint: Waypoint) {
        waypoint.seq = self.waypoints.len() as u16;
        self.waypoints.push(waypoint);
    }

    /// Removes the waypoint with the given sequence number and renumbers the rest.
    ///
    /// Removing the home position (`seq == 0`) is rejected.
    pub fn remove(&mut self, seq: u16) -> Result<Waypoint> {
        if seq == 0 {
            return Err(Error::InvalidMission(
                "home position (seq 0) cannot be removed".to_string(),
            ));
        }
        let index = seq as usize;
        if index >= self.waypoints.len() {
            return Err(Error::InvalidMission(format!(
                "no waypoint with sequence number {seq}"
            )));
        }
        let removed = self.waypoints.remove(index);
        self.renumber();
        Ok(removed)
    }

    fn renumber(&mut self) {
        for (index, waypoint) in self.waypoints.iter_mut().enumerate() {
            waypoint.seq = index as u16;
        }
    }
}

#[cfg(test)]
mod test_plan {
    use super::*;

    fn plan_with(count: usize) -> MissionPlan {
        let mut plan = MissionPlan::new();
        for i in 0..count {
            plan.push(Waypoint::nav(0, 40.0 + i as f64, -74.0, 25.0));
        }
        plan
    }

    #[test]
    fn push_assigns_contiguous_sequence_numbers() {
        let plan = plan_with(4);
        let seqs: Vec<u16> = plan.waypoints().iter().map(|w| w.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2, 3]);
    }

    #[test]
    fn removing_home_is_rejected() {
        let mut plan = plan_with(3);
        let err = plan.remove(0).unwrap_err();
        assert!(matches!(err, Error::InvalidMission(_)));
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn remove_renumbers_remaining_waypoints() {
        let mut plan = plan_with(4);
        let removed = plan.remove(2).unwrap();
        assert_eq!(removed.seq, 2);
        let seqs: Vec<u16> = plan.waypoints().iter().map(|w| w.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    #[test]
    fn from_waypoints_rejects_gaps() {
        let mut waypoints = vec![Waypoint::nav(0, 40.0, -74.0, 10.0)];
        waypoints.push(Waypoint::nav(2, 41.0, -74.0, 10.0));
        assert!(matches!(
            MissionPlan::from_waypoints(waypoints),
            Err(Error::InvalidMission(_))
        ));
    }
}
