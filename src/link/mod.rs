//! # Vehicle link
//!
//! The public handle over one vehicle connection. [`VehicleLink::spawn`] starts a worker task
//! that owns all link state; the handle is a cheap clone that talks to it over channels.
//!
//! Telemetry is exposed as a [`watch`](tokio::sync::watch) subscription holding the latest
//! [`VehicleState`] snapshot, and lifecycle notifications as a
//! [`broadcast`](tokio::sync::broadcast) stream of [`LinkEvent`]s.

mod config;
mod event;
mod worker;

pub use config::LinkConfig;
pub use event::{ConnectionState, LinkEvent};

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::commands;
use crate::consts::EVENT_CHAN_CAPACITY;
use crate::errors::{Error, Result};
use crate::io::Transport;
use crate::link::worker::{Request, Worker};
use crate::mission::Waypoint;
use crate::protocol::mode;
use crate::telemetry::VehicleState;

const REQUEST_CHAN_CAPACITY: usize = 32;

/// Handle to a vehicle connection.
///
/// Cloning is cheap and every clone addresses the same link. The background worker stops once
/// the last handle is dropped.
#[derive(Clone)]
pub struct VehicleLink {
    config: LinkConfig,
    requests: mpsc::Sender<Request>,
    telemetry: watch::Receiver<VehicleState>,
    events: broadcast::Sender<LinkEvent>,
}

impl VehicleLink {
    /// Spawns the link worker over `transport`.
    ///
    /// No I/O happens until [`connect`](Self::connect) is called.
    pub fn spawn(transport: impl Transport, config: LinkConfig) -> Self {
        let (requests_tx, requests_rx) = mpsc::channel(REQUEST_CHAN_CAPACITY);
        let (telemetry_tx, telemetry_rx) = watch::channel(VehicleState::default());
        let (events_tx, _) = broadcast::channel(EVENT_CHAN_CAPACITY);

        let worker = Worker::new(
            Arc::new(transport),
            config.clone(),
            requests_rx,
            telemetry_tx,
            events_tx.clone(),
        );
        tokio::spawn(worker.run());

        Self {
            config,
            requests: requests_tx,
            telemetry: telemetry_rx,
            events: events_tx,
        }
    }

    /// Opens the transport. Resolves once the byte stream is up; liveness is confirmed
    /// separately by the first heartbeat (see [`events`](Self::events)).
    pub async fn connect(&self) -> Result<()> {
        self.request(|done| Request::Connect { done }).await
    }

    /// Closes the transport and cancels every in-flight command and mission transfer.
    pub async fn disconnect(&self) -> Result<()> {
        self.request(|done| Request::Disconnect { done }).await
    }

    /// Subscription to telemetry snapshots. Holds the latest [`VehicleState`]; await
    /// [`changed`](watch::Receiver::changed) to follow updates.
    pub fn telemetry(&self) -> watch::Receiver<VehicleState> {
        self.telemetry.clone()
    }

    /// The current telemetry snapshot.
    pub fn state(&self) -> VehicleState {
        self.telemetry.borrow().clone()
    }

    /// Subscription to connection and mission lifecycle events.
    pub fn events(&self) -> broadcast::Receiver<LinkEvent> {
        self.events.subscribe()
    }

    /// [`events`](Self::events) as a [`Stream`]. Events missed under lag are skipped.
    pub fn event_stream(&self) -> impl Stream<Item = LinkEvent> {
        BroadcastStream::new(self.events.subscribe()).filter_map(|event| event.ok())
    }

    /// Arms (`true`) or disarms (`false`) the vehicle.
    pub async fn arm_disarm(&self, arm: bool) -> Result<()> {
        self.command(commands::arm_disarm(
            arm,
            false,
            self.config.target_system,
            self.config.target_component,
        ))
        .await
    }

    /// Force-disarms the vehicle immediately, bypassing its safety checks.
    ///
    /// In flight this cuts the motors.
    pub async fn emergency_stop(&self) -> Result<()> {
        self.command(commands::arm_disarm(
            false,
            true,
            self.config.target_system,
            self.config.target_component,
        ))
        .await
    }

    /// Commands a takeoff to `altitude` meters above home.
    pub async fn takeoff(&self, altitude: f32) -> Result<()> {
        self.command(commands::takeoff(
            altitude,
            self.config.target_system,
            self.config.target_component,
        ))
        .await
    }

    /// Commands a landing at the current position.
    pub async fn land(&self) -> Result<()> {
        self.command(commands::land(
            self.config.target_system,
            self.config.target_component,
        ))
        .await
    }

    /// Commands a return to the launch position.
    pub async fn return_to_launch(&self) -> Result<()> {
        self.command(commands::return_to_launch(
            self.config.target_system,
            self.config.target_component,
        ))
        .await
    }

    /// Commands a position hold at a location, `alt` meters above home.
    ///
    /// With a `duration` the vehicle resumes after that many seconds; without one it holds
    /// until commanded otherwise. Zero coordinates mean the current position.
    pub async fn loiter(&self, lat: f64, lon: f64, alt: f32, duration: Option<f32>) -> Result<()> {
        let frame = match duration {
            Some(seconds) => commands::loiter_time(
                seconds,
                lat,
                lon,
                alt,
                self.config.target_system,
                self.config.target_component,
            ),
            None => commands::loiter_unlimited(
                lat,
                lon,
                alt,
                self.config.target_system,
                self.config.target_component,
            ),
        };
        self.command(frame).await
    }

    /// Sets the home position to an explicit location.
    pub async fn set_home(&self, lat: f64, lon: f64, alt: f32) -> Result<()> {
        self.command(commands::set_home(
            false,
            lat,
            lon,
            alt,
            self.config.target_system,
            self.config.target_component,
        ))
        .await
    }

    /// Sets the home position to the vehicle's current location.
    pub async fn set_home_here(&self) -> Result<()> {
        self.command(commands::set_home(
            true,
            0.0,
            0.0,
            0.0,
            self.config.target_system,
            self.config.target_component,
        ))
        .await
    }

    /// Aims the camera at a ground point.
    pub async fn set_roi(&self, lat: f64, lon: f64, alt: f32) -> Result<()> {
        self.command(commands::set_roi(
            lat,
            lon,
            alt,
            self.config.target_system,
            self.config.target_component,
        ))
        .await
    }

    /// Points the gimbal. Angles in degrees; pitch is negative downward.
    pub async fn control_gimbal(&self, pitch: f32, yaw: f32, roll: f32) -> Result<()> {
        self.command(commands::control_gimbal(
            pitch,
            yaw,
            roll,
            self.config.target_system,
            self.config.target_component,
        ))
        .await
    }

    /// Starts executing the stored mission from its first item.
    pub async fn start_mission(&self) -> Result<()> {
        self.command(commands::start_mission(
            self.config.target_system,
            self.config.target_component,
        ))
        .await
    }

    /// Pauses the running mission in place.
    pub async fn pause_mission(&self) -> Result<()> {
        self.command(commands::pause_continue(
            true,
            self.config.target_system,
            self.config.target_component,
        ))
        .await
    }

    /// Resumes a paused mission.
    pub async fn resume_mission(&self) -> Result<()> {
        self.command(commands::pause_continue(
            false,
            self.config.target_system,
            self.config.target_component,
        ))
        .await
    }

    /// Switches the flight mode by display name, e.g. `"GUIDED"` or `"RTL"`.
    ///
    /// Resolves when the request is transmitted; the switch is confirmed by a later
    /// heartbeat carrying the new mode.
    pub async fn set_mode(&self, mode_name: &str) -> Result<()> {
        let custom_mode = mode::mode_number(mode_name)
            .ok_or_else(|| Error::UnknownMode(mode_name.to_string()))?;
        self.request(|done| Request::SendUnacked {
            message: commands::set_mode(custom_mode, self.config.target_system),
            done,
        })
        .await
    }

    /// Sends the vehicle to a position in guided mode, `alt` meters above home.
    ///
    /// Resolves when the target is transmitted; guided targets carry no acknowledgement.
    pub async fn goto(&self, lat: f64, lon: f64, alt: f32) -> Result<()> {
        self.request(|done| Request::SendUnacked {
            message: commands::goto_position(
                lat,
                lon,
                alt,
                self.config.target_system,
                self.config.target_component,
            ),
            done,
        })
        .await
    }

    /// Downloads the mission stored on the vehicle.
    pub async fn download_mission(&self) -> Result<Vec<Waypoint>> {
        self.request(|done| Request::DownloadMission { done }).await
    }

    /// Replaces the mission stored on the vehicle with `waypoints`.
    ///
    /// Sequence numbers must be contiguous from zero; build the list with
    /// [`MissionPlan`](crate::mission::MissionPlan) to guarantee that.
    pub async fn upload_mission(&self, waypoints: Vec<Waypoint>) -> Result<()> {
        self.request(|done| Request::UploadMission { waypoints, done })
            .await
    }

    /// Deletes the mission stored on the vehicle.
    pub async fn clear_mission(&self) -> Result<()> {
        self.request(|done| Request::ClearMission { done }).await
    }

    async fn command(&self, frame: crate::protocol::CommandLong) -> Result<()> {
        self.request(|done| Request::Command { frame, done }).await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T>>) -> Request,
    ) -> Result<T> {
        let (done, result) = oneshot::channel();
        self.requests
            .send(build(done))
            .await
            .map_err(|_| Error::Cancelled)?;
        result.await.map_err(|_| Error::Cancelled)?
    }
}
