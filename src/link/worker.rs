//! Link worker task.
//!
//! A single task owns all mutable link state: the connection phase, the frame encoder, the
//! telemetry aggregator, the command tracker, and the mission session. Public handles talk to
//! it over an mpsc request channel and receive results over oneshot channels, so no state is
//! ever shared under a lock.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::commands::CommandTracker;
use crate::consts::{
    INBOUND_CHAN_CAPACITY, OUTGOING_CHAN_CAPACITY, READ_BUF_SIZE, TRANSPORT_OPEN_TIMEOUT,
    WORKER_TICK_INTERVAL,
};
use crate::errors::{Error, Result};
use crate::io::{LinkInfo, Transport, TransportChannel};
use crate::link::{ConnectionState, LinkConfig, LinkEvent};
use crate::mission::{MissionSession, SessionStep, TransferDirection, Waypoint};
use crate::protocol::{CommandLong, FrameDecoder, FrameEncoder, Message};
use crate::telemetry::{TelemetryAggregator, VehicleState};

/// Requests a [`VehicleLink`](crate::link::VehicleLink) handle may issue.
pub(crate) enum Request {
    Connect {
        done: oneshot::Sender<Result<()>>,
    },
    Disconnect {
        done: oneshot::Sender<Result<()>>,
    },
    /// Send a COMMAND_LONG and resolve `done` from its acknowledgement.
    Command {
        frame: CommandLong,
        done: oneshot::Sender<Result<()>>,
    },
    /// Send a message that carries no acknowledgement; `done` resolves once the frame is
    /// queued for transmission.
    SendUnacked {
        message: Message,
        done: oneshot::Sender<Result<()>>,
    },
    DownloadMission {
        done: oneshot::Sender<Result<Vec<Waypoint>>>,
    },
    UploadMission {
        waypoints: Vec<Waypoint>,
        done: oneshot::Sender<Result<()>>,
    },
    ClearMission {
        done: oneshot::Sender<Result<()>>,
    },
}

/// Completion channel of the live mission transfer.
enum MissionDone {
    Download(oneshot::Sender<Result<Vec<Waypoint>>>),
    Unit(oneshot::Sender<Result<()>>),
}

impl MissionDone {
    fn resolve(self, outcome: Result<Vec<Waypoint>>) {
        match self {
            MissionDone::Download(done) => {
                let _ = done.send(outcome);
            }
            MissionDone::Unit(done) => {
                let _ = done.send(outcome.map(|_| ()));
            }
        }
    }
}

/// An open transport with its reader and writer tasks.
struct ActiveIo {
    outgoing: mpsc::Sender<Vec<u8>>,
    reader_task: JoinHandle<()>,
    writer_task: JoinHandle<()>,
    /// Heartbeat observed on this transport; liveness is confirmed.
    connected: bool,
    last_heartbeat: Option<Instant>,
    opened_at: Instant,
}

impl Drop for ActiveIo {
    fn drop(&mut self) {
        self.reader_task.abort();
        self.writer_task.abort();
    }
}

enum ConnPhase {
    /// No transport and no reconnection in progress.
    Idle,
    /// Transport open; liveness tracked by the watchdog.
    Active(ActiveIo),
    /// Link lost; retrying on an interval.
    Backoff { attempt: usize, next_try: Instant },
}

enum Woke {
    Request(Request),
    Inbound(Message),
    StreamClosed,
    Tick,
}

enum Due {
    Watchdog,
    Drive,
    Reconnect { attempt: usize },
    GiveUp,
    Nothing,
}

pub(crate) struct Worker {
    transport: Arc<dyn Transport>,
    config: LinkConfig,
    info: LinkInfo,
    requests: mpsc::Receiver<Request>,
    telemetry_tx: watch::Sender<VehicleState>,
    events: broadcast::Sender<LinkEvent>,
    aggregator: TelemetryAggregator,
    encoder: FrameEncoder,
    commands: CommandTracker,
    mission: Option<(MissionSession, MissionDone)>,
    phase: ConnPhase,
    inbound: Option<mpsc::Receiver<Message>>,
}

impl Worker {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        config: LinkConfig,
        requests: mpsc::Receiver<Request>,
        telemetry_tx: watch::Sender<VehicleState>,
        events: broadcast::Sender<LinkEvent>,
    ) -> Self {
        let info = transport.info();
        let encoder = FrameEncoder::new(config.system_id, config.component_id);
        let commands = CommandTracker::new(config.command_timeout, config.command_retries);
        Self {
            transport,
            config,
            info,
            requests,
            telemetry_tx,
            events,
            aggregator: TelemetryAggregator::new(),
            encoder,
            commands,
            mission: None,
            phase: ConnPhase::Idle,
            inbound: None,
        }
    }

    /// Runs until every [`VehicleLink`](crate::link::VehicleLink) handle is dropped.
    pub(crate) async fn run(mut self) {
        log::debug!("[{:?}] worker started", self.info);
        let mut tick = interval(WORKER_TICK_INTERVAL);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            let woke = tokio::select! {
                request = self.requests.recv() => match request {
                    Some(request) => Woke::Request(request),
                    None => break,
                },
                message = recv_inbound(&mut self.inbound) => match message {
                    Some(message) => Woke::Inbound(message),
                    None => Woke::StreamClosed,
                },
                _ = tick.tick() => Woke::Tick,
            };
            match woke {
                Woke::Request(request) => self.on_request(request).await,
                Woke::Inbound(message) => self.on_message(message),
                Woke::StreamClosed => self.on_link_lost("transport closed"),
                Woke::Tick => self.on_tick().await,
            }
        }
        self.teardown(Error::Cancelled, Error::Cancelled);
        log::debug!("[{:?}] worker stopped", self.info);
    }

    async fn on_request(&mut self, request: Request) {
        match request {
            Request::Connect { done } => {
                if matches!(self.phase, ConnPhase::Active(_)) {
                    let _ = done.send(Ok(()));
                    return;
                }
                let result = self.open_link().await;
                if result.is_err() {
                    self.phase = ConnPhase::Idle;
                    self.emit_state(ConnectionState::Disconnected);
                }
                let _ = done.send(result);
            }
            Request::Disconnect { done } => {
                self.teardown(Error::Cancelled, Error::Cancelled);
                self.aggregator.set_connected(false);
                self.publish_state();
                self.emit_state(ConnectionState::Disconnected);
                let _ = done.send(Ok(()));
            }
            Request::Command { frame, done } => {
                if !self.is_live() {
                    let _ = done.send(Err(Error::NotConnected));
                    return;
                }
                if let Some(message) = self.commands.track(frame, done, Instant::now()) {
                    if let Err(err) = self.send_message(&message) {
                        log::debug!("[{:?}] command transmission failed: {err}", self.info);
                    }
                }
            }
            Request::SendUnacked { message, done } => {
                let _ = done.send(self.send_message(&message));
            }
            Request::DownloadMission { done } => {
                if !self.is_live() {
                    let _ = done.send(Err(Error::NotConnected));
                    return;
                }
                if self.mission.is_some() {
                    let _ = done.send(Err(Error::Busy));
                    return;
                }
                let (session, step) = MissionSession::download(
                    self.config.target_system,
                    self.config.target_component,
                    self.config.mission_item_timeout,
                    self.config.mission_retries,
                    Instant::now(),
                );
                self.mission = Some((session, MissionDone::Download(done)));
                self.on_mission_step(step);
            }
            Request::UploadMission { waypoints, done } => {
                if !self.is_live() {
                    let _ = done.send(Err(Error::NotConnected));
                    return;
                }
                if self.mission.is_some() {
                    let _ = done.send(Err(Error::Busy));
                    return;
                }
                match MissionSession::upload(
                    waypoints,
                    self.config.target_system,
                    self.config.target_component,
                    self.config.mission_item_timeout,
                    self.config.mission_retries,
                    Instant::now(),
                ) {
                    Ok((session, step)) => {
                        self.mission = Some((session, MissionDone::Unit(done)));
                        self.on_mission_step(step);
                    }
                    Err(err) => {
                        let _ = done.send(Err(err));
                    }
                }
            }
            Request::ClearMission { done } => {
                if !self.is_live() {
                    let _ = done.send(Err(Error::NotConnected));
                    return;
                }
                if self.mission.is_some() {
                    let _ = done.send(Err(Error::Busy));
                    return;
                }
                let (session, step) = MissionSession::clear(
                    self.config.target_system,
                    self.config.target_component,
                    self.config.mission_item_timeout,
                    self.config.mission_retries,
                    Instant::now(),
                );
                self.mission = Some((session, MissionDone::Unit(done)));
                self.on_mission_step(step);
            }
        }
    }

    fn on_message(&mut self, message: Message) {
        let now = Instant::now();
        log::trace!("[{:?}] received message {}", self.info, message.id());

        if matches!(message, Message::Heartbeat(_)) {
            let mut first = false;
            if let ConnPhase::Active(active) = &mut self.phase {
                first = !active.connected;
                active.connected = true;
                active.last_heartbeat = Some(now);
            }
            if first {
                log::info!("[{:?}] heartbeat received, link is live", self.info);
                self.emit_state(ConnectionState::Connected);
                let request = crate::commands::request_all_streams(
                    self.config.stream_rate_hz,
                    self.config.target_system,
                    self.config.target_component,
                );
                if let Err(err) = self.send_message(&request) {
                    log::debug!("[{:?}] stream request failed: {err}", self.info);
                }
            }
        }

        if let Message::CommandAck(ack) = &message {
            self.commands.on_ack(ack, now);
        }

        let step = match self.mission.as_mut() {
            Some((session, _)) => session.handle(&message, now),
            None => None,
        };
        if let Some(step) = step {
            self.on_mission_step(step);
        }

        if self.aggregator.apply(&message) {
            self.publish_state();
        }
    }

    async fn on_tick(&mut self) {
        let now = Instant::now();
        let due = match &self.phase {
            ConnPhase::Active(active) => {
                let base = active.last_heartbeat.unwrap_or(active.opened_at);
                if now.duration_since(base) > self.config.heartbeat_timeout {
                    Due::Watchdog
                } else {
                    Due::Drive
                }
            }
            ConnPhase::Backoff { attempt, next_try } if now >= *next_try => {
                if *attempt >= self.config.max_reconnect_attempts {
                    Due::GiveUp
                } else {
                    Due::Reconnect { attempt: *attempt }
                }
            }
            _ => Due::Nothing,
        };

        match due {
            Due::Watchdog => self.on_link_lost("heartbeat timeout"),
            Due::Drive => {
                for message in self.commands.tick(now) {
                    if let Err(err) = self.send_message(&message) {
                        log::debug!("[{:?}] command retransmission failed: {err}", self.info);
                    }
                }
                let step = self.mission.as_mut().and_then(|(session, _)| session.tick(now));
                if let Some(step) = step {
                    self.on_mission_step(step);
                }
            }
            Due::Reconnect { attempt } => {
                log::info!(
                    "[{:?}] reconnecting, attempt {} of {}",
                    self.info,
                    attempt + 1,
                    self.config.max_reconnect_attempts
                );
                if let Err(err) = self.open_link().await {
                    log::debug!("[{:?}] reconnection failed: {err}", self.info);
                    self.phase = ConnPhase::Backoff {
                        attempt: attempt + 1,
                        next_try: Instant::now() + self.config.reconnect_interval,
                    };
                }
            }
            Due::GiveUp => {
                log::warn!(
                    "[{:?}] giving up after {} reconnection attempts",
                    self.info,
                    self.config.max_reconnect_attempts
                );
                self.phase = ConnPhase::Idle;
                self.emit_state(ConnectionState::Disconnected);
            }
            Due::Nothing => {}
        }
    }

    /// Opens the transport and installs reader/writer tasks. Leaves the phase untouched on
    /// failure so the caller decides between giving up and backing off.
    async fn open_link(&mut self) -> Result<()> {
        self.emit_state(ConnectionState::Connecting);
        let channel = tokio::time::timeout(TRANSPORT_OPEN_TIMEOUT, self.transport.open())
            .await
            .map_err(|_| Error::Timeout)??;
        self.install(channel);
        log::info!("[{:?}] transport open, awaiting heartbeat", self.info);
        Ok(())
    }

    fn install(&mut self, channel: TransportChannel) {
        let TransportChannel {
            mut reader,
            mut writer,
        } = channel;

        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CHAN_CAPACITY);
        let info = self.info.clone();
        let reader_task = tokio::spawn(async move {
            let mut decoder = FrameDecoder::new();
            let mut buf = [0u8; READ_BUF_SIZE];
            loop {
                match reader.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(n) => {
                        decoder.push_bytes(&buf[..n]);
                        while let Some(frame) = decoder.next_frame() {
                            match frame.decode() {
                                Ok(message) => {
                                    if inbound_tx.send(message).await.is_err() {
                                        return;
                                    }
                                }
                                Err(err) => {
                                    log::debug!("[{info:?}] dropping malformed payload: {err}");
                                }
                            }
                        }
                    }
                    Err(err) => {
                        log::debug!("[{info:?}] read failed: {err}");
                        break;
                    }
                }
            }
        });

        let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<Vec<u8>>(OUTGOING_CHAN_CAPACITY);
        let info = self.info.clone();
        let writer_task = tokio::spawn(async move {
            while let Some(bytes) = outgoing_rx.recv().await {
                if let Err(err) = writer.write_all(&bytes).await {
                    log::debug!("[{info:?}] write failed: {err}");
                    break;
                }
                if writer.flush().await.is_err() {
                    break;
                }
            }
        });

        self.inbound = Some(inbound_rx);
        self.phase = ConnPhase::Active(ActiveIo {
            outgoing: outgoing_tx,
            reader_task,
            writer_task,
            connected: false,
            last_heartbeat: None,
            opened_at: Instant::now(),
        });
    }

    fn on_link_lost(&mut self, reason: &str) {
        log::warn!("[{:?}] link lost: {reason}", self.info);
        self.teardown(Error::Timeout, Error::Cancelled);
        self.aggregator.set_connected(false);
        self.publish_state();
        self.emit_state(ConnectionState::Disconnected);
        self.phase = ConnPhase::Backoff {
            attempt: 0,
            next_try: Instant::now(),
        };
    }

    /// Drops the transport tasks and fails every in-flight operation.
    ///
    /// Pending commands and the open mission session fail with different errors on link loss:
    /// commands were transmitted and simply never answered, while the transfer session is
    /// aborted mid-protocol.
    fn teardown(&mut self, command_error: Error, mission_error: Error) {
        self.inbound = None;
        self.phase = ConnPhase::Idle;
        self.commands.fail_all(command_error);
        if let Some((_, done)) = self.mission.take() {
            done.resolve(Err(mission_error));
        }
    }

    fn on_mission_step(&mut self, step: SessionStep) {
        for message in &step.send {
            if let Err(err) = self.send_message(message) {
                log::debug!("[{:?}] mission transmission failed: {err}", self.info);
            }
        }
        let Some(outcome) = step.outcome else {
            return;
        };
        let Some((session, done)) = self.mission.take() else {
            return;
        };
        match &outcome {
            Ok(waypoints) => {
                let total = match session.direction() {
                    TransferDirection::Clear => 0,
                    _ => waypoints.len() as u16,
                };
                self.aggregator.set_mission_total(total);
                self.publish_state();
                self.emit(LinkEvent::MissionUpdated(waypoints.clone()));
            }
            Err(err) => {
                log::warn!(
                    "[{:?}] mission {:?} failed: {err}",
                    self.info,
                    session.direction()
                );
            }
        }
        done.resolve(outcome);
    }

    /// The link is live: the transport is open and a heartbeat has confirmed the vehicle.
    fn is_live(&self) -> bool {
        matches!(&self.phase, ConnPhase::Active(active) if active.connected)
    }

    fn send_message(&mut self, message: &Message) -> Result<()> {
        let ConnPhase::Active(active) = &self.phase else {
            return Err(Error::NotConnected);
        };
        if !active.connected {
            return Err(Error::NotConnected);
        }
        let (sequence, bytes) = self.encoder.encode(message)?;
        log::trace!(
            "[{:?}] sending frame {sequence} (message {})",
            self.info,
            message.id()
        );
        if active.outgoing.try_send(bytes).is_err() {
            log::warn!("[{:?}] outgoing queue full, dropping frame {sequence}", self.info);
            return Err(std::io::Error::new(
                std::io::ErrorKind::WouldBlock,
                "outgoing queue full",
            )
            .into());
        }
        Ok(())
    }

    fn publish_state(&self) {
        self.telemetry_tx.send_replace(self.aggregator.state().clone());
    }

    fn emit_state(&self, state: ConnectionState) {
        self.emit(LinkEvent::Connection {
            state,
            info: self.info.clone(),
        });
    }

    fn emit(&self, event: LinkEvent) {
        // Errors only mean nobody is subscribed.
        let _ = self.events.send(event);
    }
}

async fn recv_inbound(inbound: &mut Option<mpsc::Receiver<Message>>) -> Option<Message> {
    match inbound {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}
