//! Mission transfer state machine.
//!
//! [`MissionSession`] is a pure machine: it never touches a socket or a clock of its own.
//! The link worker feeds it decoded messages via [`handle`](MissionSession::handle) and time
//! via [`tick`](MissionSession::tick); each call may yield a [`SessionStep`] telling the
//! worker what to transmit and whether the transfer has concluded.

use std::time::Duration;

use tokio::time::Instant;

use crate::errors::{Error, Result};
use crate::mission::{validate_sequence, Waypoint};
use crate::protocol::{
    Message, MissionAck, MissionClearAll, MissionCount, MissionRequestInt, MissionRequestList,
    MissionResult,
};

/// Which side of the handshake this session drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TransferDirection {
    /// Vehicle → station: fetch the stored mission.
    Download,
    /// Station → vehicle: replace the stored mission.
    Upload,
    /// Station → vehicle: delete the stored mission.
    Clear,
}

/// One turn of the handshake: messages to transmit now, and the final verdict if any.
///
/// `outcome` carries the downloaded waypoints on success; upload and clear report the
/// uploaded list and an empty list respectively.
#[derive(Debug, Default)]
pub(crate) struct SessionStep {
    pub(crate) send: Vec<Message>,
    pub(crate) outcome: Option<Result<Vec<Waypoint>>>,
}

impl SessionStep {
    fn finish(outcome: Result<Vec<Waypoint>>) -> Self {
        Self {
            send: Vec::new(),
            outcome: Some(outcome),
        }
    }
}

#[derive(Debug)]
enum Phase {
    /// Download: waiting for MISSION_COUNT.
    AwaitCount,
    /// Download: collecting `count` items.
    Fetch { count: u16 },
    /// Upload and clear: waiting for the terminal MISSION_ACK.
    AwaitAck,
    /// Terminal; every further input is ignored.
    Done,
}

/// In-flight mission transfer.
///
/// Exactly one session may be live per link. Each protocol step arms a retry budget; when
/// [`tick`](Self::tick) sees the deadline pass it retransmits the last request, and once the
/// budget is spent the transfer concludes with [`Error::Timeout`].
#[derive(Debug)]
pub(crate) struct MissionSession {
    direction: TransferDirection,
    phase: Phase,
    target_system: u8,
    target_component: u8,
    item_timeout: Duration,
    max_retries: u8,
    retries_left: u8,
    deadline: Instant,
    last_sent: Vec<Message>,
    /// Upload: the outbound plan.
    items: Vec<Waypoint>,
    /// Download: received items by sequence number; arrival order is not guaranteed.
    slots: Vec<Option<Waypoint>>,
}

impl MissionSession {
    /// Starts a download. The returned step transmits MISSION_REQUEST_LIST.
    pub(crate) fn download(
        target_system: u8,
        target_component: u8,
        item_timeout: Duration,
        max_retries: u8,
        now: Instant,
    ) -> (Self, SessionStep) {
        let request = Message::MissionRequestList(MissionRequestList {
            target_system,
            target_component,
        });
        let mut session = Self::new(
            TransferDirection::Download,
            Phase::AwaitCount,
            target_system,
            target_component,
            item_timeout,
            max_retries,
            now,
        );
        let step = session.arm(vec![request], now);
        (session, step)
    }

    /// Starts an upload of `waypoints`. The returned step transmits MISSION_COUNT.
    pub(crate) fn upload(
        waypoints: Vec<Waypoint>,
        target_system: u8,
        target_component: u8,
        item_timeout: Duration,
        max_retries: u8,
        now: Instant,
    ) -> Result<(Self, SessionStep)> {
        validate_sequence(&waypoints)?;
        let count = Message::MissionCount(MissionCount {
            count: waypoints.len() as u16,
            target_system,
            target_component,
        });
        let mut session = Self::new(
            TransferDirection::Upload,
            Phase::AwaitAck,
            target_system,
            target_component,
            item_timeout,
            max_retries,
            now,
        );
        session.items = waypoints;
        let step = session.arm(vec![count], now);
        Ok((session, step))
    }

    /// Starts a clear. The returned step transmits MISSION_CLEAR_ALL.
    pub(crate) fn clear(
        target_system: u8,
        target_component: u8,
        item_timeout: Duration,
        max_retries: u8,
        now: Instant,
    ) -> (Self, SessionStep) {
        let request = Message::MissionClearAll(MissionClearAll {
            target_system,
            target_component,
        });
        let mut session = Self::new(
            TransferDirection::Clear,
            Phase::AwaitAck,
            target_system,
            target_component,
            item_timeout,
            max_retries,
            now,
        );
        let step = session.arm(vec![request], now);
        (session, step)
    }

    fn new(
        direction: TransferDirection,
        phase: Phase,
        target_system: u8,
        target_component: u8,
        item_timeout: Duration,
        max_retries: u8,
        now: Instant,
    ) -> Self {
        Self {
            direction,
            phase,
            target_system,
            target_component,
            item_timeout,
            max_retries,
            retries_left: max_retries,
            deadline: now + item_timeout,
            last_sent: Vec::new(),
            items: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// Which side of the handshake this session drives.
    pub(crate) fn direction(&self) -> TransferDirection {
        self.direction
    }

    /// `true` once the transfer has concluded, in either direction.
    pub(crate) fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Feeds one decoded message. `None` means the message did not concern this session.
    pub(crate) fn handle(&mut self, message: &Message, now: Instant) -> Option<SessionStep> {
        if self.is_done() {
            return None;
        }
        match (self.direction, message) {
            (TransferDirection::Download, Message::MissionCount(count)) => {
                Some(self.on_count(count.count, now))
            }
            (TransferDirection::Download, Message::MissionItemInt(item)) => {
                self.on_item(Waypoint::from_item(item), now)
            }
            (TransferDirection::Upload, Message::MissionRequest(request)) => {
                self.on_item_request(request.seq, now)
            }
            (TransferDirection::Upload, Message::MissionRequestInt(request)) => {
                self.on_item_request(request.seq, now)
            }
            (_, Message::MissionAck(ack)) => Some(self.on_ack(MissionResult::from_wire(ack.result))),
            _ => None,
        }
    }

    /// Advances timers. Retransmits the last request past its deadline; concludes with
    /// [`Error::Timeout`] once the retry budget is spent.
    pub(crate) fn tick(&mut self, now: Instant) -> Option<SessionStep> {
        if self.is_done() || now < self.deadline {
            return None;
        }
        if self.retries_left == 0 {
            self.phase = Phase::Done;
            return Some(SessionStep::finish(Err(Error::Timeout)));
        }
        self.retries_left -= 1;
        self.deadline = now + self.item_timeout;
        log::debug!(
            "mission {:?}: retransmitting, {} retries left",
            self.direction,
            self.retries_left
        );
        Some(SessionStep {
            send: self.last_sent.clone(),
            outcome: None,
        })
    }

    fn on_count(&mut self, count: u16, now: Instant) -> SessionStep {
        match self.phase {
            Phase::AwaitCount => {
                if count == 0 {
                    self.phase = Phase::Done;
                    return SessionStep {
                        send: vec![self.ack(MissionResult::Accepted)],
                        outcome: Some(Ok(Vec::new())),
                    };
                }
                self.phase = Phase::Fetch { count };
                self.slots = vec![None; count as usize];
                let request = self.item_request(0);
                self.arm(vec![request], now)
            }
            // A repeated count means our last request was lost; re-request.
            Phase::Fetch { .. } => match self.next_missing() {
                Some(seq) => {
                    let request = self.item_request(seq);
                    self.arm(vec![request], now)
                }
                None => SessionStep::default(),
            },
            _ => SessionStep::default(),
        }
    }

    fn on_item(&mut self, waypoint: Waypoint, now: Instant) -> Option<SessionStep> {
        let Phase::Fetch { count } = self.phase else {
            return None;
        };
        if waypoint.seq >= count {
            self.phase = Phase::Done;
            return Some(SessionStep::finish(Err(Error::ProtocolViolation(format!(
                "mission download: got item {} of a {count}-item mission",
                waypoint.seq
            )))));
        }
        let slot = &mut self.slots[waypoint.seq as usize];
        if slot.is_some() {
            // Duplicate of an item we already stored, a retransmission artifact.
            return Some(SessionStep::default());
        }
        *slot = Some(waypoint);
        match self.next_missing() {
            Some(seq) => {
                let request = self.item_request(seq);
                Some(self.arm(vec![request], now))
            }
            None => {
                self.phase = Phase::Done;
                let waypoints = self.slots.drain(..).flatten().collect();
                Some(SessionStep {
                    send: vec![self.ack(MissionResult::Accepted)],
                    outcome: Some(Ok(waypoints)),
                })
            }
        }
    }

    /// Lowest sequence number not yet received, if any.
    fn next_missing(&self) -> Option<u16> {
        self.slots
            .iter()
            .position(|slot| slot.is_none())
            .map(|index| index as u16)
    }

    fn on_item_request(&mut self, seq: u16, now: Instant) -> Option<SessionStep> {
        if !matches!(self.phase, Phase::AwaitAck) {
            return None;
        }
        let Some(waypoint) = self.items.get(seq as usize) else {
            self.phase = Phase::Done;
            return Some(SessionStep::finish(Err(Error::ProtocolViolation(format!(
                "mission upload: vehicle requested item {seq} of {}",
                self.items.len()
            )))));
        };
        let item = Message::MissionItemInt(
            waypoint.to_item(self.target_system, self.target_component),
        );
        Some(self.arm(vec![item], now))
    }

    fn on_ack(&mut self, result: MissionResult) -> SessionStep {
        self.phase = Phase::Done;
        match (self.direction, result) {
            (TransferDirection::Download, _) => {
                // A standalone ack during download is the vehicle aborting the transfer.
                SessionStep::finish(Err(Error::MissionRejected(result)))
            }
            (_, MissionResult::Accepted) => {
                SessionStep::finish(Ok(std::mem::take(&mut self.items)))
            }
            (_, _) => SessionStep::finish(Err(Error::MissionRejected(result))),
        }
    }

    /// Records `messages` as the retransmission unit and re-arms the step timer.
    fn arm(&mut self, messages: Vec<Message>, now: Instant) -> SessionStep {
        self.last_sent = messages.clone();
        self.retries_left = self.max_retries;
        self.deadline = now + self.item_timeout;
        SessionStep {
            send: messages,
            outcome: None,
        }
    }

    fn item_request(&self, seq: u16) -> Message {
        Message::MissionRequestInt(MissionRequestInt {
            seq,
            target_system: self.target_system,
            target_component: self.target_component,
        })
    }

    fn ack(&self, result: MissionResult) -> Message {
        Message::MissionAck(MissionAck {
            target_system: self.target_system,
            target_component: self.target_component,
            result: result.to_wire(),
        })
    }
}

#[cfg(test)]
mod test_session {
    use super::*;
    use crate::protocol::MissionRequest;

    const TIMEOUT: Duration = Duration::from_millis(1500);
    const RETRIES: u8 = 3;

    fn download() -> (MissionSession, SessionStep) {
        MissionSession::download(1, 1, TIMEOUT, RETRIES, Instant::now())
    }

    fn item(seq: u16) -> Message {
        Message::MissionItemInt(Waypoint::nav(seq, 40.0, -74.0, 25.0).to_item(1, 1))
    }

    fn ack(result: MissionResult) -> Message {
        Message::MissionAck(MissionAck {
            target_system: 1,
            target_component: 1,
            result: result.to_wire(),
        })
    }

    #[test]
    fn download_walks_count_then_items_then_acks() {
        let (mut session, step) = download();
        assert!(matches!(step.send[0], Message::MissionRequestList(_)));

        let now = Instant::now();
        let step = session
            .handle(&Message::MissionCount(MissionCount { count: 2, target_system: 255, target_component: 190 }), now)
            .unwrap();
        assert!(
            matches!(step.send[0], Message::MissionRequestInt(MissionRequestInt { seq: 0, .. }))
        );

        let step = session.handle(&item(0), now).unwrap();
        assert!(
            matches!(step.send[0], Message::MissionRequestInt(MissionRequestInt { seq: 1, .. }))
        );

        let step = session.handle(&item(1), now).unwrap();
        assert!(matches!(step.send[0], Message::MissionAck(_)));
        let waypoints = step.outcome.unwrap().unwrap();
        assert_eq!(waypoints.len(), 2);
        assert_eq!(waypoints[1].seq, 1);
        assert!(session.is_done());
    }

    #[test]
    fn empty_download_concludes_immediately() {
        let (mut session, _) = download();
        let step = session
            .handle(
                &Message::MissionCount(MissionCount { count: 0, ..Default::default() }),
                Instant::now(),
            )
            .unwrap();
        assert!(matches!(step.send[0], Message::MissionAck(_)));
        assert_eq!(step.outcome.unwrap().unwrap().len(), 0);
    }

    #[test]
    fn out_of_order_items_are_collected_and_missing_ones_re_requested() {
        let (mut session, _) = download();
        let now = Instant::now();
        session
            .handle(&Message::MissionCount(MissionCount { count: 3, ..Default::default() }), now)
            .unwrap();

        // Item 2 arrives first; the session keeps it and asks for the lowest gap.
        let step = session.handle(&item(2), now).unwrap();
        assert!(
            matches!(step.send[0], Message::MissionRequestInt(MissionRequestInt { seq: 0, .. }))
        );

        session.handle(&item(0), now).unwrap();
        let step = session.handle(&item(1), now).unwrap();
        let waypoints = step.outcome.unwrap().unwrap();
        let seqs: Vec<u16> = waypoints.iter().map(|w| w.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    #[test]
    fn item_beyond_the_count_is_a_protocol_violation() {
        let (mut session, _) = download();
        let now = Instant::now();
        session
            .handle(&Message::MissionCount(MissionCount { count: 3, ..Default::default() }), now)
            .unwrap();
        let step = session.handle(&item(5), now).unwrap();
        assert!(matches!(
            step.outcome,
            Some(Err(Error::ProtocolViolation(_)))
        ));
    }

    #[test]
    fn duplicate_item_is_ignored() {
        let (mut session, _) = download();
        let now = Instant::now();
        session
            .handle(&Message::MissionCount(MissionCount { count: 2, ..Default::default() }), now)
            .unwrap();
        session.handle(&item(0), now).unwrap();

        let step = session.handle(&item(0), now).unwrap();
        assert!(step.send.is_empty());
        assert!(step.outcome.is_none());
        assert!(!session.is_done());
    }

    #[test]
    fn tick_retransmits_then_times_out() {
        let (mut session, _) = download();
        let start = Instant::now();

        assert!(session.tick(start + Duration::from_millis(100)).is_none());

        let mut now = start;
        for _ in 0..RETRIES {
            now += TIMEOUT;
            let step = session.tick(now).unwrap();
            assert!(matches!(step.send[0], Message::MissionRequestList(_)));
            assert!(step.outcome.is_none());
        }

        now += TIMEOUT;
        let step = session.tick(now).unwrap();
        assert!(matches!(step.outcome, Some(Err(Error::Timeout))));
        assert!(session.is_done());
    }

    #[test]
    fn upload_answers_requests_and_finishes_on_ack() {
        let waypoints = vec![
            Waypoint::nav(0, 40.0, -74.0, 0.0),
            Waypoint::nav(1, 40.1, -74.0, 30.0),
        ];
        let now = Instant::now();
        let (mut session, step) =
            MissionSession::upload(waypoints, 1, 1, TIMEOUT, RETRIES, now).unwrap();
        assert!(matches!(
            step.send[0],
            Message::MissionCount(MissionCount { count: 2, .. })
        ));

        // Vehicles may request with either message; both must be answered.
        let step = session
            .handle(
                &Message::MissionRequest(MissionRequest { seq: 0, ..Default::default() }),
                now,
            )
            .unwrap();
        let Message::MissionItemInt(ref sent) = step.send[0] else {
            panic!("expected item, got {:?}", step.send[0]);
        };
        assert_eq!(sent.seq, 0);

        let step = session
            .handle(
                &Message::MissionRequestInt(MissionRequestInt { seq: 1, ..Default::default() }),
                now,
            )
            .unwrap();
        let Message::MissionItemInt(ref sent) = step.send[0] else {
            panic!("expected item, got {:?}", step.send[0]);
        };
        assert_eq!(sent.seq, 1);

        let step = session.handle(&ack(MissionResult::Accepted), now).unwrap();
        assert_eq!(step.outcome.unwrap().unwrap().len(), 2);
    }

    #[test]
    fn upload_rejection_surfaces_the_result_code() {
        let (mut session, _) =
            MissionSession::upload(vec![Waypoint::nav(0, 40.0, -74.0, 0.0)], 1, 1, TIMEOUT, RETRIES, Instant::now())
                .unwrap();
        let step = session
            .handle(&ack(MissionResult::NoSpace), Instant::now())
            .unwrap();
        assert!(matches!(
            step.outcome,
            Some(Err(Error::MissionRejected(MissionResult::NoSpace)))
        ));
    }

    #[test]
    fn upload_with_gapped_sequence_is_rejected_locally() {
        let waypoints = vec![Waypoint::nav(1, 40.0, -74.0, 0.0)];
        let result = MissionSession::upload(waypoints, 1, 1, TIMEOUT, RETRIES, Instant::now());
        assert!(matches!(result, Err(Error::InvalidMission(_))));
    }

    #[test]
    fn clear_finishes_on_accepted_ack() {
        let now = Instant::now();
        let (mut session, step) = MissionSession::clear(1, 1, TIMEOUT, RETRIES, now);
        assert!(matches!(step.send[0], Message::MissionClearAll(_)));

        let step = session.handle(&ack(MissionResult::Accepted), now).unwrap();
        assert_eq!(step.outcome.unwrap().unwrap().len(), 0);
    }

    #[test]
    fn telemetry_traffic_does_not_concern_the_session() {
        let (mut session, _) = download();
        assert!(session
            .handle(
                &Message::Heartbeat(crate::protocol::Heartbeat::default()),
                Instant::now()
            )
            .is_none());
    }
}
