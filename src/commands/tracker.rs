//! COMMAND_LONG acknowledgement tracking.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::errors::{Error, Result};
use crate::protocol::{CommandAck, CommandLong, MavResult, Message};

struct Pending {
    frame: CommandLong,
    retries_left: u8,
    deadline: Instant,
    done: oneshot::Sender<Result<()>>,
}

/// In-flight COMMAND_LONG commands, keyed by command id.
///
/// The wire acknowledgement identifies only the command id, so a second command with the same
/// id while one is pending would be uncorrelatable and is rejected with [`Error::Busy`].
pub(crate) struct CommandTracker {
    pending: HashMap<u16, Pending>,
    timeout: Duration,
    max_retries: u8,
}

impl CommandTracker {
    pub(crate) fn new(timeout: Duration, max_retries: u8) -> Self {
        Self {
            pending: HashMap::new(),
            timeout,
            max_retries,
        }
    }

    /// Registers `frame` for acknowledgement tracking and returns the message to transmit.
    ///
    /// When a command with the same id is already awaiting its ack, `done` resolves with
    /// [`Error::Busy`] and nothing is transmitted.
    pub(crate) fn track(
        &mut self,
        frame: CommandLong,
        done: oneshot::Sender<Result<()>>,
        now: Instant,
    ) -> Option<Message> {
        if self.pending.contains_key(&frame.command) {
            let _ = done.send(Err(Error::Busy));
            return None;
        }
        let message = Message::CommandLong(frame.clone());
        self.pending.insert(
            frame.command,
            Pending {
                frame,
                retries_left: self.max_retries,
                deadline: now + self.timeout,
                done,
            },
        );
        Some(message)
    }

    /// Resolves the pending command the ack refers to, if any.
    ///
    /// `InProgress` extends the deadline instead of resolving; the vehicle sends a terminal
    /// ack when it finishes.
    pub(crate) fn on_ack(&mut self, ack: &CommandAck, now: Instant) {
        let result = MavResult::from_wire(ack.result);
        if result == MavResult::InProgress {
            if let Some(pending) = self.pending.get_mut(&ack.command) {
                pending.deadline = now + self.timeout;
                pending.retries_left = self.max_retries;
            }
            return;
        }
        let Some(pending) = self.pending.remove(&ack.command) else {
            log::debug!("unsolicited ack for command {}: {result:?}", ack.command);
            return;
        };
        let verdict = match result {
            MavResult::Accepted => Ok(()),
            other => Err(Error::CommandRejected(other)),
        };
        let _ = pending.done.send(verdict);
    }

    /// Retransmits overdue commands; resolves spent ones with [`Error::Timeout`].
    pub(crate) fn tick(&mut self, now: Instant) -> Vec<Message> {
        let mut resend = Vec::new();
        let mut expired = Vec::new();
        for (&id, pending) in self.pending.iter_mut() {
            if now < pending.deadline {
                continue;
            }
            if pending.retries_left == 0 {
                expired.push(id);
                continue;
            }
            pending.retries_left -= 1;
            pending.deadline = now + self.timeout;
            pending.frame.confirmation = pending.frame.confirmation.wrapping_add(1);
            log::debug!(
                "command {} unacknowledged, retransmitting (confirmation {})",
                id,
                pending.frame.confirmation
            );
            resend.push(Message::CommandLong(pending.frame.clone()));
        }
        for id in expired {
            if let Some(pending) = self.pending.remove(&id) {
                let _ = pending.done.send(Err(Error::Timeout));
            }
        }
        resend
    }

    /// Resolves every pending command with `error`. Used on disconnect and link loss.
    pub(crate) fn fail_all(&mut self, error: Error) {
        for (_, pending) in self.pending.drain() {
            let _ = pending.done.send(Err(error.clone()));
        }
    }
}

#[cfg(test)]
mod test_tracker {
    use super::*;
    use crate::commands::arm_disarm;

    const TIMEOUT: Duration = Duration::from_millis(1500);
    const RETRIES: u8 = 3;

    fn tracker() -> CommandTracker {
        CommandTracker::new(TIMEOUT, RETRIES)
    }

    fn ack(command: u16, result: u8) -> CommandAck {
        CommandAck { command, result }
    }

    #[test]
    fn accepted_ack_resolves_ok() {
        let mut tracker = tracker();
        let (tx, mut rx) = oneshot::channel();
        let now = Instant::now();

        let sent = tracker.track(arm_disarm(true, false, 1, 1), tx, now);
        assert!(matches!(sent, Some(Message::CommandLong(_))));

        tracker.on_ack(&ack(400, 0), now);
        assert!(matches!(rx.try_recv(), Ok(Ok(()))));
    }

    #[test]
    fn denied_ack_resolves_with_the_result_code() {
        let mut tracker = tracker();
        let (tx, mut rx) = oneshot::channel();
        let now = Instant::now();
        tracker.track(arm_disarm(true, false, 1, 1), tx, now);

        tracker.on_ack(&ack(400, 2), now);
        assert!(matches!(
            rx.try_recv(),
            Ok(Err(Error::CommandRejected(MavResult::Denied)))
        ));
    }

    #[test]
    fn duplicate_command_id_is_busy() {
        let mut tracker = tracker();
        let now = Instant::now();
        let (tx1, _rx1) = oneshot::channel();
        assert!(tracker.track(arm_disarm(true, false, 1, 1), tx1, now).is_some());

        let (tx2, mut rx2) = oneshot::channel();
        assert!(tracker.track(arm_disarm(false, false, 1, 1), tx2, now).is_none());
        assert!(matches!(rx2.try_recv(), Ok(Err(Error::Busy))));
    }

    #[test]
    fn retransmits_bump_confirmation_then_time_out() {
        let mut tracker = tracker();
        let (tx, mut rx) = oneshot::channel();
        let start = Instant::now();
        tracker.track(arm_disarm(true, false, 1, 1), tx, start);

        assert!(tracker.tick(start + Duration::from_millis(100)).is_empty());

        let mut now = start;
        for attempt in 1..=RETRIES {
            now += TIMEOUT;
            let resent = tracker.tick(now);
            assert_eq!(resent.len(), 1);
            let Message::CommandLong(ref frame) = resent[0] else {
                panic!("expected a command");
            };
            assert_eq!(frame.confirmation, attempt);
        }

        now += TIMEOUT;
        assert!(tracker.tick(now).is_empty());
        assert!(matches!(rx.try_recv(), Ok(Err(Error::Timeout))));
    }

    #[test]
    fn in_progress_extends_the_deadline() {
        let mut tracker = tracker();
        let (tx, mut rx) = oneshot::channel();
        let start = Instant::now();
        tracker.track(arm_disarm(true, false, 1, 1), tx, start);

        let midway = start + TIMEOUT - Duration::from_millis(1);
        tracker.on_ack(&ack(400, 5), midway);

        assert!(tracker.tick(start + TIMEOUT).is_empty());
        tracker.on_ack(&ack(400, 0), midway + TIMEOUT);
        assert!(matches!(rx.try_recv(), Ok(Ok(()))));
    }

    #[test]
    fn fail_all_drains_every_pending_command() {
        let mut tracker = tracker();
        let now = Instant::now();
        let (tx1, mut rx1) = oneshot::channel();
        let (tx2, mut rx2) = oneshot::channel();
        tracker.track(arm_disarm(true, false, 1, 1), tx1, now);
        tracker.track(crate::commands::takeoff(20.0, 1, 1), tx2, now);

        tracker.fail_all(Error::NotConnected);
        assert!(matches!(rx1.try_recv(), Ok(Err(Error::NotConnected))));
        assert!(matches!(rx2.try_recv(), Ok(Err(Error::NotConnected))));
    }
}
