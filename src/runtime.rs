use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use tracing::warn;

use crate::error::TrainerResult;
use crate::key_set::KeySource;
use crate::session::{Session, SessionEvent, Transition};

/// Source of session events (keystrokes, backspaces, configuration changes)
pub trait SessionEventSource {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError>;
}

/// Event source fed through an mpsc channel. Any number of producers may hold
/// a sender; events reach the session one at a time in arrival order.
pub struct ChannelEventSource {
    rx: Receiver<SessionEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<SessionEvent>) -> Self {
        Self { rx }
    }

    /// A connected sender/source pair.
    pub fn channel() -> (Sender<SessionEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }
}

impl SessionEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that feeds a session one event at a time
pub struct Runner<E: SessionEventSource> {
    event_source: E,
    poll_interval: Duration,
}

impl<E: SessionEventSource> Runner<E> {
    pub fn new(event_source: E, poll_interval: Duration) -> Self {
        Self {
            event_source,
            poll_interval,
        }
    }

    /// Blocks up to the poll interval and returns the next event, if any
    pub fn next_event(&self) -> Option<SessionEvent> {
        match self.event_source.recv_timeout(self.poll_interval) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Apply the next event to `session`. `Ok(None)` when nothing arrived in time.
    pub fn step<S: KeySource>(
        &self,
        session: &mut Session<S>,
    ) -> TrainerResult<Option<Transition>> {
        let Some(event) = self.next_event() else {
            return Ok(None);
        };
        match session.apply(event) {
            Ok(transition) => Ok(Some(transition)),
            Err(e) => {
                warn!("Session rejected event: {}", e);
                Err(e)
            }
        }
    }

    /// Apply events until the source goes quiet, returning every transition.
    /// Stops at the first error.
    pub fn drain<S: KeySource>(&self, session: &mut Session<S>) -> TrainerResult<Vec<Transition>> {
        let mut transitions = Vec::new();
        while let Some(transition) = self.step(session)? {
            transitions.push(transition);
        }
        Ok(transitions)
    }
}
