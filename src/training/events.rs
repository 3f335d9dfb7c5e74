//! Notifications from a live session to the presentation layer

use std::sync::{Arc, Mutex, PoisonError};

use super::models::{CardObservation, SessionSummary};
use crate::deck::Card;

/// Receives session notifications. Every method defaults to a no-op.
pub trait SessionListener: Send {
    fn on_card_presented(&mut self, _card: Card) {}

    fn on_observation_recorded(&mut self, _observation: &CardObservation) {}

    fn on_elapsed(&mut self, _elapsed_sec: u64) {}

    fn on_session_closed(&mut self, _summary: &SessionSummary) {}
}

/// Listener that ignores everything
#[derive(Debug, Default)]
pub struct NoopListener;

impl SessionListener for NoopListener {}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    CardPresented(Card),
    ObservationRecorded(CardObservation),
    Elapsed(u64),
    SessionClosed(SessionSummary),
}

/// Listener that keeps every event. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Cards presented so far, in order
    pub fn presented(&self) -> Vec<Card> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SessionEvent::CardPresented(card) => Some(card),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: SessionEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl SessionListener for EventLog {
    fn on_card_presented(&mut self, card: Card) {
        self.push(SessionEvent::CardPresented(card));
    }

    fn on_observation_recorded(&mut self, observation: &CardObservation) {
        self.push(SessionEvent::ObservationRecorded(observation.clone()));
    }

    fn on_elapsed(&mut self, elapsed_sec: u64) {
        self.push(SessionEvent::Elapsed(elapsed_sec));
    }

    fn on_session_closed(&mut self, summary: &SessionSummary) {
        self.push(SessionEvent::SessionClosed(summary.clone()));
    }
}
