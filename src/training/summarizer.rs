//! Turning a finished session into a `SessionSummary`
//!
//! Summarizing does not persist anything; hand the summary to a
//! `SessionStore` explicitly.

use uuid::Uuid;

use super::models::{mean_viewing_time, SessionSummary, SessionType};
use super::recorder::{ClosedSession, SessionRecorder};
use crate::error::{DrillError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionSummarizer;

impl SessionSummarizer {
    pub fn new() -> Self {
        Self
    }

    /// Close the recorder's session and summarize it.
    ///
    /// An empty session fails with `EmptySession` and the recorder keeps running.
    pub fn close(
        &self,
        recorder: &mut SessionRecorder,
        session_type: SessionType,
    ) -> Result<SessionSummary> {
        let closed = recorder.close()?;
        let summary = summarize(closed, session_type)?;
        recorder.notify_closed(&summary);
        Ok(summary)
    }
}

/// Build the summary record for a closed session
pub fn summarize(closed: ClosedSession, session_type: SessionType) -> Result<SessionSummary> {
    let average_viewing_time_ms =
        mean_viewing_time(&closed.observations).ok_or(DrillError::EmptySession)?;

    Ok(SessionSummary {
        id: Uuid::new_v4().to_string(),
        start_time: closed.start_time,
        duration_sec: closed.duration_sec,
        card_count: closed.observations.len(),
        session_type,
        average_viewing_time_ms,
        observations: closed.observations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{Card, Dealer, Rank, Suit};
    use crate::training::clock::{Clock, ManualClock};
    use crate::training::events::{EventLog, SessionEvent};
    use crate::training::models::{CardObservation, SessionStatus};
    use crate::training::recorder::TimingSettings;
    use crate::training::scheduler::ManualScheduler;
    use chrono::{TimeZone, Utc};

    fn recorder_with_log() -> (SessionRecorder, ManualClock, EventLog) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 5, 4, 19, 30, 0).unwrap());
        let log = EventLog::new();
        let recorder = SessionRecorder::new(
            TimingSettings::default(),
            Dealer::standard(),
            Box::new(clock.clone()),
            Box::new(ManualScheduler::new()),
        )
        .with_listener(Box::new(log.clone()));
        (recorder, clock, log)
    }

    #[test]
    fn test_close_computes_exact_mean() {
        let (mut recorder, clock, log) = recorder_with_log();
        let started = clock.now();
        recorder.start().unwrap();

        let times = [1000.0, 1200.0, 300.0, 455.5];
        for (i, ms) in times.iter().enumerate() {
            clock.advance_ms(1500);
            let card = Card::new(Rank::ALL[i], Suit::Clubs);
            recorder.record_observation(card, *ms).unwrap();
        }

        let summary = SessionSummarizer::new()
            .close(&mut recorder, SessionType::Standard)
            .unwrap();

        assert_eq!(summary.card_count, 4);
        assert_eq!(summary.observations.len(), summary.card_count);
        assert_eq!(summary.average_viewing_time_ms, times.iter().sum::<f64>() / 4.0);
        assert_eq!(summary.start_time, started);
        assert_eq!(summary.duration_sec, 6);
        assert_eq!(summary.session_type, SessionType::Standard);
        assert_eq!(recorder.status(), SessionStatus::Closed);

        assert!(log
            .events()
            .iter()
            .any(|e| matches!(e, SessionEvent::SessionClosed(s) if s.id == summary.id)));
    }

    #[test]
    fn test_close_empty_session_is_rejected() {
        let (mut recorder, _clock, log) = recorder_with_log();
        recorder.start().unwrap();

        let result = SessionSummarizer::new().close(&mut recorder, SessionType::Focused);
        assert!(matches!(result, Err(DrillError::EmptySession)));
        assert_eq!(recorder.status(), SessionStatus::Active);
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let closed = || ClosedSession {
            start_time: Utc::now(),
            duration_sec: 10,
            observations: vec![CardObservation {
                card: Card::new(Rank::Two, Suit::Hearts),
                viewing_time_ms: 250.0,
                observed_at: Utc::now(),
            }],
        };

        let a = summarize(closed(), SessionType::Standard).unwrap();
        let b = summarize(closed(), SessionType::Standard).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_summarize_rejects_no_observations() {
        let closed = ClosedSession {
            start_time: Utc::now(),
            duration_sec: 0,
            observations: Vec::new(),
        };
        assert!(matches!(
            summarize(closed, SessionType::Standard),
            Err(DrillError::EmptySession)
        ));
    }
}
