//! Live session state machine
//!
//! ```text
//! Idle ──start──▶ Active ◀──resume── Paused
//!   ▲               │ └────pause────────▲
//!   │               └──close──▶ Closed ──start──▶ Active
//!   └──────────── reset (from any state)
//! ```
//!
//! Cards are delivered through the injected `Scheduler`: starting or resuming
//! schedules a draw after the reveal delay, and each recorded observation
//! schedules the next draw after the card delay. Pausing, resetting and
//! closing cancel every pending timer, and `handle_timer` ignores any timer
//! that is no longer the one the recorder is waiting for.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::clock::{millis_between, Clock};
use super::events::{NoopListener, SessionListener};
use super::models::{
    mean_viewing_time, CardObservation, LiveStats, PresentedCard, SessionStatus, SessionSummary,
};
use super::scheduler::{FiredTimer, Scheduler, TimerId, TimerTask};
use crate::deck::{Card, Dealer};
use crate::error::{DrillError, Result};

/// Delays driving card delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingSettings {
    /// Pause between an observation and the next card
    pub card_delay_ms: u64,
    /// Pause before the first card after start or resume
    pub reveal_delay_ms: u64,
    /// Elapsed-time refresh cadence
    pub tick_interval_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            card_delay_ms: 1000,
            reveal_delay_ms: 500,
            tick_interval_ms: 1000,
        }
    }
}

/// What the recorder hands over when a session is closed
#[derive(Debug, Clone)]
pub struct ClosedSession {
    pub start_time: DateTime<Utc>,
    pub duration_sec: u64,
    pub observations: Vec<CardObservation>,
}

pub struct SessionRecorder {
    status: SessionStatus,
    timing: TimingSettings,
    dealer: Dealer,
    rng: StdRng,
    clock: Box<dyn Clock>,
    scheduler: Box<dyn Scheduler>,
    listener: Box<dyn SessionListener>,
    start_time: Option<DateTime<Utc>>,
    /// Elapsed seconds captured on pause or close; `None` while the clock runs
    frozen_elapsed_sec: Option<u64>,
    observations: Vec<CardObservation>,
    current: Option<PresentedCard>,
    pending_draw: Option<TimerId>,
    pending_tick: Option<TimerId>,
}

impl SessionRecorder {
    pub fn new(
        timing: TimingSettings,
        dealer: Dealer,
        clock: Box<dyn Clock>,
        scheduler: Box<dyn Scheduler>,
    ) -> Self {
        Self {
            status: SessionStatus::Idle,
            timing,
            dealer,
            rng: StdRng::from_entropy(),
            clock,
            scheduler,
            listener: Box::new(NoopListener),
            start_time: None,
            frozen_elapsed_sec: None,
            observations: Vec::new(),
            current: None,
            pending_draw: None,
            pending_tick: None,
        }
    }

    pub fn with_listener(mut self, listener: Box<dyn SessionListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Use a fixed random source for dealing
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    // ===== State transitions =====

    /// Idle/Closed → Active. Clears any previous observations.
    pub fn start(&mut self) -> Result<()> {
        if !matches!(self.status, SessionStatus::Idle | SessionStatus::Closed) {
            return Err(self.invalid("start"));
        }

        let now = self.clock.now();
        self.cancel_timers();
        self.observations.clear();
        self.current = None;
        self.dealer.reset();
        self.start_time = Some(now);
        self.frozen_elapsed_sec = None;
        self.status = SessionStatus::Active;

        self.schedule_draw(self.timing.reveal_delay_ms);
        self.schedule_tick();

        log::info!(
            "Session started ({} deck)",
            if self.dealer.is_focused() { "focused" } else { "standard" }
        );
        Ok(())
    }

    /// Active → Paused. Elapsed time freezes and the card on display is withdrawn.
    pub fn pause(&mut self) -> Result<()> {
        if self.status != SessionStatus::Active {
            return Err(self.invalid("pause"));
        }

        self.frozen_elapsed_sec = Some(self.elapsed_seconds());
        self.cancel_timers();
        self.current = None;
        self.status = SessionStatus::Paused;

        log::info!("Session paused at {}s", self.elapsed_seconds());
        Ok(())
    }

    /// Paused → Active
    pub fn resume(&mut self) -> Result<()> {
        if self.status != SessionStatus::Paused {
            return Err(self.invalid("resume"));
        }

        self.frozen_elapsed_sec = None;
        self.status = SessionStatus::Active;
        self.schedule_draw(self.timing.reveal_delay_ms);
        self.schedule_tick();

        log::info!("Session resumed");
        Ok(())
    }

    /// Any state → Idle. Discards every observation; callers must persist first.
    pub fn reset(&mut self) {
        self.cancel_timers();
        self.observations.clear();
        self.current = None;
        self.dealer.reset();
        self.start_time = None;
        self.frozen_elapsed_sec = None;
        self.status = SessionStatus::Idle;

        log::info!("Session reset");
    }

    /// Active/Paused → Closed, handing over the recorded observations.
    ///
    /// Fails with `EmptySession` (leaving the session untouched) when nothing
    /// has been recorded.
    pub fn close(&mut self) -> Result<ClosedSession> {
        if self.observations.is_empty() {
            return Err(DrillError::EmptySession);
        }
        if !matches!(self.status, SessionStatus::Active | SessionStatus::Paused) {
            return Err(self.invalid("close"));
        }
        let start_time = self.start_time.ok_or_else(|| self.invalid("close"))?;

        self.cancel_timers();
        self.current = None;
        let duration_sec = self.elapsed_seconds();
        self.frozen_elapsed_sec = Some(duration_sec);
        self.status = SessionStatus::Closed;

        let observations = std::mem::take(&mut self.observations);
        log::info!(
            "Session closed: {} cards in {}s",
            observations.len(),
            duration_sec
        );

        Ok(ClosedSession {
            start_time,
            duration_sec,
            observations,
        })
    }

    // ===== Observations =====

    /// Record that `card` was viewed for `viewing_time_ms`. Only valid while Active.
    pub fn record_observation(&mut self, card: Card, viewing_time_ms: f64) -> Result<CardObservation> {
        if self.status != SessionStatus::Active {
            return Err(self.invalid("record a card"));
        }
        if !viewing_time_ms.is_finite() || viewing_time_ms < 0.0 {
            return Err(DrillError::InvalidConfiguration(format!(
                "Viewing time must be a non-negative number of milliseconds, got {}",
                viewing_time_ms
            )));
        }

        let observation = CardObservation {
            card,
            viewing_time_ms,
            observed_at: self.clock.now(),
        };
        self.observations.push(observation.clone());
        self.current = None;
        self.listener.on_observation_recorded(&observation);

        self.schedule_draw(self.timing.card_delay_ms);
        Ok(observation)
    }

    /// The athlete's "viewed" signal for the card on display
    pub fn acknowledge(&mut self) -> Result<CardObservation> {
        if self.status != SessionStatus::Active {
            return Err(self.invalid("acknowledge a card"));
        }
        let presented = self.current.ok_or(DrillError::InvalidState {
            operation: "acknowledge a card",
            state: "waiting for the next card",
        })?;

        let shown_for = self.clock.now() - presented.presented_at;
        // Microseconds overflow past ~292k years; whole milliseconds still fit
        let viewing_time_ms = shown_for
            .num_microseconds()
            .map(|us| us as f64 / 1000.0)
            .unwrap_or_else(|| shown_for.num_milliseconds() as f64)
            .max(0.0);

        self.record_observation(presented.card, viewing_time_ms)
    }

    // ===== Timers =====

    /// Deliver a fired timer. Timers the recorder is no longer waiting on are dropped.
    pub fn handle_timer(&mut self, fired: FiredTimer) -> Result<()> {
        let awaited = match fired.task {
            TimerTask::DrawCard => self.pending_draw,
            TimerTask::ElapsedTick => self.pending_tick,
        };
        if awaited != Some(fired.id) || self.status != SessionStatus::Active {
            log::debug!("Discarding stale {:?} timer {:?}", fired.task, fired.id);
            return Ok(());
        }

        match fired.task {
            TimerTask::DrawCard => {
                self.pending_draw = None;
                let card = self.dealer.deal(&mut self.rng)?;
                self.current = Some(PresentedCard {
                    card,
                    presented_at: self.clock.now(),
                });
                self.listener.on_card_presented(card);
            }
            TimerTask::ElapsedTick => {
                self.pending_tick = None;
                let elapsed = self.elapsed_seconds();
                self.listener.on_elapsed(elapsed);
                self.schedule_tick();
            }
        }
        Ok(())
    }

    fn schedule_draw(&mut self, delay_ms: u64) {
        if let Some(id) = self.pending_draw.take() {
            self.scheduler.cancel(id);
        }
        self.pending_draw = Some(self.scheduler.schedule(delay_ms, TimerTask::DrawCard));
    }

    fn schedule_tick(&mut self) {
        if let Some(id) = self.pending_tick.take() {
            self.scheduler.cancel(id);
        }
        self.pending_tick = Some(
            self.scheduler
                .schedule(self.timing.tick_interval_ms, TimerTask::ElapsedTick),
        );
    }

    fn cancel_timers(&mut self) {
        if let Some(id) = self.pending_draw.take() {
            self.scheduler.cancel(id);
        }
        if let Some(id) = self.pending_tick.take() {
            self.scheduler.cancel(id);
        }
    }

    // ===== Derived state =====

    /// Whole seconds since the session started, frozen at the last value
    /// while paused or closed
    pub fn elapsed_seconds(&self) -> u64 {
        if let Some(frozen) = self.frozen_elapsed_sec {
            return frozen;
        }
        match (self.status, self.start_time) {
            (SessionStatus::Active, Some(start)) => {
                (millis_between(start, self.clock.now()) / 1000) as u64
            }
            _ => 0,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn observations(&self) -> &[CardObservation] {
        &self.observations
    }

    /// Card on display, if any
    pub fn current_card(&self) -> Option<Card> {
        self.current.map(|p| p.card)
    }

    pub fn dealer(&self) -> &Dealer {
        &self.dealer
    }

    /// Running statistics, `None` before the first observation
    pub fn live_stats(&self, recent: usize) -> Option<LiveStats> {
        let average = mean_viewing_time(&self.observations)?;
        let elapsed_sec = self.elapsed_seconds();
        let cards_per_minute = if elapsed_sec > 0 {
            Some(self.observations.len() as f64 * 60.0 / elapsed_sec as f64)
        } else {
            None
        };

        Some(LiveStats {
            cards_viewed: self.observations.len(),
            average_viewing_time_ms: average,
            cards_per_minute,
            elapsed_sec,
            recent: self.observations.iter().rev().take(recent).cloned().collect(),
        })
    }

    pub(crate) fn notify_closed(&mut self, summary: &SessionSummary) {
        self.listener.on_session_closed(summary);
    }

    fn invalid(&self, operation: &'static str) -> DrillError {
        DrillError::InvalidState {
            operation,
            state: self.status.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{Rank, Suit};
    use crate::training::clock::ManualClock;
    use crate::training::events::{EventLog, SessionEvent};
    use crate::training::scheduler::ManualScheduler;
    use chrono::TimeZone;

    struct Harness {
        recorder: SessionRecorder,
        clock: ManualClock,
        scheduler: ManualScheduler,
        log: EventLog,
    }

    impl Harness {
        fn new(dealer: Dealer) -> Self {
            let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap());
            let scheduler = ManualScheduler::new();
            let log = EventLog::new();
            let recorder = SessionRecorder::new(
                TimingSettings::default(),
                dealer,
                Box::new(clock.clone()),
                Box::new(scheduler.clone()),
            )
            .with_listener(Box::new(log.clone()))
            .with_rng(StdRng::seed_from_u64(11));

            Self {
                recorder,
                clock,
                scheduler,
                log,
            }
        }

        /// Advance time in 100ms steps, delivering timers as they fire
        fn run_for(&mut self, ms: u64) {
            let mut left = ms;
            while left > 0 {
                let step = left.min(100);
                self.clock.advance_ms(step as i64);
                for fired in self.scheduler.advance(step) {
                    self.recorder.handle_timer(fired).unwrap();
                }
                left -= step;
            }
        }
    }

    fn seven_of_diamonds() -> Card {
        Card::new(Rank::Seven, Suit::Diamonds)
    }

    #[test]
    fn test_start_presents_card_after_reveal_delay() {
        let mut h = Harness::new(Dealer::standard());
        h.recorder.start().unwrap();
        assert_eq!(h.recorder.status(), SessionStatus::Active);
        assert!(h.recorder.current_card().is_none());

        h.run_for(400);
        assert!(h.recorder.current_card().is_none());

        h.run_for(100);
        assert!(h.recorder.current_card().is_some());
        assert_eq!(h.log.presented().len(), 1);
    }

    #[test]
    fn test_acknowledge_measures_viewing_time() {
        let mut h = Harness::new(Dealer::standard());
        h.recorder.start().unwrap();
        h.run_for(500);
        let shown = h.recorder.current_card().unwrap();

        h.clock.advance_ms(850);
        let observation = h.recorder.acknowledge().unwrap();

        assert_eq!(observation.card, shown);
        assert_eq!(observation.viewing_time_ms, 850.0);
        assert_eq!(observation.observed_at, h.clock.now());
        assert!(h.recorder.current_card().is_none());
    }

    #[test]
    fn test_next_card_arrives_after_card_delay() {
        let mut h = Harness::new(Dealer::standard());
        h.recorder.start().unwrap();
        h.run_for(500);
        h.recorder.acknowledge().unwrap();

        h.run_for(900);
        assert!(h.recorder.current_card().is_none());
        h.run_for(100);
        assert!(h.recorder.current_card().is_some());
        assert_eq!(h.log.presented().len(), 2);
    }

    #[test]
    fn test_record_while_idle_or_paused_fails() {
        let mut h = Harness::new(Dealer::standard());

        let result = h.recorder.record_observation(seven_of_diamonds(), 300.0);
        assert!(matches!(result, Err(DrillError::InvalidState { .. })));
        assert!(h.recorder.observations().is_empty());

        h.recorder.start().unwrap();
        h.recorder.record_observation(seven_of_diamonds(), 300.0).unwrap();
        h.recorder.pause().unwrap();

        let result = h.recorder.record_observation(seven_of_diamonds(), 300.0);
        assert!(matches!(result, Err(DrillError::InvalidState { .. })));
        assert_eq!(h.recorder.observations().len(), 1);
    }

    #[test]
    fn test_negative_viewing_time_rejected() {
        let mut h = Harness::new(Dealer::standard());
        h.recorder.start().unwrap();
        assert!(h.recorder.record_observation(seven_of_diamonds(), -1.0).is_err());
        assert!(h.recorder.record_observation(seven_of_diamonds(), f64::NAN).is_err());
        assert!(h.recorder.observations().is_empty());
    }

    #[test]
    fn test_acknowledge_without_card_fails() {
        let mut h = Harness::new(Dealer::standard());
        h.recorder.start().unwrap();
        assert!(matches!(
            h.recorder.acknowledge(),
            Err(DrillError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_pause_discards_scheduled_draw() {
        let mut h = Harness::new(Dealer::standard());
        h.recorder.start().unwrap();
        h.run_for(500);
        h.recorder.acknowledge().unwrap();
        assert!(h.scheduler.has_pending(TimerTask::DrawCard));

        h.recorder.pause().unwrap();
        assert_eq!(h.scheduler.pending(), 0);

        h.run_for(5000);
        assert!(h.recorder.current_card().is_none());
        assert_eq!(h.log.presented().len(), 1);
    }

    #[test]
    fn test_stale_timer_is_ignored() {
        let mut h = Harness::new(Dealer::standard());
        h.recorder.start().unwrap();

        // A timer that slipped past cancellation
        let stale = FiredTimer {
            id: TimerId(12345),
            task: TimerTask::DrawCard,
        };
        h.recorder.pause().unwrap();
        h.recorder.handle_timer(stale).unwrap();
        assert!(h.recorder.current_card().is_none());
        assert!(h.log.presented().is_empty());
    }

    #[test]
    fn test_elapsed_freezes_while_paused() {
        let mut h = Harness::new(Dealer::standard());
        h.recorder.start().unwrap();
        h.run_for(2500);
        assert_eq!(h.recorder.elapsed_seconds(), 2);

        h.recorder.pause().unwrap();
        h.clock.advance_ms(60_000);
        assert_eq!(h.recorder.elapsed_seconds(), 2);

        h.recorder.resume().unwrap();
        h.run_for(600);
        assert_eq!(h.recorder.elapsed_seconds(), 63);
    }

    #[test]
    fn test_elapsed_after_resume_counts_from_start() {
        let mut h = Harness::new(Dealer::standard());
        h.recorder.start().unwrap();
        h.recorder.record_observation(seven_of_diamonds(), 400.0).unwrap();
        h.run_for(10_000);

        h.recorder.pause().unwrap();
        h.clock.advance_ms(60_000);
        h.recorder.resume().unwrap();
        h.run_for(1000);
        assert_eq!(h.recorder.elapsed_seconds(), 71);

        let closed = h.recorder.close().unwrap();
        assert_eq!(closed.duration_sec, 71);

        h.clock.advance_ms(30_000);
        assert_eq!(h.recorder.elapsed_seconds(), 71);
    }

    #[test]
    fn test_close_while_paused_keeps_frozen_duration() {
        let mut h = Harness::new(Dealer::standard());
        h.recorder.start().unwrap();
        h.recorder.record_observation(seven_of_diamonds(), 400.0).unwrap();
        h.run_for(5000);
        h.recorder.pause().unwrap();
        h.clock.advance_ms(120_000);

        let closed = h.recorder.close().unwrap();
        assert_eq!(closed.duration_sec, 5);
    }

    #[test]
    fn test_acknowledge_after_huge_gap_stays_finite() {
        let mut h = Harness::new(Dealer::standard());
        h.clock.set(Utc.with_ymd_and_hms(-250_000, 1, 1, 0, 0, 0).unwrap());
        h.recorder.start().unwrap();
        h.run_for(500);
        let presented_at = h.clock.now();

        h.clock.set(Utc.with_ymd_and_hms(100_000, 1, 1, 0, 0, 0).unwrap());
        let observation = h.recorder.acknowledge().unwrap();

        let expected = (h.clock.now() - presented_at).num_milliseconds() as f64;
        assert!(observation.viewing_time_ms.is_finite());
        assert_eq!(observation.viewing_time_ms, expected);
    }

    #[test]
    fn test_elapsed_ticks_are_reported() {
        let mut h = Harness::new(Dealer::standard());
        h.recorder.start().unwrap();
        h.run_for(3000);

        let ticks: Vec<u64> = h
            .log
            .events()
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::Elapsed(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![1, 2, 3]);
    }

    #[test]
    fn test_resume_presents_fresh_card() {
        let mut h = Harness::new(Dealer::standard());
        h.recorder.start().unwrap();
        h.run_for(500);
        h.recorder.pause().unwrap();
        assert!(h.recorder.current_card().is_none());

        h.recorder.resume().unwrap();
        h.run_for(500);
        assert!(h.recorder.current_card().is_some());
        assert_eq!(h.log.presented().len(), 2);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut h = Harness::new(Dealer::standard());
        assert!(h.recorder.pause().is_err());
        assert!(h.recorder.resume().is_err());

        h.recorder.start().unwrap();
        assert!(h.recorder.start().is_err());
        assert!(h.recorder.resume().is_err());
    }

    #[test]
    fn test_reset_discards_everything() {
        let mut h = Harness::new(Dealer::standard());
        h.recorder.start().unwrap();
        h.recorder.record_observation(seven_of_diamonds(), 400.0).unwrap();
        h.run_for(1500);

        h.recorder.reset();
        assert_eq!(h.recorder.status(), SessionStatus::Idle);
        assert!(h.recorder.observations().is_empty());
        assert!(h.recorder.start_time().is_none());
        assert_eq!(h.recorder.elapsed_seconds(), 0);
        assert_eq!(h.scheduler.pending(), 0);
    }

    #[test]
    fn test_close_empty_session_fails_and_keeps_state() {
        let mut h = Harness::new(Dealer::standard());
        h.recorder.start().unwrap();

        assert!(matches!(h.recorder.close(), Err(DrillError::EmptySession)));
        assert_eq!(h.recorder.status(), SessionStatus::Active);
    }

    #[test]
    fn test_close_hands_over_observations() {
        let mut h = Harness::new(Dealer::standard());
        let started = h.clock.now();
        h.recorder.start().unwrap();
        h.recorder.record_observation(seven_of_diamonds(), 400.0).unwrap();
        h.run_for(4200);

        let closed = h.recorder.close().unwrap();
        assert_eq!(closed.start_time, started);
        assert_eq!(closed.duration_sec, 4);
        assert_eq!(closed.observations.len(), 1);

        assert_eq!(h.recorder.status(), SessionStatus::Closed);
        assert!(h.recorder.observations().is_empty());
        assert_eq!(h.scheduler.pending(), 0);

        // A closed session can be restarted
        h.recorder.start().unwrap();
        assert_eq!(h.recorder.status(), SessionStatus::Active);
    }

    #[test]
    fn test_focused_dealer_delivers_focus_card() {
        let queen = Card::new(Rank::Queen, Suit::Spades);
        let mut h = Harness::new(Dealer::new(vec![queen], 4).unwrap());
        h.recorder.start().unwrap();

        for _ in 0..4 {
            h.run_for(1000);
            h.recorder.acknowledge().unwrap();
        }
        let seen: Vec<Card> = h.recorder.observations().iter().map(|o| o.card).collect();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen.iter().filter(|c| **c == queen).count(), 1);
    }

    #[test]
    fn test_live_stats() {
        let mut h = Harness::new(Dealer::standard());
        h.recorder.start().unwrap();
        assert!(h.recorder.live_stats(9).is_none());

        h.recorder.record_observation(seven_of_diamonds(), 400.0).unwrap();
        h.recorder
            .record_observation(Card::new(Rank::Ace, Suit::Hearts), 600.0)
            .unwrap();

        let stats = h.recorder.live_stats(9).unwrap();
        assert_eq!(stats.cards_viewed, 2);
        assert_eq!(stats.average_viewing_time_ms, 500.0);
        assert_eq!(stats.cards_per_minute, None);
        assert_eq!(stats.recent[0].card, Card::new(Rank::Ace, Suit::Hearts));

        h.run_for(30_000);
        let stats = h.recorder.live_stats(1).unwrap();
        assert_eq!(stats.cards_per_minute, Some(4.0));
        assert_eq!(stats.recent.len(), 1);
    }
}
