//! Data models for training sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deck::Card;

/// Kind of deck a session was run with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    /// Full shuffled 52-card decks
    #[default]
    Standard,
    /// Small decks guaranteed to contain the focus cards
    Focused,
}

impl SessionType {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionType::Standard => "standard",
            SessionType::Focused => "focused",
        }
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One timed exposure of a card, from presentation to "viewed"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardObservation {
    pub card: Card,
    #[serde(rename = "viewingTime")]
    pub viewing_time_ms: f64,
    #[serde(rename = "timestamp")]
    pub observed_at: DateTime<Utc>,
}

/// Persisted record of a completed session.
///
/// Field names on the wire follow the browser tool's `trainingSessions`
/// layout. `card_count` always equals `observations.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub start_time: DateTime<Utc>,
    #[serde(rename = "duration")]
    pub duration_sec: u64,
    pub card_count: usize,
    #[serde(rename = "type", default)]
    pub session_type: SessionType,
    #[serde(rename = "averageViewingTime")]
    pub average_viewing_time_ms: f64,
    #[serde(rename = "cards", default)]
    pub observations: Vec<CardObservation>,
}

impl SessionSummary {
    /// Cards per minute over the whole session, `None` for a zero-second session
    pub fn cards_per_minute(&self) -> Option<f64> {
        if self.duration_sec == 0 {
            return None;
        }
        Some(self.card_count as f64 * 60.0 / self.duration_sec as f64)
    }
}

/// Lifecycle state of a `SessionRecorder`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Idle,
    Active,
    Paused,
    Closed,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Active => "active",
            SessionStatus::Paused => "paused",
            SessionStatus::Closed => "closed",
        }
    }
}

/// A card currently on display, waiting for the athlete to acknowledge it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresentedCard {
    pub card: Card,
    pub presented_at: DateTime<Utc>,
}

/// Running statistics for the session in progress (not stored)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStats {
    pub cards_viewed: usize,
    pub average_viewing_time_ms: f64,
    /// `None` until at least one full second has elapsed
    pub cards_per_minute: Option<f64>,
    pub elapsed_sec: u64,
    /// Most recent observations, newest first
    pub recent: Vec<CardObservation>,
}

/// Format seconds as `MM:SS`; minutes keep counting past an hour
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Arithmetic mean of viewing times, `None` when there are none
pub fn mean_viewing_time(observations: &[CardObservation]) -> Option<f64> {
    if observations.is_empty() {
        return None;
    }
    let total: f64 = observations.iter().map(|o| o.viewing_time_ms).sum();
    Some(total / observations.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{Rank, Suit};

    fn observation(ms: f64) -> CardObservation {
        CardObservation {
            card: Card::new(Rank::Seven, Suit::Diamonds),
            viewing_time_ms: ms,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(3725), "62:05");
    }

    #[test]
    fn test_mean_viewing_time() {
        assert_eq!(mean_viewing_time(&[]), None);
        assert_eq!(
            mean_viewing_time(&[observation(1000.0), observation(1200.0), observation(300.0)]),
            Some(2500.0 / 3.0)
        );
    }

    #[test]
    fn test_cards_per_minute() {
        let mut summary = SessionSummary {
            id: "1".to_string(),
            start_time: Utc::now(),
            duration_sec: 30,
            card_count: 10,
            session_type: SessionType::Standard,
            average_viewing_time_ms: 500.0,
            observations: Vec::new(),
        };
        assert_eq!(summary.cards_per_minute(), Some(20.0));

        summary.duration_sec = 0;
        assert_eq!(summary.cards_per_minute(), None);
    }

    #[test]
    fn test_summary_reads_browser_history() {
        let json = r#"{
            "id": "1700000000000",
            "startTime": "2023-11-14T22:13:20.000Z",
            "duration": 95,
            "cardCount": 2,
            "type": "focused",
            "averageViewingTime": 650.5,
            "cards": [
                {"card": {"value": "Q", "suit": "♠"}, "viewingTime": 1000.25, "timestamp": "2023-11-14T22:13:21.000Z"},
                {"card": {"value": "7", "suit": "♦"}, "viewingTime": 300.75, "timestamp": "2023-11-14T22:13:23.000Z"}
            ]
        }"#;

        let summary: SessionSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.id, "1700000000000");
        assert_eq!(summary.duration_sec, 95);
        assert_eq!(summary.session_type, SessionType::Focused);
        assert_eq!(summary.observations.len(), summary.card_count);
        assert_eq!(summary.observations[0].card, Card::new(Rank::Queen, Suit::Spades));
    }
}
