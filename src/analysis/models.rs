//! Derived analytics values (computed on demand, never stored)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deck::Card;

/// Per-card timing within one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAggregate {
    pub card: Card,
    pub occurrences: usize,
    pub average_time_ms: f64,
}

impl CardAggregate {
    /// How far this card sits above a session average
    pub fn slowdown(&self, session_average_ms: f64) -> Slowdown {
        let extra_ms = self.average_time_ms - session_average_ms;
        let percent_slower = if session_average_ms > 0.0 {
            (self.average_time_ms / session_average_ms - 1.0) * 100.0
        } else {
            0.0
        };
        Slowdown {
            extra_ms,
            percent_slower,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slowdown {
    pub extra_ms: f64,
    pub percent_slower: f64,
}

/// Result of analysing one session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAnalysis {
    /// Every card seen, slowest first
    pub aggregates: Vec<CardAggregate>,
    /// Cards averaging more than 20% above the session mean, slowest first
    pub problem_cards: Vec<CardAggregate>,
}

impl SessionAnalysis {
    /// The `n` slowest cards, for the timing chart
    pub fn slowest(&self, n: usize) -> &[CardAggregate] {
        &self.aggregates[..n.min(self.aggregates.len())]
    }
}

/// A piece of rule-based training advice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub description: String,
}

/// Rollup across all stored sessions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_sessions: usize,
    pub total_cards: usize,
    /// Card-weighted mean viewing time
    pub average_time_ms: f64,
    pub best_speed_cards_per_min: f64,
    /// Session that set the best speed, `None` when no session has a speed
    pub best_session_id: Option<String>,
}

/// One point of the progress chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub label: String,
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub average_viewing_time_ms: f64,
    /// `None` for a zero-second session
    pub cards_per_min: Option<f64>,
}
