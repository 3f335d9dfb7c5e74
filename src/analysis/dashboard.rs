//! Cross-session rollups and trend series

use super::models::{DashboardStats, TrendPoint};
use crate::training::SessionSummary;

#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardAggregator;

impl DashboardAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Roll up every stored session. No sessions gives all-zero stats.
    ///
    /// Zero-second sessions have no defined speed and are skipped when
    /// looking for the best speed; on equal speeds the first session wins.
    pub fn aggregate(&self, summaries: &[SessionSummary]) -> DashboardStats {
        if summaries.is_empty() {
            return DashboardStats::default();
        }

        let total_cards: usize = summaries.iter().map(|s| s.card_count).sum();
        let weighted_ms: f64 = summaries
            .iter()
            .map(|s| s.average_viewing_time_ms * s.card_count as f64)
            .sum();
        let average_time_ms = if total_cards > 0 {
            weighted_ms / total_cards as f64
        } else {
            0.0
        };

        let best = self.best_session(summaries);

        DashboardStats {
            total_sessions: summaries.len(),
            total_cards,
            average_time_ms,
            best_speed_cards_per_min: best
                .and_then(SessionSummary::cards_per_minute)
                .unwrap_or(0.0),
            best_session_id: best.map(|s| s.id.clone()),
        }
    }

    /// The fastest session by cards per minute. Ties go to the earliest in `summaries`.
    pub fn best_session<'a>(&self, summaries: &'a [SessionSummary]) -> Option<&'a SessionSummary> {
        let mut best: Option<(&SessionSummary, f64)> = None;
        for summary in summaries {
            let Some(speed) = summary.cards_per_minute() else {
                continue;
            };
            if best.map_or(true, |(_, b)| speed > b) {
                best = Some((summary, speed));
            }
        }
        best.map(|(summary, _)| summary)
    }

    /// Chart points for the `window` most recent sessions, oldest first.
    ///
    /// `summaries` is expected newest first, as `SessionStore::load_all` returns it.
    pub fn trend(&self, summaries: &[SessionSummary], window: usize) -> Vec<TrendPoint> {
        let recent = &summaries[..window.min(summaries.len())];
        recent
            .iter()
            .rev()
            .enumerate()
            .map(|(i, summary)| TrendPoint {
                label: format!("Session {}", i + 1),
                session_id: summary.id.clone(),
                start_time: summary.start_time,
                average_viewing_time_ms: summary.average_viewing_time_ms,
                cards_per_min: summary.cards_per_minute(),
            })
            .collect()
    }

    /// The `n` newest sessions
    pub fn recent<'a>(&self, summaries: &'a [SessionSummary], n: usize) -> &'a [SessionSummary] {
        &summaries[..n.min(summaries.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::SessionType;
    use chrono::{Duration, TimeZone, Utc};

    fn summary(id: &str, card_count: usize, average: f64, duration_sec: u64) -> SessionSummary {
        SessionSummary {
            id: id.to_string(),
            start_time: Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap(),
            duration_sec,
            card_count,
            session_type: SessionType::Standard,
            average_viewing_time_ms: average,
            observations: Vec::new(),
        }
    }

    #[test]
    fn test_empty_history_is_zeroed() {
        let stats = DashboardAggregator::new().aggregate(&[]);
        assert_eq!(stats, DashboardStats::default());
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.best_speed_cards_per_min, 0.0);
        assert!(DashboardAggregator::new().trend(&[], 10).is_empty());
    }

    #[test]
    fn test_average_is_weighted_by_cards() {
        let sessions = vec![summary("a", 10, 500.0, 60), summary("b", 20, 800.0, 60)];
        let stats = DashboardAggregator::new().aggregate(&sessions);

        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_cards, 30);
        assert!((stats.average_time_ms - 700.0).abs() < 1e-9);
    }

    #[test]
    fn test_best_speed() {
        let sessions = vec![
            summary("slow", 10, 500.0, 60),
            summary("fast", 30, 500.0, 60),
            summary("instant", 5, 500.0, 0),
        ];
        let stats = DashboardAggregator::new().aggregate(&sessions);
        assert_eq!(stats.best_speed_cards_per_min, 30.0);
    }

    #[test]
    fn test_best_speed_tie_goes_to_first_session() {
        // 10 cards in 60s and 20 cards in 120s are both 10 cards/min
        let sessions = vec![
            summary("slower", 5, 500.0, 60),
            summary("first", 10, 500.0, 60),
            summary("second", 20, 800.0, 120),
        ];
        let aggregator = DashboardAggregator::new();

        assert_eq!(aggregator.best_session(&sessions).unwrap().id, "first");
        let stats = aggregator.aggregate(&sessions);
        assert_eq!(stats.best_speed_cards_per_min, 10.0);
        assert_eq!(stats.best_session_id.as_deref(), Some("first"));

        let reversed: Vec<SessionSummary> = sessions.into_iter().rev().collect();
        assert_eq!(aggregator.best_session(&reversed).unwrap().id, "second");
    }

    #[test]
    fn test_only_zero_duration_sessions() {
        let stats = DashboardAggregator::new().aggregate(&[summary("x", 5, 400.0, 0)]);
        assert_eq!(stats.best_speed_cards_per_min, 0.0);
        assert_eq!(stats.best_session_id, None);
        assert_eq!(stats.average_time_ms, 400.0);
    }

    #[test]
    fn test_trend_is_recent_window_oldest_first() {
        // Newest first, as the store returns them
        let sessions: Vec<SessionSummary> = (0..12)
            .rev()
            .map(|i| {
                let mut s = summary(&format!("s{}", i), 10, 100.0 * i as f64, 60);
                s.start_time = s.start_time + Duration::days(i);
                s
            })
            .collect();

        let trend = DashboardAggregator::new().trend(&sessions, 10);
        assert_eq!(trend.len(), 10);
        assert_eq!(trend[0].session_id, "s2");
        assert_eq!(trend[0].label, "Session 1");
        assert_eq!(trend[9].session_id, "s11");
        assert_eq!(trend[9].cards_per_min, Some(10.0));
        assert!(trend.windows(2).all(|w| w[0].start_time < w[1].start_time));
    }

    #[test]
    fn test_recent() {
        let sessions = vec![summary("a", 1, 1.0, 1), summary("b", 1, 1.0, 1)];
        let aggregator = DashboardAggregator::new();
        assert_eq!(aggregator.recent(&sessions, 5).len(), 2);
        assert_eq!(aggregator.recent(&sessions, 1)[0].id, "a");
    }
}
