//! Per-card timing analysis and problem-card detection

use std::cmp::Ordering;
use std::collections::HashMap;

use super::models::{CardAggregate, SessionAnalysis};
use crate::deck::Card;
use crate::training::SessionSummary;

/// A card is a problem card when its average exceeds the session mean by this factor
pub const PROBLEM_CARD_FACTOR: f64 = 1.2;

#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceAnalyzer;

impl PerformanceAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Group a session's observations by card and flag slow cards.
    ///
    /// Aggregates come back slowest first; equal averages keep the order in
    /// which the cards were first seen. An empty session yields empty lists.
    pub fn analyze(&self, summary: &SessionSummary) -> SessionAnalysis {
        if summary.observations.is_empty() {
            log::warn!("Session {} has no observations to analyze", summary.id);
            return SessionAnalysis::default();
        }

        // (card, total ms, count) in first-seen order
        let mut buckets: Vec<(Card, f64, usize)> = Vec::new();
        let mut index: HashMap<Card, usize> = HashMap::new();

        for observation in &summary.observations {
            let slot = *index.entry(observation.card).or_insert_with(|| {
                buckets.push((observation.card, 0.0, 0));
                buckets.len() - 1
            });
            buckets[slot].1 += observation.viewing_time_ms;
            buckets[slot].2 += 1;
        }

        let mut aggregates: Vec<CardAggregate> = buckets
            .into_iter()
            .map(|(card, total, count)| CardAggregate {
                card,
                occurrences: count,
                average_time_ms: total / count as f64,
            })
            .collect();

        // sort_by is stable, so ties stay in first-seen order
        aggregates.sort_by(|a, b| {
            b.average_time_ms
                .partial_cmp(&a.average_time_ms)
                .unwrap_or(Ordering::Equal)
        });

        let threshold = problem_threshold(summary.average_viewing_time_ms);
        let problem_cards: Vec<CardAggregate> = aggregates
            .iter()
            .filter(|aggregate| aggregate.average_time_ms > threshold)
            .cloned()
            .collect();

        log::debug!(
            "Session {}: {} distinct cards, {} problem cards (threshold {:.1}ms)",
            summary.id,
            aggregates.len(),
            problem_cards.len(),
            threshold
        );

        SessionAnalysis {
            aggregates,
            problem_cards,
        }
    }
}

/// Viewing time above which a card counts as a problem card
pub fn problem_threshold(session_average_ms: f64) -> f64 {
    session_average_ms * PROBLEM_CARD_FACTOR
}
