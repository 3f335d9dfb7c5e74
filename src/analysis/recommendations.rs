//! Rule-based training advice
//!
//! Rules run in a fixed order and each contributes at most one item:
//! 1. Problem cards present: focus practice on the three slowest
//! 2. Session longer than five minutes: shorter, more frequent sessions
//! 3. Always: strengthen memory anchors for face cards
//! 4. Always: practice visualization

use super::models::{CardAggregate, Recommendation};
use crate::training::SessionSummary;

/// Sessions longer than this many seconds get the session-length advice
pub const LONG_SESSION_SECS: u64 = 300;

/// Problem cards named in the focus advice
const FOCUS_CARDS_NAMED: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    pub fn new() -> Self {
        Self
    }

    /// `problem_cards` must be ordered slowest first
    pub fn recommend(
        &self,
        summary: &SessionSummary,
        problem_cards: &[CardAggregate],
    ) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        if !problem_cards.is_empty() {
            let named: Vec<String> = problem_cards
                .iter()
                .take(FOCUS_CARDS_NAMED)
                .map(|aggregate| aggregate.card.to_string())
                .collect();
            recommendations.push(Recommendation {
                title: "Focus on slow cards".to_string(),
                description: format!(
                    "Create focused training sessions for {} which take longer to process.",
                    named.join(", ")
                ),
            });
        }

        if summary.duration_sec > LONG_SESSION_SECS {
            recommendations.push(Recommendation {
                title: "Optimize session length".to_string(),
                description: "Consider shorter, more frequent sessions as your speed decreases after 5 minutes of continuous training.".to_string(),
            });
        }

        recommendations.push(Recommendation {
            title: "Improve memory anchors".to_string(),
            description: "Create stronger mental associations for face cards which tend to take longer to memorize.".to_string(),
        });

        recommendations.push(Recommendation {
            title: "Practice visualization".to_string(),
            description: "Enhance your mental visualization techniques to form stronger memory associations faster.".to_string(),
        });

        recommendations
    }
}
