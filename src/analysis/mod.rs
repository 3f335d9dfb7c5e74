//! Post-session analytics
//!
//! This module provides:
//! - Per-card timing aggregates and problem-card detection for one session
//! - Rule-based recommendations
//! - Dashboard rollups and trend series across the whole history

pub mod dashboard;
pub mod models;
pub mod performance;
pub mod recommendations;

pub use dashboard::DashboardAggregator;
pub use models::*;
pub use performance::{problem_threshold, PerformanceAnalyzer, PROBLEM_CARD_FACTOR};
pub use recommendations::{RecommendationEngine, LONG_SESSION_SECS};
