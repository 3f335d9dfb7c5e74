//! Training and analytics engine for timed playing-card memory drills.
//!
//! A session deals cards from a standard or focused deck, records how long
//! each card was on screen before the athlete acknowledged it, and closes
//! into a `SessionSummary`. Summaries feed per-session analysis (slow-card
//! detection, recommendations) and cross-session dashboard rollups.

pub mod analysis;
pub mod config;
pub mod deck;
pub mod error;
pub mod storage;
pub mod training;

pub use config::DrillConfig;
pub use error::{DrillError, Result};
