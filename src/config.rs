//! Drill configuration
//!
//! Read from `config.toml` in the data directory. Every field is optional;
//! a missing file means all defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::deck::{Card, Dealer, FULL_DECK_SIZE};
use crate::error::{DrillError, Result};
use crate::training::TimingSettings;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrillConfig {
    /// Think time between an observation and the next card
    pub card_delay_ms: u64,
    /// Delay before the first card of a run is shown
    pub reveal_delay_ms: u64,
    /// Elapsed-time refresh cadence
    pub tick_interval_ms: u64,
    /// Cards per deck in focused sessions
    pub focused_deck_size: usize,
    /// Sessions plotted in the progress trend
    pub trend_window: usize,
    /// Sessions listed on the dashboard and analysis picker
    pub recent_sessions: usize,
    /// Slowest cards shown in the timing chart
    pub chart_cards: usize,
    /// Problem cards listed under problem areas
    pub problem_cards_shown: usize,
    /// Recent observations shown during a live session
    pub recent_cards: usize,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            card_delay_ms: 1000,
            reveal_delay_ms: 500,
            tick_interval_ms: 1000,
            focused_deck_size: 12,
            trend_window: 10,
            recent_sessions: 5,
            chart_cards: 10,
            problem_cards_shown: 5,
            recent_cards: 9,
        }
    }
}

impl DrillConfig {
    /// Load `config.toml` from `data_dir`, falling back to defaults when absent
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| DrillError::Config(format!("Failed to read {:?}: {}", path, e)))?;
        let config = Self::from_toml(&content)?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| DrillError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.focused_deck_size == 0 || self.focused_deck_size > FULL_DECK_SIZE {
            return Err(DrillError::InvalidConfiguration(format!(
                "focusedDeckSize must be between 1 and {}, got {}",
                FULL_DECK_SIZE, self.focused_deck_size
            )));
        }
        if self.trend_window == 0 {
            return Err(DrillError::InvalidConfiguration(
                "trendWindow must be at least 1".to_string(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(DrillError::InvalidConfiguration(
                "tickIntervalMs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timing(&self) -> TimingSettings {
        TimingSettings {
            card_delay_ms: self.card_delay_ms,
            reveal_delay_ms: self.reveal_delay_ms,
            tick_interval_ms: self.tick_interval_ms,
        }
    }

    /// Dealer for a session: full decks without focus cards, focused decks otherwise
    pub fn dealer(&self, focus_cards: Vec<Card>) -> Result<Dealer> {
        if focus_cards.is_empty() {
            return Ok(Dealer::standard());
        }
        Dealer::new(focus_cards, self.focused_deck_size)
    }
}
