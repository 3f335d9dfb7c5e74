use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use memodrill_lib::storage::{self, JsonSessionStore, SessionStore};
use memodrill_lib::training::SessionSummary;
use memodrill_lib::DrillConfig;

/// Shared application state for CLI commands
pub struct App {
    pub data_dir: PathBuf,
    pub config: DrillConfig,
    pub store: JsonSessionStore,
}

impl App {
    /// Initialize from the given data directory, or the platform default
    pub fn new(data_dir: Option<&Path>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => storage::default_data_dir().context("Failed to get data directory")?,
        };

        let store = JsonSessionStore::new(data_dir.clone())
            .context("Failed to initialize session storage")?;
        let config = DrillConfig::load(&data_dir).context("Failed to load config.toml")?;

        Ok(Self {
            data_dir,
            config,
            store,
        })
    }

    /// All stored sessions, newest first
    pub fn sessions(&self) -> Result<Vec<SessionSummary>> {
        self.store.load_all().context("Failed to load sessions")
    }

    /// Find a session by id (exact, then prefix match), or the latest when `id` is None
    pub fn find_session(&self, id: Option<&str>) -> Result<SessionSummary> {
        let sessions = self.sessions()?;

        let Some(id) = id else {
            return sessions
                .into_iter()
                .next()
                .context("No sessions recorded yet. Run `memodrill-cli train` first.");
        };

        if let Some(session) = sessions.iter().find(|s| s.id == id) {
            return Ok(session.clone());
        }

        let matches: Vec<&SessionSummary> =
            sessions.iter().filter(|s| s.id.starts_with(id)).collect();

        match matches.len() {
            0 => bail!("No session matching '{}'", id),
            1 => Ok(matches[0].clone()),
            _ => bail!("Ambiguous session id '{}'. Matches:\n{}", id,
                matches.iter().map(|s| format!("  - {} ({})", s.id, s.start_time.format("%Y-%m-%d %H:%M")))
                    .collect::<Vec<_>>().join("\n")),
        }
    }

    pub fn save_session(&mut self, summary: SessionSummary) -> Result<()> {
        self.store.append(summary).context("Failed to save session")
    }
}
