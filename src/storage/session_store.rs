//! Session history persistence
//!
//! History is append-only and read newest first. The JSON store keeps every
//! summary in a single array file, the same layout the browser version keeps
//! under its `trainingSessions` key:
//! ```text
//! {data-dir}/
//! └── training_sessions.json   # Array of SessionSummary, newest first
//! ```

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;

use crate::training::SessionSummary;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data directory not found")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Get the default data directory
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|p| p.join("memodrill"))
        .ok_or(StorageError::DataDirNotFound)
}

/// Append-only store of completed sessions
pub trait SessionStore {
    /// Every stored summary, newest first
    fn load_all(&self) -> Result<Vec<SessionSummary>>;

    /// Durably add a summary; it becomes the newest entry
    fn append(&mut self, summary: SessionSummary) -> Result<()>;

    fn get(&self, id: &str) -> Result<Option<SessionSummary>> {
        Ok(self.load_all()?.into_iter().find(|s| s.id == id))
    }

    fn latest(&self) -> Result<Option<SessionSummary>> {
        Ok(self.load_all()?.into_iter().next())
    }
}

/// In-memory store for tests and throwaway runs
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Vec<SessionSummary>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn load_all(&self) -> Result<Vec<SessionSummary>> {
        Ok(self.sessions.clone())
    }

    fn append(&mut self, summary: SessionSummary) -> Result<()> {
        self.sessions.insert(0, summary);
        Ok(())
    }
}

/// File-backed store
pub struct JsonSessionStore {
    data_dir: PathBuf,
}

impl JsonSessionStore {
    /// Create the store, making the data directory if needed
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    /// Get the path to the sessions file
    pub fn sessions_file(&self) -> PathBuf {
        self.data_dir.join("training_sessions.json")
    }

    fn save_sessions(&self, sessions: &[SessionSummary]) -> Result<()> {
        let json = serde_json::to_string_pretty(sessions)?;
        let target = self.sessions_file();
        let temp = target.with_extension("json.tmp");

        // Write aside and swap in so a crash never leaves a torn history
        let mut file = fs::File::create(&temp)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp, &target)?;
        Ok(())
    }
}

impl SessionStore for JsonSessionStore {
    fn load_all(&self) -> Result<Vec<SessionSummary>> {
        let path = self.sessions_file();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let sessions: Vec<SessionSummary> = serde_json::from_str(&content)?;
        Ok(sessions)
    }

    fn append(&mut self, summary: SessionSummary) -> Result<()> {
        let mut sessions = self.load_all()?;
        log::info!(
            "Saving session {} ({} cards, {} stored)",
            summary.id,
            summary.card_count,
            sessions.len() + 1
        );
        sessions.insert(0, summary);
        self.save_sessions(&sessions)
    }
}
