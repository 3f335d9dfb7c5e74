//! Live training sessions
//!
//! This module provides:
//! - The `SessionRecorder` state machine (start/pause/resume/reset/close)
//! - Per-card timing capture and running statistics
//! - Clock and scheduler seams so sessions run without real waiting in tests
//! - `SessionSummarizer` for closing a session into a `SessionSummary`

pub mod clock;
pub mod events;
pub mod models;
pub mod recorder;
pub mod scheduler;
pub mod summarizer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use events::{EventLog, NoopListener, SessionEvent, SessionListener};
pub use models::*;
pub use recorder::{ClosedSession, SessionRecorder, TimingSettings};
pub use scheduler::{FiredTimer, ManualScheduler, Scheduler, TimerId, TimerTask, TokioScheduler};
pub use summarizer::{summarize, SessionSummarizer};
