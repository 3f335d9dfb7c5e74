//! Cancellable timers for card delivery and elapsed-time ticks
//!
//! The recorder never sleeps. It asks a `Scheduler` to fire a `TimerTask`
//! after a delay and the host hands fired timers back through
//! `SessionRecorder::handle_timer`. Two schedulers are provided:
//! - `ManualScheduler` advances virtual time on demand (tests, replays)
//! - `TokioScheduler` uses tokio timers and delivers through an mpsc channel

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Handle returned by `Scheduler::schedule`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Deal and present the next card
    DrawCard,
    /// Refresh the elapsed-time display
    ElapsedTick,
}

/// A timer whose delay has passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    pub id: TimerId,
    pub task: TimerTask,
}

pub trait Scheduler: Send {
    fn schedule(&mut self, delay_ms: u64, task: TimerTask) -> TimerId;

    /// Cancelling an unknown or already fired timer is a no-op
    fn cancel(&mut self, id: TimerId);
}

#[derive(Debug, Default)]
struct ManualState {
    now_ms: u64,
    next_id: u64,
    pending: Vec<(TimerId, u64, TimerTask)>,
}

/// Virtual-time scheduler. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move virtual time forward and return every timer now due, earliest first
    pub fn advance(&self, ms: u64) -> Vec<FiredTimer> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.now_ms += ms;
        let now = state.now_ms;

        let mut due: Vec<(TimerId, u64, TimerTask)> = Vec::new();
        state.pending.retain(|entry| {
            if entry.1 <= now {
                due.push(*entry);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|(id, at, _)| (*at, id.0));

        due.into_iter()
            .map(|(id, _, task)| FiredTimer { id, task })
            .collect()
    }

    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .len()
    }

    pub fn has_pending(&self, task: TimerTask) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .iter()
            .any(|(_, _, t)| *t == task)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay_ms: u64, task: TimerTask) -> TimerId {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.next_id += 1;
        let id = TimerId(state.next_id);
        let due = state.now_ms + delay_ms;
        state.pending.push((id, due, task));
        id
    }

    fn cancel(&mut self, id: TimerId) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.pending.retain(|(pending_id, _, _)| *pending_id != id);
    }
}

/// Tokio-backed scheduler. Must be used from within a tokio runtime.
pub struct TokioScheduler {
    sender: mpsc::UnboundedSender<FiredTimer>,
    handles: HashMap<TimerId, JoinHandle<()>>,
    next_id: u64,
}

impl TokioScheduler {
    /// Create the scheduler and the receiver fired timers arrive on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FiredTimer>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender,
                handles: HashMap::new(),
                next_id: 0,
            },
            receiver,
        )
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, delay_ms: u64, task: TimerTask) -> TimerId {
        self.handles.retain(|_, handle| !handle.is_finished());

        self.next_id += 1;
        let id = TimerId(self.next_id);
        let sender = self.sender.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            // Receiver gone means the session loop has ended
            let _ = sender.send(FiredTimer { id, task });
        });
        self.handles.insert(id, handle);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(handle) = self.handles.remove(&id) {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }
}
