// src/engine/tracker.rs

//! Pure bookkeeping for running children.
//!
//! The tracker maps each live pid to the filter it was started for and
//! turns exit statuses into per-stage reports. It has no channels, no Tokio
//! types and performs no IO, so it can be driven directly from tests.

use std::collections::HashMap;
use std::fmt;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use crate::engine::ChildExit;
use crate::exec::ChildId;
use crate::types::FilterSpec;

/// Lifecycle of one child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    Running,
    Exited(i32),
    Signaled(i32),
    /// Waiting on the child failed; its status is unknown.
    Lost,
}

impl ChildState {
    pub fn from_status(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => ChildState::Exited(code),
            (None, Some(signal)) => ChildState::Signaled(signal),
            (None, None) => ChildState::Lost,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ChildState::Exited(0))
    }
}

/// A child the tracker is still waiting for.
#[derive(Debug, Clone)]
pub struct ChildProcess {
    pub id: ChildId,
    pub filter: FilterSpec,
    pub state: ChildState,
}

/// Final word on one stage, produced when its child is reaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub id: ChildId,
    pub filter: FilterSpec,
    pub state: ChildState,
    /// Extra context when waiting failed.
    pub detail: Option<String>,
}

impl StageReport {
    pub fn is_success(&self) -> bool {
        self.state.is_success()
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = &self.filter.program;
        let pid = self.id;
        match self.state {
            ChildState::Exited(0) => write!(f, "{name} (PID {pid}) exited with no errors."),
            ChildState::Exited(code) => write!(f, "{name} (PID {pid}) stopped with status {code}!"),
            ChildState::Signaled(sig) => write!(f, "{name} (PID {pid}) crashed on signal {sig}!"),
            ChildState::Lost => write!(
                f,
                "{name} (PID {pid}) could not be waited for: {}",
                self.detail.as_deref().unwrap_or("unknown error")
            ),
            ChildState::Running => write!(f, "{name} (PID {pid}) is still running."),
        }
    }
}

/// Live pid → filter map plus the aggregate failure flag.
///
/// The flag only ever goes from `false` to `true`.
#[derive(Debug, Default)]
pub struct ProcessTracker {
    live: HashMap<ChildId, ChildProcess>,
    failed: bool,
    reaped: usize,
}

impl ProcessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: ChildId, filter: FilterSpec) {
        self.live.insert(
            id,
            ChildProcess {
                id,
                filter,
                state: ChildState::Running,
            },
        );
    }

    /// Record a completion. Returns `None` for pids we never started.
    pub fn complete(&mut self, exit: ChildExit) -> Option<StageReport> {
        let mut child = self.live.remove(&exit.id)?;

        let detail = match exit.status {
            Ok(status) => {
                child.state = ChildState::from_status(status);
                None
            }
            Err(e) => {
                child.state = ChildState::Lost;
                Some(e.to_string())
            }
        };

        self.reaped += 1;
        if !child.state.is_success() {
            self.failed = true;
        }

        Some(StageReport {
            id: child.id,
            filter: child.filter,
            state: child.state,
            detail,
        })
    }

    /// Force the aggregate result to failure (e.g. a spawn error).
    pub fn mark_failed(&mut self) {
        self.failed = true;
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn get(&self, id: ChildId) -> Option<&ChildProcess> {
        self.live.get(&id)
    }

    pub fn reaped(&self) -> usize {
        self.reaped
    }
}
