use std::collections::HashMap;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nix::errno::Errno;

use filterchain::exec::{
    ChildId, LaunchedChild, ProcessLauncher, SlotKind, SpawnError, SpawnRequest,
};

/// What the fake does for a given program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeOutcome {
    Exit(i32),
    Signal(i32),
    /// Fail the fork with this errno.
    SpawnError(i32),
}

/// One `spawn` call as seen by the fake.
#[derive(Debug, Clone)]
pub struct SpawnRecord {
    pub executable: PathBuf,
    pub argv: Vec<String>,
    pub envp: Vec<(String, String)>,
    pub stdin: SlotKind,
    pub stdout: SlotKind,
    /// `None` when the spawn was made to fail.
    pub pid: Option<ChildId>,
}

impl SpawnRecord {
    pub fn env(&self, name: &str) -> Option<&str> {
        self.envp
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A launcher that:
/// - records every spawn request
/// - closes the descriptors it is handed
/// - reports a scripted exit status (default: exit 0), optionally after a delay.
///
/// Programs are matched by executable file name.
pub struct FakeLauncher {
    outcomes: HashMap<String, FakeOutcome>,
    delays: HashMap<String, Duration>,
    records: Arc<Mutex<Vec<SpawnRecord>>>,
    next_pid: AtomicU32,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
            delays: HashMap::new(),
            records: Arc::new(Mutex::new(Vec::new())),
            next_pid: AtomicU32::new(1000),
        }
    }

    pub fn with_outcome(mut self, program: &str, outcome: FakeOutcome) -> Self {
        self.outcomes.insert(program.to_string(), outcome);
        self
    }

    pub fn with_delay(mut self, program: &str, delay: Duration) -> Self {
        self.delays.insert(program.to_string(), delay);
        self
    }

    pub fn records(&self) -> Vec<SpawnRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl Default for FakeLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessLauncher for FakeLauncher {
    fn spawn(&self, request: SpawnRequest) -> Result<LaunchedChild, SpawnError> {
        let name = request
            .executable
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let outcome = self
            .outcomes
            .get(&name)
            .copied()
            .unwrap_or(FakeOutcome::Exit(0));
        let delay = self.delays.get(&name).copied();

        let pid = match outcome {
            FakeOutcome::SpawnError(_) => None,
            _ => Some(self.next_pid.fetch_add(1, Ordering::SeqCst)),
        };

        self.records.lock().unwrap().push(SpawnRecord {
            executable: request.executable.clone(),
            argv: request.argv.clone(),
            envp: request.envp.clone(),
            stdin: request.stdin.kind(),
            stdout: request.stdout.kind(),
            pid,
        });

        // Dropping the request closes any descriptors it carried.
        let program = request.executable.display().to_string();
        drop(request);

        let raw = match outcome {
            FakeOutcome::SpawnError(errno) => {
                return Err(SpawnError::Fork {
                    program,
                    source: Errno::from_raw(errno),
                });
            }
            FakeOutcome::Exit(code) => code << 8,
            FakeOutcome::Signal(signal) => signal,
        };

        Ok(LaunchedChild {
            id: pid.expect("pid assigned for non-failing outcome"),
            exit: Box::pin(async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok(ExitStatus::from_raw(raw))
            }),
        })
    }
}
