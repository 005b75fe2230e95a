// src/engine/mod.rs

//! Orchestration engine for filterchain.
//!
//! This module ties together:
//! - the planner (input file + destination type → filter chain)
//! - the orchestrator that spawns and wires every stage
//! - the process tracker (pure pid → filter bookkeeping)
//! - the reaper that drains child exits into the tracker
//!
//! The pure state lives in [`tracker`]; the async/IO side is
//! [`orchestrator`] and [`reaper`].

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use crate::exec::ChildId;
use crate::types::JobOptions;

pub mod orchestrator;
pub mod planner;
pub mod reaper;
pub mod tracker;

pub use orchestrator::Orchestrator;
pub use planner::{Plan, plan_chain};
pub use tracker::{ChildProcess, ChildState, ProcessTracker, StageReport};

/// A child's exit as delivered by its watcher task.
#[derive(Debug)]
pub struct ChildExit {
    pub id: ChildId,
    pub status: io::Result<ExitStatus>,
}

/// One invocation: the file to convert and how to describe it to filters.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub input: PathBuf,
    pub options: JobOptions,
    pub title: String,
    /// Explicit PPD; wins over `$PPD` and the configured default.
    pub ppd: Option<PathBuf>,
    pub user: String,
}

impl JobRequest {
    /// Title defaults to the input's file name.
    pub fn new(input: impl Into<PathBuf>, user: impl Into<String>) -> Self {
        let input = input.into();
        let title = default_title(&input);
        Self {
            input,
            options: JobOptions::new(),
            title,
            ppd: None,
            user: user.into(),
        }
    }

    pub fn with_options(mut self, options: JobOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_ppd(mut self, ppd: impl Into<PathBuf>) -> Self {
        self.ppd = Some(ppd.into());
        self
    }
}

fn default_title(input: &Path) -> String {
    input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}

/// Aggregate outcome of one run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub success: bool,
    /// Number of children actually started.
    pub spawned: usize,
    /// Reaped stages in completion order.
    pub stages: Vec<StageReport>,
    /// Set when a stage could not be started.
    pub spawn_failure: Option<String>,
    /// Human-readable lines, in the order they happened.
    pub diagnostics: Vec<String>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_diagnostic(&mut self, line: impl Into<String>) {
        self.diagnostics.push(line.into());
    }

    pub fn push_stage(&mut self, stage: StageReport) {
        self.diagnostics.push(stage.to_string());
        self.stages.push(stage);
    }

    pub fn stage_for(&self, program: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.filter.program == program)
    }
}
