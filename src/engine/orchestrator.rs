// src/engine/orchestrator.rs

use std::fmt;
use std::io;
use std::os::fd::OwnedFd;
use std::path::Path;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::{ServerConfig, process_env};
use crate::engine::reaper::{drain, watch_child};
use crate::engine::tracker::ProcessTracker;
use crate::engine::{ChildExit, JobRequest, RunReport};
use crate::exec::{
    ExecutableResolver, FilterEnvironment, LaunchedChild, PipeSlot, ProcessLauncher,
    SpawnError, SpawnRequest, StageArguments, StdioSlot, platform_resolver,
};
use crate::types::{FilterChain, FilterSpec};

const EXIT_CHANNEL_CAPACITY: usize = 32;

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Runs a filter chain: one process per stage, each stage's stdout piped
/// into the next stage's stdin, then waits for all of them.
///
/// At most two pipes are open in the parent at any time: the read end that
/// feeds the stage being spawned, and the fresh pipe for the stage after it.
/// Ownership closes everything else as soon as each spawn returns.
pub struct Orchestrator<L: ProcessLauncher> {
    config: Arc<ServerConfig>,
    launcher: L,
    resolver: Box<dyn ExecutableResolver>,
    lookup: EnvLookup,
    /// Where the last stage writes. `None` means our own stdout.
    output: Option<OwnedFd>,
}

impl<L: ProcessLauncher> fmt::Debug for Orchestrator<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

impl<L: ProcessLauncher> Orchestrator<L> {
    pub fn new(config: Arc<ServerConfig>, launcher: L) -> Self {
        Self {
            config,
            launcher,
            resolver: platform_resolver(),
            lookup: Box::new(process_env),
            output: None,
        }
    }

    pub fn with_resolver(mut self, resolver: Box<dyn ExecutableResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace how inherited variables (`LANG`, `PPD`, ...) are read.
    pub fn with_env_lookup(
        mut self,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.lookup = Box::new(lookup);
        self
    }

    /// Send the final stage's output somewhere other than our stdout.
    pub fn with_output(mut self, output: OwnedFd) -> Self {
        self.output = Some(output);
        self
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run every stage of `chain` over `job.input` and wait for all of them.
    ///
    /// A spawn failure stops further spawning, but stages already running
    /// are still reaped before this returns.
    pub async fn run(&self, chain: &FilterChain, job: &JobRequest) -> RunReport {
        if chain.is_empty() {
            return self.passthrough(job).await;
        }

        let env = FilterEnvironment::build(&self.config, job.ppd.as_deref(), &job.user, &*self.lookup);
        let args = StageArguments::new(&job.user, &job.title, &job.options);

        info!(
            input = %job.input.display(),
            stages = chain.len(),
            filters = ?chain.programs(),
            "starting filter chain"
        );

        let (tx, mut rx) = mpsc::channel::<ChildExit>(EXIT_CHANNEL_CAPACITY);
        let mut tracker = ProcessTracker::new();
        let mut report = RunReport::new();

        // Read end of the pipe feeding the next stage.
        let mut upstream: Option<OwnedFd> = None;
        // Only the first stage gets the file name.
        let mut filename: Option<&Path> = Some(job.input.as_path());

        let mut stages = chain.iter().peekable();
        while let Some(filter) = stages.next() {
            let is_last = stages.peek().is_none();

            match self.launch_stage(filter, &env, &args, filename, upstream.take(), is_last) {
                Ok((child, next_read)) => {
                    let line = format!("{} (PID {}) started.", filter.program, child.id);
                    info!(filter = %filter, pid = child.id, "{line}");
                    report.push_diagnostic(line);

                    tracker.register(child.id, filter.clone());
                    watch_child(child, tx.clone());
                    report.spawned += 1;
                    upstream = next_read;
                }
                Err(err) => {
                    let line = format!("{} could not be started: {err}", filter.program);
                    error!(filter = %filter, errno = ?err.errno(), "{line}");
                    report.push_diagnostic(line.clone());
                    report.spawn_failure = Some(line);
                    tracker.mark_failed();
                    break;
                }
            }

            filename = None;
        }

        drop(upstream);
        drop(tx);

        drain(&mut tracker, &mut rx, &mut report).await;

        report.success = !tracker.failed();
        debug!(
            success = report.success,
            spawned = report.spawned,
            reaped = tracker.reaped(),
            "filter chain finished"
        );
        report
    }

    /// Spawn one stage. Returns the child and, if a later stage exists, the
    /// read end of the pipe it writes to.
    ///
    /// Every descriptor passed in or created here is either moved into the
    /// returned value or closed before returning.
    fn launch_stage(
        &self,
        filter: &FilterSpec,
        env: &FilterEnvironment,
        args: &StageArguments,
        filename: Option<&Path>,
        upstream: Option<OwnedFd>,
        is_last: bool,
    ) -> Result<(LaunchedChild, Option<OwnedFd>), SpawnError> {
        let resolved = self
            .resolver
            .resolve(&self.config.program_path(&filter.program));

        let stdin = match upstream {
            Some(fd) => StdioSlot::Fd(fd),
            None => StdioSlot::Inherit,
        };

        let (stdout, next_read) = if is_last {
            (self.final_output()?, None)
        } else {
            let (read, write) = PipeSlot::open().map_err(SpawnError::Pipe)?.into_ends();
            (StdioSlot::Fd(write), Some(read))
        };

        let request = SpawnRequest {
            executable: resolved.path,
            argv: args.argv(filename),
            envp: env.for_stage(&resolved.extra_env),
            stdin,
            stdout,
        };

        let child = self.launcher.spawn(request)?;
        Ok((child, next_read))
    }

    fn final_output(&self) -> Result<StdioSlot, SpawnError> {
        match &self.output {
            Some(fd) => fd.try_clone().map(StdioSlot::Fd).map_err(SpawnError::Descriptor),
            None => Ok(StdioSlot::Inherit),
        }
    }

    /// Nothing to convert: copy the input straight to the output.
    async fn passthrough(&self, job: &JobRequest) -> RunReport {
        let mut report = RunReport::new();

        match self.copy_input(&job.input).await {
            Ok(bytes) => {
                info!(input = %job.input.display(), bytes, "no filters needed; copied input");
                report.success = true;
            }
            Err(e) => {
                let line = format!("unable to copy \"{}\": {e}", job.input.display());
                error!("{line}");
                report.push_diagnostic(line);
            }
        }

        report
    }

    async fn copy_input(&self, input: &Path) -> io::Result<u64> {
        let mut src = tokio::fs::File::open(input).await?;

        match &self.output {
            Some(fd) => {
                let mut dst = tokio::fs::File::from_std(std::fs::File::from(fd.try_clone()?));
                let copied = tokio::io::copy(&mut src, &mut dst).await?;
                dst.flush().await?;
                Ok(copied)
            }
            None => {
                let mut out = tokio::io::stdout();
                let copied = tokio::io::copy(&mut src, &mut out).await?;
                out.flush().await?;
                Ok(copied)
            }
        }
    }
}
