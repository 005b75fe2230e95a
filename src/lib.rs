// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod mime;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{ServerConfig, default_config_path, load_and_validate, process_env};
use crate::engine::{JobRequest, Orchestrator, Plan, plan_chain};
use crate::exec::{OsProcessLauncher, current_user_name};
use crate::mime::{MimeDatabase, MimeType};
use crate::types::JobOptions;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - MIME detection and chain resolution
/// - the orchestrator and the real process launcher
///
/// Returns `Ok(true)` when every filter succeeded, `Ok(false)` when a filter
/// failed, and `Err` for setup problems (nothing was spawned).
pub async fn run(args: CliArgs) -> Result<bool> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| default_config_path(&process_env));
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("unable to read configuration \"{}\"", config_path.display()))?;

    let server = Arc::new(ServerConfig::resolve(&cfg.paths, &config_path, &process_env));
    debug!(?server, "resolved server paths");

    let db = MimeDatabase::from_config(&cfg)?;
    let dest: MimeType = args.mime_type.parse()?;

    let plan = plan_chain(&db, &db, &args.file, &dest, &cfg.decompress_filter)?;

    if args.dry_run {
        print_dry_run(&plan, &server);
        return Ok(true);
    }

    let job = job_from_args(&args);
    let orchestrator = Orchestrator::new(server, OsProcessLauncher);
    let report = orchestrator.run(&plan.chain, &job).await;

    Ok(report.success)
}

/// Build the job description from the command line.
pub fn job_from_args(args: &CliArgs) -> JobRequest {
    let mut options = JobOptions::new();
    for opt in args.options.iter() {
        options.parse_into(opt);
    }
    if let Some(ref copies) = args.copies {
        options.add(JobOptions::COPIES, copies.clone());
    }

    let mut job = JobRequest::new(args.file.clone(), current_user_name(&process_env))
        .with_options(options);
    if let Some(ref title) = args.title {
        job = job.with_title(title.clone());
    }
    if let Some(ref ppd) = args.ppd {
        job = job.with_ppd(PathBuf::from(ppd));
    }
    job
}

/// Simple dry-run output: detected type and the filters that would run.
///
/// Goes to stderr; stdout is reserved for converted data.
fn print_dry_run(plan: &Plan, server: &ServerConfig) {
    eprintln!("filterchain dry-run");
    eprintln!(
        "  source = {}{}",
        plan.source.mime,
        if plan.source.compressed { " (gzip)" } else { "" }
    );
    eprintln!("  dest   = {}", plan.dest);
    eprintln!();

    if plan.chain.is_empty() {
        eprintln!("no filters (input copied unchanged)");
        return;
    }

    eprintln!("filters ({}):", plan.chain.len());
    for filter in plan.chain.iter() {
        eprintln!("  - {}", filter.program);
        eprintln!("      path: {}", server.program_path(&filter.program).display());
        if filter.cost > 0 {
            eprintln!("      cost: {}", filter.cost);
        }
    }

    debug!("dry-run complete (no execution)");
}
