// tests/descriptor_leaks.rs

//! Lives in its own test binary: counting `/proc/self/fd` is only meaningful
//! when no other test is opening files at the same time.

#![cfg(target_os = "linux")]

use std::error::Error;
use std::fs;
use std::os::fd::OwnedFd;
use std::path::Path;
use std::sync::Arc;

use filterchain::engine::{JobRequest, Orchestrator, RunReport};
use filterchain::exec::{DirectResolver, OsProcessLauncher};
use filterchain::types::FilterChain;
use filterchain_test_utils::builders::{ChainBuilder, fixed_env, server_config};
use filterchain_test_utils::{filter_fixture, init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn open_descriptors() -> std::io::Result<usize> {
    Ok(fs::read_dir("/proc/self/fd")?.count())
}

async fn run_once(chain: &FilterChain, input: &Path, output: &Path) -> std::io::Result<RunReport> {
    let out = OwnedFd::from(fs::File::create(output)?);
    let orch = Orchestrator::new(Arc::new(server_config(filter_fixture().dir())), OsProcessLauncher)
        .with_resolver(Box::new(DirectResolver))
        .with_env_lookup(fixed_env(&[("LANG", "C")]))
        .with_output(out);

    Ok(with_timeout(orch.run(chain, &JobRequest::new(input, "alice"))).await)
}

#[tokio::test]
async fn parent_descriptors_are_released_after_every_run() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input.txt");
    let output = dir.path().join("output");
    fs::write(&input, b"leak check\n")?;

    let good = ChainBuilder::new()
        .stage("passthru")
        .stage("upper")
        .stage("quote")
        .stage("passthru")
        .build();
    let broken = ChainBuilder::new()
        .stage("passthru")
        .stage("upper")
        .stage("does-not-exist")
        .stage("passthru")
        .build();
    let failing = ChainBuilder::new().stage("passthru").stage("fail3").build();

    // Warm up lazily created runtime resources (signal driver, blocking pool).
    assert!(run_once(&good, &input, &output).await?.success);
    let baseline = open_descriptors()?;

    for _ in 0..5 {
        assert!(run_once(&good, &input, &output).await?.success);
        assert!(!run_once(&broken, &input, &output).await?.success);
        assert!(!run_once(&failing, &input, &output).await?.success);
    }

    assert_eq!(open_descriptors()?, baseline);
    assert_eq!(fs::read_to_string(&output)?, "");
    Ok(())
}
