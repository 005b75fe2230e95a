// src/exec/resolve.rs

//! Pluggable "where does this executable really live" step.
//!
//! On most platforms the path is used as-is ([`DirectResolver`]). On macOS,
//! filters are often symlinks into an application bundle and need
//! `CFProcessPath` pointing at the real binary to find their resources
//! ([`BundleLinkResolver`]). [`platform_resolver`] picks one at build time.

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

/// An executable path plus any environment entries the resolver wants to add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExecutable {
    pub path: PathBuf,
    pub extra_env: Vec<(String, String)>,
}

pub trait ExecutableResolver: Send + Sync + Debug {
    fn resolve(&self, executable: &Path) -> ResolvedExecutable;
}

/// Identity resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectResolver;

impl ExecutableResolver for DirectResolver {
    fn resolve(&self, executable: &Path) -> ResolvedExecutable {
        ResolvedExecutable {
            path: executable.to_path_buf(),
            extra_env: Vec::new(),
        }
    }
}

/// Adds `CFProcessPath` naming the symlink target (or the path itself when
/// it is not a link). Relative targets are joined to the link's directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleLinkResolver;

pub const PROCESS_PATH_VAR: &str = "CFProcessPath";

impl ExecutableResolver for BundleLinkResolver {
    fn resolve(&self, executable: &Path) -> ResolvedExecutable {
        let process_path = match fs::read_link(executable) {
            Ok(target) if target.is_absolute() => target,
            Ok(target) => executable
                .parent()
                .map(|dir| dir.join(&target))
                .unwrap_or(target),
            Err(_) => executable.to_path_buf(),
        };

        ResolvedExecutable {
            path: executable.to_path_buf(),
            extra_env: vec![(
                PROCESS_PATH_VAR.to_string(),
                process_path.display().to_string(),
            )],
        }
    }
}

#[cfg(target_os = "macos")]
pub fn platform_resolver() -> Box<dyn ExecutableResolver> {
    Box::new(BundleLinkResolver)
}

#[cfg(not(target_os = "macos"))]
pub fn platform_resolver() -> Box<dyn ExecutableResolver> {
    Box::new(DirectResolver)
}
