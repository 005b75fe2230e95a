// src/exec/error.rs

use std::io;

use thiserror::Error;

/// Why a stage could not be started.
///
/// Any of these stops the orchestrator from spawning later stages; stages
/// that are already running are still reaped. A program that exists but
/// cannot be executed is not a spawn error: its child exits with the errno.
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("unable to create pipe: {0}")]
    Pipe(#[source] nix::Error),

    #[error("unable to prepare descriptor: {0}")]
    Descriptor(#[source] io::Error),

    #[error("{program}: argument or environment contains a NUL byte")]
    InvalidArgument { program: String },

    #[error("unable to fork for {program}: {source}")]
    Fork {
        program: String,
        #[source]
        source: nix::Error,
    },
}

impl SpawnError {
    /// OS error number behind the failure, if there is one.
    pub fn errno(&self) -> Option<i32> {
        match self {
            SpawnError::Pipe(e) | SpawnError::Fork { source: e, .. } => Some(*e as i32),
            SpawnError::Descriptor(e) => e.raw_os_error(),
            SpawnError::InvalidArgument { .. } => None,
        }
    }
}
