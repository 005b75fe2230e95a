// src/exec/mod.rs

//! Process execution layer.
//!
//! Everything needed to start a single filter process lives here; wiring
//! several of them together is the job of [`crate::engine`].
//!
//! - [`options`] encodes job options into the argv[5] string.
//! - [`environment`] builds the fixed argv/envp contract.
//! - [`resolve`] finds the real executable (and extra env) per platform.
//! - [`pipes`] provides the close-on-exec pipe between two stages.
//! - [`launcher`] provides the `ProcessLauncher` trait and the
//!   `fork`/`execve` backed `OsProcessLauncher`.

pub mod environment;
pub mod error;
pub mod launcher;
pub mod options;
pub mod pipes;
pub mod resolve;

pub use environment::{FilterEnvironment, PROGRAM_NAME, StageArguments, current_user_name};
pub use error::SpawnError;
pub use launcher::{
    ChildId, ExitFuture, LaunchedChild, OsProcessLauncher, ProcessLauncher, SlotKind,
    SpawnRequest, StdioSlot,
};
pub use options::encode_options;
pub use pipes::PipeSlot;
pub use resolve::{
    BundleLinkResolver, DirectResolver, ExecutableResolver, ResolvedExecutable, platform_resolver,
};
