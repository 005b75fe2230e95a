// src/exec/launcher.rs

//! Launch one filter process.
//!
//! The orchestrator talks to a [`ProcessLauncher`] rather than forking
//! directly, so tests can swap in a fake that never forks.

use std::ffi::CString;
use std::fmt;
use std::fs::OpenOptions;
use std::future::Future;
use std::io;
use std::iter;
use std::mem::MaybeUninit;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::ExitStatus;
use std::ptr;

use nix::errno::Errno;
use nix::libc;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, fork};
use tracing::trace;

use super::error::SpawnError;

/// OS-assigned identity of a running filter (its pid).
pub type ChildId = u32;

/// Resolves once the child has exited.
pub type ExitFuture = Pin<Box<dyn Future<Output = io::Result<ExitStatus>> + Send>>;

/// Descriptors 3 and 4 are reopened on `/dev/null` (non-blocking) in every
/// child. Some filters write to them unconditionally.
const AUX_DESCRIPTORS: [RawFd; 2] = [3, 4];

/// What a child's stdin or stdout is bound to.
#[derive(Debug)]
pub enum StdioSlot {
    /// Leave the canonical descriptor as inherited from us.
    Inherit,
    /// Bind to `/dev/null`: reads see EOF, writes are discarded.
    Null,
    /// Duplicate this descriptor onto the canonical slot. The parent's copy
    /// is closed once the spawn call returns.
    Fd(OwnedFd),
}

/// Descriptor-free summary of a [`StdioSlot`], handy for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Inherit,
    Null,
    Fd,
}

impl StdioSlot {
    pub fn kind(&self) -> SlotKind {
        match self {
            StdioSlot::Inherit => SlotKind::Inherit,
            StdioSlot::Null => SlotKind::Null,
            StdioSlot::Fd(_) => SlotKind::Fd,
        }
    }

    /// The descriptor to duplicate in the child, or `None` to inherit.
    fn into_source(self) -> io::Result<Option<OwnedFd>> {
        match self {
            StdioSlot::Inherit => Ok(None),
            StdioSlot::Null => {
                let null = OpenOptions::new().read(true).write(true).open("/dev/null")?;
                Ok(Some(OwnedFd::from(null)))
            }
            StdioSlot::Fd(fd) => Ok(Some(fd)),
        }
    }
}

/// Everything needed to start one stage.
#[derive(Debug)]
pub struct SpawnRequest {
    pub executable: PathBuf,
    /// Full argv, including argv[0].
    pub argv: Vec<String>,
    /// Complete environment; nothing is inherited.
    pub envp: Vec<(String, String)>,
    pub stdin: StdioSlot,
    pub stdout: StdioSlot,
}

/// A started child: its pid and a handle that resolves to its exit status.
pub struct LaunchedChild {
    pub id: ChildId,
    pub exit: ExitFuture,
}

impl fmt::Debug for LaunchedChild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchedChild")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Trait abstracting how filter processes are started.
///
/// Production code uses [`OsProcessLauncher`]; tests provide their own
/// implementation that records requests and fabricates exit statuses.
pub trait ProcessLauncher: Send + Sync {
    /// Start one process. The descriptors inside `request` are consumed:
    /// whatever the outcome, the caller's copies are closed on return.
    fn spawn(&self, request: SpawnRequest) -> Result<LaunchedChild, SpawnError>;
}

/// Launcher built on `fork` + `execve`.
///
/// A program that cannot be executed still counts as started: the child
/// exits with the `execve` errno as its status and is reaped like any other
/// stage. Only failing to fork is a [`SpawnError`].
///
/// The exit future waits on a blocking-pool thread, so it must be polled
/// inside a Tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsProcessLauncher;

impl ProcessLauncher for OsProcessLauncher {
    fn spawn(&self, request: SpawnRequest) -> Result<LaunchedChild, SpawnError> {
        let SpawnRequest {
            executable,
            argv,
            envp,
            stdin,
            stdout,
        } = request;
        let program = executable.display().to_string();

        trace!(
            program = %program,
            stdin = ?stdin.kind(),
            stdout = ?stdout.kind(),
            "spawning filter process"
        );

        let stdin = stdin.into_source().map_err(SpawnError::Descriptor)?;
        let stdout = stdout.into_source().map_err(SpawnError::Descriptor)?;
        let image = ExecImage::new(&executable, &argv, &envp).ok_or_else(|| {
            SpawnError::InvalidArgument {
                program: program.clone(),
            }
        })?;
        let sigmask = empty_sigset();

        let stdin_fd = stdin.as_ref().map(AsRawFd::as_raw_fd);
        let stdout_fd = stdout.as_ref().map(AsRawFd::as_raw_fd);

        // SAFETY: the child only touches memory prepared above and calls
        // async-signal-safe functions until it execs or exits.
        let pid = match unsafe { fork() } {
            Ok(ForkResult::Child) => unsafe { exec_child(&image, stdin_fd, stdout_fd, &sigmask) },
            Ok(ForkResult::Parent { child }) => child,
            Err(source) => return Err(SpawnError::Fork { program, source }),
        };

        // `stdin`, `stdout` and `image` drop here, closing the parent's copies.
        Ok(LaunchedChild {
            id: pid.as_raw() as ChildId,
            exit: Box::pin(async move {
                tokio::task::spawn_blocking(move || wait_for(pid))
                    .await
                    .map_err(io::Error::other)?
            }),
        })
    }
}

/// Path, argv and envp as C strings plus their NULL-terminated pointer
/// arrays, all built before forking.
struct ExecImage {
    path: CString,
    _argv: Vec<CString>,
    _envp: Vec<CString>,
    argv_ptrs: Vec<*const libc::c_char>,
    envp_ptrs: Vec<*const libc::c_char>,
}

impl ExecImage {
    /// `None` if anything contains an interior NUL byte.
    fn new(executable: &Path, argv: &[String], envp: &[(String, String)]) -> Option<Self> {
        let path = CString::new(executable.as_os_str().as_bytes()).ok()?;
        let argv = argv
            .iter()
            .map(|arg| CString::new(arg.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .ok()?;
        let envp = envp
            .iter()
            .map(|(name, value)| CString::new(format!("{name}={value}")))
            .collect::<Result<Vec<_>, _>>()
            .ok()?;

        let argv_ptrs = null_terminated(&argv);
        let envp_ptrs = null_terminated(&envp);

        Some(Self {
            path,
            _argv: argv,
            _envp: envp,
            argv_ptrs,
            envp_ptrs,
        })
    }
}

fn null_terminated(strings: &[CString]) -> Vec<*const libc::c_char> {
    strings
        .iter()
        .map(|s| s.as_ptr())
        .chain(iter::once(ptr::null()))
        .collect()
}

fn empty_sigset() -> libc::sigset_t {
    let mut set = MaybeUninit::<libc::sigset_t>::uninit();
    // SAFETY: sigemptyset initialises the whole set.
    unsafe {
        libc::sigemptyset(set.as_mut_ptr());
        set.assume_init()
    }
}

/// Runs in the forked child and never returns.
///
/// Binds stdin/stdout, reopens 3 and 4 on non-blocking `/dev/null`, restores
/// default signal handling, then execs. On any failure the child exits with
/// the errno as its status.
unsafe fn exec_child(
    image: &ExecImage,
    stdin: Option<RawFd>,
    stdout: Option<RawFd>,
    sigmask: &libc::sigset_t,
) -> ! {
    unsafe {
        for (source, target) in [(stdin, 0), (stdout, 1)] {
            if let Some(fd) = source {
                bind(fd, target);
            }
        }

        for fd in AUX_DESCRIPTORS {
            libc::close(fd);
            let null = libc::open(c"/dev/null".as_ptr(), libc::O_RDWR);
            if null < 0 {
                fail();
            }
            if null != fd {
                bind(null, fd);
                libc::close(null);
            }
            if libc::fcntl(fd, libc::F_SETFL, libc::O_NONBLOCK) < 0 {
                fail();
            }
        }

        // The Rust runtime ignores SIGPIPE; filters expect the default.
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        libc::pthread_sigmask(libc::SIG_SETMASK, sigmask, ptr::null_mut());

        libc::execve(
            image.path.as_ptr(),
            image.argv_ptrs.as_ptr(),
            image.envp_ptrs.as_ptr(),
        );
        fail()
    }
}

/// Make `target` refer to `fd`, without close-on-exec.
unsafe fn bind(fd: RawFd, target: RawFd) {
    unsafe {
        let rc = if fd == target {
            libc::fcntl(fd, libc::F_SETFD, 0)
        } else {
            libc::dup2(fd, target)
        };
        if rc < 0 {
            fail();
        }
    }
}

unsafe fn fail() -> ! {
    unsafe { libc::_exit(Errno::last() as i32) }
}

/// Block until `pid` terminates and translate its wait status.
fn wait_for(pid: Pid) -> io::Result<ExitStatus> {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => {
                return Ok(ExitStatus::from_raw((code & 0xff) << 8));
            }
            Ok(WaitStatus::Signaled(_, signal, core_dumped)) => {
                let core = if core_dumped { 0x80 } else { 0 };
                return Ok(ExitStatus::from_raw(signal as i32 | core));
            }
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(e) => return Err(io::Error::from(e)),
        }
    }
}
