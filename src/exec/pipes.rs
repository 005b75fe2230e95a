// src/exec/pipes.rs

use std::os::fd::{AsRawFd, OwnedFd};

use nix::fcntl::{FcntlArg, FdFlag, fcntl};
use nix::unistd::pipe;

/// A pipe connecting two adjacent stages.
///
/// Both ends are close-on-exec: a child only ever sees the end that was
/// explicitly duplicated onto its stdin or stdout, so a stray write end can
/// never keep a downstream reader from seeing EOF. Dropping an end closes it.
#[derive(Debug)]
pub struct PipeSlot {
    read: OwnedFd,
    write: OwnedFd,
}

impl PipeSlot {
    pub fn open() -> nix::Result<Self> {
        let (read, write) = pipe()?;
        set_cloexec(&read)?;
        set_cloexec(&write)?;
        Ok(Self { read, write })
    }

    /// Split into `(read, write)`.
    pub fn into_ends(self) -> (OwnedFd, OwnedFd) {
        (self.read, self.write)
    }
}

fn set_cloexec(fd: &OwnedFd) -> nix::Result<()> {
    let raw = fd.as_raw_fd();
    let flags = FdFlag::from_bits_truncate(fcntl(raw, FcntlArg::F_GETFD)?);
    fcntl(raw, FcntlArg::F_SETFD(flags | FdFlag::FD_CLOEXEC))?;
    Ok(())
}
