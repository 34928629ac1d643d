// src/supervisor/signal.rs

//! Delivery of the reload signal.
//!
//! On Linux the server is addressed through a pidfd opened right after spawn,
//! while the child is still unreaped. Once the child has been reaped the
//! pidfd stays bound to the dead process and signalling it fails with
//! `ESRCH`, so a recycled pid is never hit. Other unix platforms, and kernels
//! without pidfd support, fall back to `kill(2)` on the bare pid.

use std::io;

#[cfg(target_os = "linux")]
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

#[cfg(target_os = "linux")]
use tracing::debug;

/// Something SIGHUP can be sent to.
#[derive(Debug)]
pub(crate) struct SignalHandle {
    pid: u32,
    #[cfg(target_os = "linux")]
    pidfd: Option<OwnedFd>,
}

impl SignalHandle {
    /// Open a handle on `pid`.
    ///
    /// Must happen before the child is waited on, or the pidfd could end up
    /// naming whichever process reused the pid.
    pub(crate) fn open(pid: u32) -> Self {
        Self {
            pid,
            #[cfg(target_os = "linux")]
            pidfd: match pidfd_open(pid) {
                Ok(fd) => Some(fd),
                Err(e) => {
                    debug!(pid, error = %e, "pidfd unavailable, signalling by pid");
                    None
                }
            },
        }
    }

    #[cfg(target_os = "linux")]
    pub(crate) fn send_sighup(&self) -> io::Result<()> {
        match &self.pidfd {
            Some(pidfd) => pidfd_send_sighup(pidfd),
            None => kill_sighup(self.pid),
        }
    }

    #[cfg(not(target_os = "linux"))]
    pub(crate) fn send_sighup(&self) -> io::Result<()> {
        kill_sighup(self.pid)
    }
}

#[cfg(unix)]
fn to_pid(pid: u32) -> io::Result<libc::pid_t> {
    libc::pid_t::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))
}

#[cfg(target_os = "linux")]
fn pidfd_open(pid: u32) -> io::Result<OwnedFd> {
    let pid = to_pid(pid)?;
    // SAFETY: `pidfd_open` takes a pid and a flags word by value and doesn't touch our memory.
    let rc = unsafe { libc::syscall(libc::SYS_pidfd_open, pid, 0 as libc::c_uint) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }

    // SAFETY: On success the syscall returns a freshly opened descriptor that nothing else owns.
    Ok(unsafe { OwnedFd::from_raw_fd(rc as RawFd) })
}

#[cfg(target_os = "linux")]
fn pidfd_send_sighup(pidfd: &OwnedFd) -> io::Result<()> {
    // SAFETY: `pidfd` is an open pidfd we own for the duration of the call, and a null `siginfo` asks the kernel to
    // fill it in as `kill(2)` would.
    let rc = unsafe {
        libc::syscall(
            libc::SYS_pidfd_send_signal,
            pidfd.as_raw_fd(),
            libc::SIGHUP,
            std::ptr::null::<libc::siginfo_t>(),
            0 as libc::c_uint,
        )
    };
    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

#[cfg(unix)]
fn kill_sighup(pid: u32) -> io::Result<()> {
    let pid = to_pid(pid)?;
    // SAFETY: `kill` takes plain integers and has no memory safety requirements.
    let rc = unsafe { libc::kill(pid, libc::SIGHUP) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn kill_sighup(_pid: u32) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "reload signals need a unix platform",
    ))
}
