//! Unix implementation of the managed process wrapper
//!
//! Children are spawned in their own process group via `setsid()`, so a
//! single SIGTERM to the group reaches the member and anything it forked.
//! Status inspection goes through `try_wait` and never blocks; the first
//! observed exit is cached so later polls keep reporting the same status.

// Process group setup requires a libc::setsid() call in pre_exec
#![allow(unsafe_code)]

use super::PollStatus;
use crate::{CoreError, Result};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use schema::{ProcessExit, ProcessSpec};
use std::io::ErrorKind;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use tokio::process::{Child, Command};
use tracing::{debug, error, info};

/// One spawned external executable under supervision
#[derive(Debug)]
pub struct ManagedChild {
    /// Display name derived from the executable reference
    name: String,
    /// Process group leader ID (same as the PID)
    pid: Pid,
    /// Underlying child handle for status checks
    child: Child,
    /// Cached exit status, set on first observation
    exit: Option<ProcessExit>,
}

fn exit_from_status(status: ExitStatus) -> ProcessExit {
    ProcessExit {
        exit_code: status.code(),
        signal: status.signal(),
    }
}

impl ManagedChild {
    /// Spawn the external process described by `spec` in its own process
    /// group.
    ///
    /// There is no observable "never started" state: this either returns a
    /// live handle or fails. A missing executable yields
    /// [`CoreError::MissingExecutable`] after an error-level diagnostic;
    /// callers treat that as fatal for the whole session.
    pub fn start(spec: &ProcessSpec) -> Result<Self> {
        let name = spec.display_name();
        debug!("spawning '{}' {:?}", name, spec.args);

        let mut command = Command::new(spec.executable.program());
        command.args(&spec.args);

        // Safety: setsid() is async-signal-safe and appropriate in pre_exec
        unsafe {
            command.pre_exec(|| {
                if libc::setsid() == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }

        let child = command.spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                error!("executable '{}' not found", name);
                CoreError::MissingExecutable(name.clone())
            } else {
                error!("failed to spawn '{}': {}", name, e);
                CoreError::ProcessSpawn(format!("failed to spawn '{}': {}", name, e))
            }
        })?;

        let raw_pid = child.id().ok_or_else(|| {
            CoreError::ProcessSpawn(format!("spawned child '{}' did not have a PID", name))
        })?;
        let pid = Pid::from_raw(raw_pid as i32);
        info!("started '{}' (pid {})", name, pid);

        Ok(Self {
            name,
            pid,
            child,
            exit: None,
        })
    }

    /// Display name of this process
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Process ID
    pub fn pid(&self) -> u32 {
        self.pid.as_raw() as u32
    }

    /// Non-blocking liveness check.
    ///
    /// The first time a non-running state is observed an info entry naming
    /// the process is emitted. The exit status is cached: once exited,
    /// every later poll reports the same status.
    pub fn poll(&mut self) -> Result<PollStatus> {
        if let Some(exit) = self.exit {
            return Ok(PollStatus::Exited(exit));
        }

        match self.child.try_wait() {
            Ok(Some(status)) => {
                let exit = exit_from_status(status);
                self.exit = Some(exit);
                info!("'{}' has stopped", self.name);
                Ok(PollStatus::Exited(exit))
            }
            Ok(None) => Ok(PollStatus::Running),
            Err(e) => Err(CoreError::ProcessWait(format!(
                "failed to poll '{}' (pid {}): {}",
                self.name, self.pid, e
            ))),
        }
    }

    /// Block until the process exits and return its exit status
    pub async fn wait(&mut self) -> Result<ProcessExit> {
        if let Some(exit) = self.exit {
            return Ok(exit);
        }

        let status = self.child.wait().await.map_err(|e| {
            CoreError::ProcessWait(format!(
                "failed to wait for '{}' (pid {}): {}",
                self.name, self.pid, e
            ))
        })?;
        let exit = exit_from_status(status);
        self.exit = Some(exit);
        debug!("'{}' exited: {:?}", self.name, exit);
        Ok(exit)
    }

    /// Request graceful termination: SIGTERM to the process group.
    ///
    /// ESRCH and EPERM are tolerated as success; they mean the group is
    /// already gone, so the goal is satisfied.
    pub fn terminate(&self) -> Result<()> {
        debug!("sending SIGTERM to process group {}", self.pid);

        match killpg(self.pid, Signal::SIGTERM) {
            Ok(()) => Ok(()),
            Err(nix::errno::Errno::ESRCH) => {
                debug!("process group {} already exited", self.pid);
                Ok(())
            }
            Err(nix::errno::Errno::EPERM) => {
                debug!(
                    "permission denied signaling process group {} (likely already exited)",
                    self.pid
                );
                Ok(())
            }
            Err(e) => {
                error!("failed to send SIGTERM to process group {}: {}", self.pid, e);
                Err(CoreError::ProcessSignal(format!(
                    "failed to send SIGTERM to process group {}: {}",
                    self.pid, e
                )))
            }
        }
    }
}
