//! Managed process wrappers
//!
//! A managed process captures a display name, starts the OS process, and
//! exposes non-blocking status inspection plus graceful termination. Spawned
//! processes are placed in their own process group so that a termination
//! request covers any children they fork.

use schema::ProcessExit;

#[cfg(unix)]
pub mod unix;

#[cfg(unix)]
pub use unix::ManagedChild;

/// Result of a non-blocking liveness check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    /// The process is still running
    Running,
    /// The process has exited with the given status
    Exited(ProcessExit),
}

impl PollStatus {
    /// Whether the process is still running
    pub fn is_running(self) -> bool {
        matches!(self, PollStatus::Running)
    }
}
