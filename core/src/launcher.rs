//! One-shot launcher for preparation steps
//!
//! Runs a single executable to completion before the supervised group
//! starts. The exit status is surfaced but deliberately not interpreted:
//! a caller needing stronger guarantees must check it itself.

use crate::process::ManagedChild;
use crate::Result;
use schema::{ProcessExit, ProcessSpec};
use tracing::info;

/// Spawn the process described by `spec` and block until it exits.
///
/// Spawn failures propagate like any managed-process start; a missing
/// executable is fatal for the session.
pub async fn run_to_completion(spec: &ProcessSpec) -> Result<ProcessExit> {
    let mut child = ManagedChild::start(spec)?;
    let exit = child.wait().await?;
    info!("'{}' ran to completion: {:?}", child.name(), exit);
    Ok(exit)
}
