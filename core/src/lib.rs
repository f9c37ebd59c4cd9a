//! Core functionality for the stagehand pipeline supervisor
//!
//! This crate contains the supervision primitives shared by the runner
//! binary: ephemeral URI handles, managed child processes, the one-shot
//! launcher for preparation steps, and the group supervisor loop.

pub mod error;
#[cfg(unix)]
pub mod launcher;
pub mod process;
pub mod supervisor;
pub mod uri;

pub use error::{CoreError, Result};
pub use uri::{ScopedUri, UriSchema};

/// Core utilities and helper functions
pub mod utils {
    use tracing::info;

    /// Initialize tracing for the application
    pub fn init_tracing(level: &str) -> crate::Result<()> {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| crate::CoreError::InitializationError(e.to_string()))?;

        info!("Tracing initialized with level: {}", level);
        Ok(())
    }
}
