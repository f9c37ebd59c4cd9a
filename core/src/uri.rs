//! Ephemeral URI handles with scoped cleanup
//!
//! A [`ScopedUri`] names a schema-qualified location (a file path or a local
//! socket endpoint) shared between a producer and a consumer process. The
//! handle constructs no file itself; whichever process writes to the
//! location creates it. When the handle's owning scope ends, the backing
//! file is removed: explicitly via [`ScopedUri::release`] (which surfaces
//! unexpected I/O errors to the caller), or as a best-effort drop backstop
//! covering abnormal exit paths.

use crate::{CoreError, Result};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Transport kind of a shared resource location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriSchema {
    /// Regular file
    File,
    /// Unix domain socket
    Unix,
}

impl UriSchema {
    /// The schema tag as rendered into an address string
    pub fn as_str(self) -> &'static str {
        match self {
            UriSchema::File => "file",
            UriSchema::Unix => "unix",
        }
    }
}

impl fmt::Display for UriSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, schema-qualified location whose backing file is deleted when
/// the handle is released.
#[derive(Debug)]
pub struct ScopedUri {
    schema: UriSchema,
    path: PathBuf,
    released: bool,
}

impl ScopedUri {
    /// Store a schema and path. No file is created; file creation is the
    /// responsibility of the process that writes to the location.
    pub fn new(schema: UriSchema, path: impl Into<PathBuf>) -> Self {
        Self {
            schema,
            path: path.into(),
            released: false,
        }
    }

    /// The rendered locator string, exactly `<schema>:<path>` with no
    /// escaping. This is what gets passed to child process arguments.
    pub fn address(&self) -> String {
        format!("{}:{}", self.schema, self.path.display())
    }

    /// Backing filesystem path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Transport kind of this location
    pub fn schema(&self) -> UriSchema {
        self.schema
    }

    /// Delete the backing file, at most once per handle.
    ///
    /// A missing file is not an error: the goal (nothing left behind) is
    /// already satisfied. Any other deletion failure is returned to the
    /// caller rather than swallowed. Calling `release` again after the
    /// first attempt is a no-op.
    pub fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("removed '{}'", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::ResourceRelease {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

impl Drop for ScopedUri {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        // Backstop for abnormal exit paths; errors can only be logged here.
        if let Err(e) = self.release() {
            warn!("{}", e);
        }
    }
}
