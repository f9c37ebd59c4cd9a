//! Process specification types for the stagehand supervisor
//!
//! A [`ProcessSpec`] describes one external executable to run: what to
//! execute and the ordered argument list passed to it verbatim, with no
//! shell interpretation. The process inherits the caller's environment.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::PathBuf;

/// Reference to an executable, either by filesystem path or by a bare
/// command name resolved via the environment's search path.
///
/// The display name used in logs is derived per variant: the basename for a
/// path, the name itself for a bare command.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ExecutableRef {
    /// Absolute or relative path to an executable file
    Path(PathBuf),
    /// Bare command name, resolved via PATH
    Name(String),
}

impl ExecutableRef {
    /// Human-readable name for log entries
    pub fn display_name(&self) -> String {
        match self {
            ExecutableRef::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            ExecutableRef::Name(name) => name.clone(),
        }
    }

    /// The program string handed to the OS spawn call
    pub fn program(&self) -> &OsStr {
        match self {
            ExecutableRef::Path(path) => path.as_os_str(),
            ExecutableRef::Name(name) => OsStr::new(name),
        }
    }
}

/// Specification for one spawned process: executable plus ordered arguments
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSpec {
    /// Executable to run
    pub executable: ExecutableRef,

    /// Command-line arguments, passed verbatim in order
    #[serde(default)]
    pub args: Vec<String>,
}

impl ProcessSpec {
    /// Create a new process specification
    pub fn new(executable: ExecutableRef, args: Vec<String>) -> Self {
        Self { executable, args }
    }

    /// Display name of the underlying executable
    pub fn display_name(&self) -> String {
        self.executable.display_name()
    }
}

/// How a process exited: a code if it returned one, otherwise the signal
/// that stopped it (Unix).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessExit {
    /// Exit code, if the process returned one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    /// Signal number that stopped the process, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<i32>,
}

impl ProcessExit {
    /// An exit with the given code and no signal
    pub fn with_code(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            signal: None,
        }
    }

    /// Whether the process exited with code zero
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_of_path_is_basename() {
        let exe = ExecutableRef::Path(PathBuf::from("build/bin/muxing"));
        assert_eq!(exe.display_name(), "muxing");
    }

    #[test]
    fn display_name_of_bare_command_is_itself() {
        let exe = ExecutableRef::Name("ffmpeg".to_string());
        assert_eq!(exe.display_name(), "ffmpeg");
    }

    #[test]
    fn program_preserves_full_path() {
        let exe = ExecutableRef::Path(PathBuf::from("build/bin/muxing"));
        assert_eq!(exe.program(), OsStr::new("build/bin/muxing"));
    }

    #[test]
    fn spec_roundtrips_through_json() {
        let spec = ProcessSpec::new(
            ExecutableRef::Name("ffplay".to_string()),
            vec!["-i".to_string(), "unix:/tmp/sock".to_string()],
        );
        let json = serde_json::to_string(&spec).unwrap();
        let back: ProcessSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn exit_success_requires_code_zero() {
        assert!(ProcessExit::with_code(0).success());
        assert!(!ProcessExit::with_code(1).success());
        assert!(!ProcessExit {
            exit_code: None,
            signal: Some(15)
        }
        .success());
    }
}
