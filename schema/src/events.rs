//! Event types emitted by the pipeline supervisor
//!
//! Events provide observability into the supervised group: member start and
//! exit, the preparation step finishing, and group-wide termination. They
//! are serializable and broadcast best-effort to any number of subscribers.

use crate::process::ProcessExit;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Events emitted by the pipeline supervisor
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "eventType", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PipelineEvent {
    /// The one-shot preparation step has run to completion
    PrepFinished {
        /// Display name of the preparation command
        command: String,
        /// Event timestamp in RFC3339 format
        timestamp: String,
    },

    /// A supervised member process has started
    MemberStarted {
        /// Display name of the member
        name: String,
        /// Process ID of the started member
        pid: u32,
        /// Event timestamp in RFC3339 format
        timestamp: String,
    },

    /// A supervised member process has exited
    MemberExited {
        /// Display name of the member
        name: String,
        /// Exit code, if the process returned one
        #[serde(skip_serializing_if = "Option::is_none")]
        exit_code: Option<i32>,
        /// Signal that stopped the process, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        signal: Option<i32>,
        /// Event timestamp in RFC3339 format
        timestamp: String,
    },

    /// An exit was observed and the whole group is being terminated
    GroupTerminating {
        /// Event timestamp in RFC3339 format
        timestamp: String,
    },

    /// Every member has been sent a termination request; the session is over
    GroupEnded {
        /// Event timestamp in RFC3339 format
        timestamp: String,
    },
}

impl PipelineEvent {
    /// Current time in simple RFC3339 format (second precision)
    pub fn current_timestamp() -> String {
        humantime::format_rfc3339_seconds(SystemTime::now()).to_string()
    }

    /// Create a prep-finished event
    #[must_use]
    pub fn prep_finished(command: String) -> Self {
        Self::PrepFinished {
            command,
            timestamp: Self::current_timestamp(),
        }
    }

    /// Create a member-started event
    #[must_use]
    pub fn member_started(name: String, pid: u32) -> Self {
        Self::MemberStarted {
            name,
            pid,
            timestamp: Self::current_timestamp(),
        }
    }

    /// Create a member-exited event
    #[must_use]
    pub fn member_exited(name: String, exit: ProcessExit) -> Self {
        Self::MemberExited {
            name,
            exit_code: exit.exit_code,
            signal: exit.signal,
            timestamp: Self::current_timestamp(),
        }
    }

    /// Create a group-terminating event
    #[must_use]
    pub fn group_terminating() -> Self {
        Self::GroupTerminating {
            timestamp: Self::current_timestamp(),
        }
    }

    /// Create a group-ended event
    #[must_use]
    pub fn group_ended() -> Self {
        Self::GroupEnded {
            timestamp: Self::current_timestamp(),
        }
    }
}
