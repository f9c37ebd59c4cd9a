//! Schema definitions for stagehand
//!
//! This crate contains the shared data structures used across the stagehand
//! workspace. All types here implement JSON Schema generation for external
//! consumption.

pub mod events;
pub mod process;

pub use events::PipelineEvent;
pub use process::{ExecutableRef, ProcessExit, ProcessSpec};
