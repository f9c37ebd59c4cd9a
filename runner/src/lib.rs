//! Pipeline assembly for the stagehand runner
//!
//! Wires the supervision primitives from `stagehand-core` into the fixed
//! media pipeline: a one-shot muxer preparation step, an ffmpeg producer
//! serving the clip over a local socket, and an ffplay consumer.

pub mod config;
pub mod pipeline;

pub use config::RunnerConfig;
