//! Runner configuration
//!
//! All pipeline parameters have fixed defaults; a TOML file can override
//! them. Validation is strict and reports field-path error messages.

use schema::ExecutableRef;
use serde::Deserialize;
use stagehand_core::{CoreError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Parameters of the supervised pipeline
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RunnerConfig {
    /// Frames per second of the generated test clip
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    /// Duration of the generated test clip in seconds
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u32,

    /// Frame size as `<width>x<height>`
    #[serde(default = "default_frame_size")]
    pub frame_size: String,

    /// Wait between starting the producer and the consumer. A fixed delay
    /// standing in for readiness detection; it can race under load.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Interval between supervisor poll ticks
    #[serde(default = "default_poll_tick_ms")]
    pub poll_tick_ms: u64,

    /// Directory the generated clip is written into
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// Path of the local socket shared by producer and consumer
    #[serde(default = "default_stream_socket")]
    pub stream_socket: PathBuf,

    /// Muxer executable for the preparation step
    #[serde(default = "default_muxer")]
    pub muxer: ExecutableRef,

    /// Producer executable serving the clip
    #[serde(default = "default_producer")]
    pub producer: ExecutableRef,

    /// Consumer executable playing the stream
    #[serde(default = "default_consumer")]
    pub consumer: ExecutableRef,
}

fn default_frame_rate() -> u32 {
    5
}

fn default_duration_secs() -> u32 {
    10
}

fn default_frame_size() -> String {
    "512x512".to_string()
}

fn default_settle_delay_ms() -> u64 {
    500
}

fn default_poll_tick_ms() -> u64 {
    1000
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_stream_socket() -> PathBuf {
    PathBuf::from("/tmp/input_stream_socket")
}

fn default_muxer() -> ExecutableRef {
    ExecutableRef::Path(PathBuf::from("build/bin/muxing"))
}

fn default_producer() -> ExecutableRef {
    ExecutableRef::Name("ffmpeg".to_string())
}

fn default_consumer() -> ExecutableRef {
    ExecutableRef::Name("ffplay".to_string())
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            duration_secs: default_duration_secs(),
            frame_size: default_frame_size(),
            settle_delay_ms: default_settle_delay_ms(),
            poll_tick_ms: default_poll_tick_ms(),
            scratch_dir: default_scratch_dir(),
            stream_socket: default_stream_socket(),
            muxer: default_muxer(),
            producer: default_producer(),
            consumer: default_consumer(),
        }
    }
}

impl RunnerConfig {
    /// Settle delay as a Duration
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Poll tick interval as a Duration
    pub fn poll_tick(&self) -> Duration {
        Duration::from_millis(self.poll_tick_ms)
    }

    /// Validate the configuration with field-path error messages
    pub fn validate(&self) -> Result<()> {
        if self.frame_rate == 0 {
            return Err(CoreError::ValidationError(
                "frameRate: must be > 0".to_string(),
            ));
        }
        if self.duration_secs == 0 {
            return Err(CoreError::ValidationError(
                "durationSecs: must be > 0".to_string(),
            ));
        }
        if !is_frame_size(&self.frame_size) {
            return Err(CoreError::ValidationError(format!(
                "frameSize: expected <width>x<height>, got '{}'",
                self.frame_size
            )));
        }
        if self.poll_tick_ms == 0 {
            return Err(CoreError::ValidationError(
                "pollTickMs: must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_frame_size(value: &str) -> bool {
    match value.split_once('x') {
        Some((w, h)) => {
            w.parse::<u32>().map_or(false, |v| v > 0) && h.parse::<u32>().map_or(false, |v| v > 0)
        }
        None => false,
    }
}

/// Load a runner configuration from a TOML file path
pub fn load_from_toml_path(path: impl AsRef<Path>) -> Result<RunnerConfig> {
    let data = fs::read_to_string(&path).map_err(|e| {
        CoreError::ConfigurationError(format!("failed to read config {:?}: {}", path.as_ref(), e))
    })?;
    load_from_toml_str(&data)
}

/// Load a runner configuration from a TOML string
pub fn load_from_toml_str(input: &str) -> Result<RunnerConfig> {
    let config: RunnerConfig = toml::from_str(input)
        .map_err(|e| CoreError::ConfigurationError(format!("TOML parse error: {}", e)))?;
    config.validate()?;
    Ok(config)
}
