//! stagehand - supervised media pipeline runner
//!
//! Launches the muxer preparation step, the ffmpeg producer, and the ffplay
//! consumer, then supervises the group until the first exit tears it down.

use clap::Parser;
use runner::{config, pipeline, RunnerConfig};
use stagehand_core::supervisor::UnixProcessAdapter;
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "stagehand", version, about = "Supervised media pipeline runner")]
struct Cli {
    /// Path to a TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> stagehand_core::Result<()> {
    let cli = Cli::parse();
    stagehand_core::utils::init_tracing(&cli.log_level)?;

    let config = match &cli.config {
        Some(path) => config::load_from_toml_path(path)?,
        None => RunnerConfig::default(),
    };

    let (event_tx, mut event_rx) = broadcast::channel(256);
    tokio::spawn(async move {
        while let Ok(event) = event_rx.recv().await {
            debug!(?event, "pipeline event");
        }
    });

    let adapter = UnixProcessAdapter::new();
    pipeline::run(&config, &adapter, event_tx).await?;

    info!("exiting...");
    Ok(())
}
