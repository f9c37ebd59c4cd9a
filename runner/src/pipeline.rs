//! Pipeline assembly and supervision
//!
//! Runs the fixed sequence: muxer preparation step, producer, settle delay,
//! consumer, then the group poll loop until the first exit tears everything
//! down. Both shared locations are released on the way out.

use crate::config::RunnerConfig;
use schema::{PipelineEvent, ProcessSpec};
use stagehand_core::supervisor::{ProcessAdapter, ProcessGroup};
use stagehand_core::{Result, ScopedUri, UriSchema};
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::info;

/// Run one supervision session to completion.
///
/// The session ends when any group member exits; the preparation step's
/// exit code is not interpreted. Spawn failures (missing executables) are
/// fatal and propagate to the caller.
pub async fn run(
    config: &RunnerConfig,
    adapter: &dyn ProcessAdapter,
    event_tx: broadcast::Sender<PipelineEvent>,
) -> Result<()> {
    info!("starting...");

    let clip_name = format!(
        "dummy_{}_{}s_{}hz.mp4",
        config.frame_size, config.duration_secs, config.frame_rate
    );
    let mut clip = ScopedUri::new(UriSchema::File, config.scratch_dir.join(clip_name));
    let mut stream = ScopedUri::new(UriSchema::Unix, config.stream_socket.clone());

    let prep = muxer_spec(config, &clip);
    adapter.run_to_completion(&prep).await?;
    let _ = event_tx.send(PipelineEvent::prep_finished(prep.display_name()));

    let mut group = ProcessGroup::new(config.poll_tick(), event_tx);

    group.push(adapter.spawn(&producer_spec(config, &clip, &stream)).await?);

    // Give the producer time to open its listening socket before the
    // consumer connects. This is a fixed delay, not a readiness handshake,
    // and can race under slow start-up.
    sleep(config.settle_delay()).await;

    group.push(adapter.spawn(&consumer_spec(config, &stream)).await?);

    group.watch().await?;

    clip.release()?;
    stream.release()?;

    Ok(())
}

/// Preparation step: build the fixed-duration test clip
fn muxer_spec(config: &RunnerConfig, clip: &ScopedUri) -> ProcessSpec {
    ProcessSpec::new(
        config.muxer.clone(),
        vec![
            "--output-uri".to_string(),
            clip.address(),
            "--size".to_string(),
            config.frame_size.clone(),
            "--duration".to_string(),
            config.duration_secs.to_string(),
            "--frame-rate".to_string(),
            config.frame_rate.to_string(),
        ],
    )
}

/// Producer: transcode the clip and serve it on the shared socket
fn producer_spec(config: &RunnerConfig, clip: &ScopedUri, stream: &ScopedUri) -> ProcessSpec {
    ProcessSpec::new(
        config.producer.clone(),
        vec![
            "-loglevel".to_string(),
            "0".to_string(),
            "-i".to_string(),
            clip.address(),
            "-c".to_string(),
            "h264".to_string(),
            "-f".to_string(),
            "mpegts".to_string(),
            "-listen".to_string(),
            "1".to_string(),
            stream.address(),
        ],
    )
}

/// Consumer: play from the shared socket, exiting when the stream ends
fn consumer_spec(config: &RunnerConfig, stream: &ScopedUri) -> ProcessSpec {
    ProcessSpec::new(
        config.consumer.clone(),
        vec![
            "-i".to_string(),
            stream.address(),
            "-autoexit".to_string(),
        ],
    )
}
