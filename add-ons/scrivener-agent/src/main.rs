//! Scrivener capture agent: default microphone → fixed chunks → gateway
//! transcription → buffered relay forwards. One meeting per process run.
//!
//! First Ctrl+C stops capture and drains the final partial segment; a
//! second Ctrl+C abandons the drain.

use scrivener_capture::buffer::TranscriptBuffer;
use scrivener_capture::chunker::ChunkedCapture;
use scrivener_capture::push::PushRelay;
use scrivener_capture::relay::{PullRelay, RelayChannel};
use scrivener_capture::session::CaptureSession;
use scrivener_capture::source::MicSegmentSource;
use scrivener_capture::transcribe::TranscribeClient;
use scrivener_core::config::ScrivenerConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CAPTURE_EVENT_BUFFER: usize = 64;

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!(
            "[scrivener-agent] .env not loaded: {} (using system environment)",
            e
        );
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ScrivenerConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(target: "scrivener::capture", "Configuration failed to load: {}", e);
            std::process::exit(1);
        }
    };

    let meeting_id = uuid::Uuid::new_v4().to_string();
    let push_mode = config.relay_mode == "push";

    let relay: Box<dyn RelayChannel> = if push_mode {
        Box::new(PushRelay::new(&config.relay_url))
    } else {
        match PullRelay::new(
            &config.relay_url,
            Duration::from_secs(config.poll_interval_secs),
        ) {
            Ok(r) => Box::new(r),
            Err(e) => {
                tracing::error!(target: "scrivener::relay", "Relay client failed to build: {}", e);
                std::process::exit(1);
            }
        }
    };
    // Push batches words before forwarding; pull forwards on every new word
    // and lets readers poll at their own pace.
    let forward_threshold = if push_mode {
        config.forward_threshold_words
    } else {
        1
    };

    let speech = match TranscribeClient::new(&config.relay_url) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(target: "scrivener::speech", "Transcription client failed to build: {}", e);
            std::process::exit(1);
        }
    };

    let capture = Arc::new(ChunkedCapture::new(Duration::from_secs(config.chunk_secs)));
    let (tx, events) = mpsc::channel(CAPTURE_EVENT_BUFFER);
    if !capture.start(|| Ok(MicSegmentSource::new()), tx) {
        tracing::error!(target: "scrivener::capture", "Capture already running");
        std::process::exit(1);
    }

    let session = CaptureSession::new(meeting_id.clone(), forward_threshold);
    let mut buffer = TranscriptBuffer::new(config.buffer_cap_words);

    tracing::info!(
        target: "scrivener::capture",
        "Capturing meeting {} ({} relay to {}, {}s chunks)",
        meeting_id,
        config.relay_mode,
        config.relay_url,
        config.chunk_secs
    );

    let pipeline = session.run(events, &speech, &mut buffer, relay.as_ref());
    tokio::pin!(pipeline);

    tokio::select! {
        _ = &mut pipeline => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(target: "scrivener::capture", "Stop requested, draining final segment");
            let capture_stop = Arc::clone(&capture);
            let stop_task = tokio::task::spawn_blocking(move || capture_stop.stop());
            tokio::select! {
                _ = &mut pipeline => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::warn!(target: "scrivener::capture", "Abandoning drain, late fragments dropped");
                    session.deactivate();
                    pipeline.await;
                }
            }
            let _ = stop_task.await;
        }
    }

    tracing::info!(target: "scrivener::capture", "Capture session {} ended", meeting_id);
}
