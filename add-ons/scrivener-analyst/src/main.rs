//! Scrivener analyst daemon: follow the live transcript, re-analyze on
//! significant growth, archive idle meetings.

use scrivener_console::{
    AnalysisTrigger, FollowerEvent, HttpTranscriptSource, MeetingArchive, TranscriptFollower,
};
use scrivener_core::config::ScrivenerConfig;
use scrivener_core::llm::{create_best_analysis, AnalysisBackend};
use scrivener_core::prompts::{live_notes_user_prompt, LIVE_NOTES_SYSTEM};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!(
            "[scrivener-analyst] .env not loaded: {} (using system environment)",
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
            tracing::error!(target: "scrivener::console", "Configuration failed to load: {}", e);
            std::process::exit(1);
        }
    };

    let source = match HttpTranscriptSource::new(&config.relay_url) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(target: "scrivener::console", "Transcript source failed to build: {}", e);
            std::process::exit(1);
        }
    };
    let archive = Arc::new(MeetingArchive::new(&config.archive_dir));
    let follower = TranscriptFollower::new(
        source,
        Duration::from_secs(config.poll_interval_secs),
        Duration::from_secs(config.idle_timeout_secs),
        config.autosave_min_chars,
    )
    .with_archive(Arc::clone(&archive));

    let analysis = create_best_analysis(&config);
    let mut trigger = AnalysisTrigger::new(
        config.analysis_trigger_words,
        config.analysis_window_words,
    );

    let (events_tx, mut events) = mpsc::channel(16);
    tokio::spawn(async move { follower.run(events_tx).await });

    tracing::info!(
        target: "scrivener::console",
        "Following transcripts at {} (archive in {})",
        config.relay_url,
        config.archive_dir
    );

    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                match maybe_event {
                    Some(FollowerEvent::Updated(update)) => {
                        if let Some(window) = trigger.observe(&update.text) {
                            analyze_and_archive(
                                analysis.as_ref(),
                                &archive,
                                &update.meeting_id,
                                &window,
                            )
                            .await;
                        }
                    }
                    Some(FollowerEvent::Idle { meeting_id, saved, .. }) => {
                        if saved {
                            tracing::info!(target: "scrivener::console", "Meeting {} went idle and was archived", meeting_id);
                        } else {
                            tracing::info!(target: "scrivener::console", "Meeting {} went idle (too short to archive)", meeting_id);
                        }
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(target: "scrivener::console", "Shutting down");
                break;
            }
        }
    }
}

/// One analysis pass: prompt the backend with the trailing window and fold
/// the notes into the meeting record. Failures are logged; the next trigger
/// retries naturally.
async fn analyze_and_archive(
    analysis: &dyn AnalysisBackend,
    archive: &MeetingArchive,
    meeting_id: &str,
    window: &str,
) {
    let prompt = format!("{}\n\n{}", LIVE_NOTES_SYSTEM, live_notes_user_prompt(window));
    match analysis.generate(&prompt).await {
        Ok(notes) => {
            tracing::info!(target: "scrivener::analysis", "Updated notes for meeting {}", meeting_id);
            if let Err(e) = archive.record_analysis(meeting_id, &notes) {
                tracing::warn!(target: "scrivener::console", "Analysis archive failed: {}", e);
            }
        }
        Err(e) => {
            tracing::warn!(target: "scrivener::analysis", "Analysis failed: {}", e);
        }
    }
}
