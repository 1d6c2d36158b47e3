//! Capture session: the pump connecting capture events to transcription,
//! the rolling buffer, and the relay.
//!
//! Failures are isolated per segment. A failed transcription is logged and
//! skipped; only a terminal capture failure or the `Stopped` event ends the
//! pump. Stopping flushes whatever the buffer still holds, and a fragment
//! whose transcription completes after deactivation is dropped, not applied.

use crate::buffer::TranscriptBuffer;
use crate::chunker::CaptureEvent;
use crate::relay::RelayChannel;
use scrivener_core::speech::SpeechBackend;
use scrivener_core::types::TranscriptUpdate;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct CaptureSession {
    meeting_id: String,
    forward_threshold: usize,
    active: Arc<AtomicBool>,
}

impl CaptureSession {
    pub fn new(meeting_id: impl Into<String>, forward_threshold: usize) -> Self {
        Self {
            meeting_id: meeting_id.into(),
            forward_threshold,
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn meeting_id(&self) -> &str {
        &self.meeting_id
    }

    /// Stop applying fragments. In-flight transcriptions complete but their
    /// results are discarded; the stop flush still carries everything that
    /// was buffered before deactivation.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Drain capture events until `Stopped`, `Failed`, or the channel closes.
    pub async fn run(
        &self,
        mut events: mpsc::Receiver<CaptureEvent>,
        speech: &dyn SpeechBackend,
        buffer: &mut TranscriptBuffer,
        relay: &dyn RelayChannel,
    ) {
        while let Some(event) = events.recv().await {
            match event {
                CaptureEvent::Segment(segment) => {
                    debug!(
                        target: "scrivener::capture",
                        "Segment: {} bytes, {:?}",
                        segment.data.len(),
                        segment.duration
                    );
                    match speech.transcribe(&segment.data, segment.mime).await {
                        Ok(fragment) => {
                            if !self.active.load(Ordering::SeqCst) {
                                debug!(
                                    target: "scrivener::capture",
                                    "Dropping fragment transcribed after deactivation"
                                );
                                continue;
                            }
                            buffer.push(&fragment);
                            if let Some(text) = buffer.poll_forward(self.forward_threshold) {
                                self.forward(relay, text).await;
                            }
                        }
                        Err(e) => {
                            warn!(
                                target: "scrivener::capture",
                                "Segment transcription failed, skipping: {}",
                                e
                            );
                        }
                    }
                }
                CaptureEvent::Stopped => {
                    if let Some(text) = buffer.flush() {
                        self.forward(relay, text).await;
                    }
                    info!(target: "scrivener::capture", "Capture session ended");
                    break;
                }
                CaptureEvent::Failed(e) => {
                    warn!(target: "scrivener::capture", "Capture session failed: {}", e);
                    break;
                }
            }
        }
        self.active.store(false, Ordering::SeqCst);
    }

    async fn forward(&self, relay: &dyn RelayChannel, text: String) {
        let update = TranscriptUpdate::now(self.meeting_id.clone(), text);
        if let Err(e) = relay.send(update).await {
            warn!(target: "scrivener::relay", "Transcript forward failed: {}", e);
        }
    }
}
