//! Transcript follower: poll the gateway store, surface changes, detect idle
//! meetings and archive them once.
//!
//! Idle detection is a heuristic end-of-meeting signal, not an explicit
//! event: no change for `idle_timeout` marks the meeting idle. The follower
//! fires one `Idle` per quiet period; new content re-arms detection.

use crate::archive::MeetingArchive;
use async_trait::async_trait;
use scrivener_core::error::ScrivenerResult;
use scrivener_core::types::{LatestTranscriptResponse, TranscriptUpdate, DEFAULT_MEETING_ID};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Where the follower reads the live transcript from.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// The most recent transcript, or `None` when nothing has been written.
    async fn latest(&self) -> ScrivenerResult<Option<TranscriptUpdate>>;
}

/// Gateway-backed source: `GET /api/v1/latest-transcript`.
pub struct HttpTranscriptSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTranscriptSource {
    pub fn new(base_url: &str) -> ScrivenerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/api/v1/latest-transcript",
                base_url.trim_end_matches('/')
            ),
        })
    }
}

#[async_trait]
impl TranscriptSource for HttpTranscriptSource {
    async fn latest(&self) -> ScrivenerResult<Option<TranscriptUpdate>> {
        let res = self.client.get(&self.endpoint).send().await?;
        let latest: LatestTranscriptResponse = res.error_for_status()?.json().await?;
        if latest.text.is_empty() {
            return Ok(None);
        }
        Ok(Some(TranscriptUpdate {
            meeting_id: latest
                .meeting_id
                .unwrap_or_else(|| DEFAULT_MEETING_ID.to_string()),
            text: latest.text,
            timestamp: latest.timestamp.unwrap_or_else(chrono::Utc::now),
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FollowerEvent {
    /// The store text changed since the last poll.
    Updated(TranscriptUpdate),
    /// No change for a full idle window. `saved` reports whether this idle
    /// performed the one-time archive action.
    Idle {
        meeting_id: String,
        transcript: String,
        saved: bool,
    },
}

pub struct TranscriptFollower<S: TranscriptSource> {
    source: S,
    poll_interval: Duration,
    idle_timeout: Duration,
    autosave_min_chars: usize,
    archive: Option<Arc<MeetingArchive>>,
}

impl<S: TranscriptSource> TranscriptFollower<S> {
    pub fn new(
        source: S,
        poll_interval: Duration,
        idle_timeout: Duration,
        autosave_min_chars: usize,
    ) -> Self {
        Self {
            source,
            poll_interval,
            idle_timeout,
            autosave_min_chars,
            archive: None,
        }
    }

    /// Archive idle meetings into `archive` when they are long enough.
    pub fn with_archive(mut self, archive: Arc<MeetingArchive>) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Poll until the event receiver goes away.
    pub async fn run(&self, events: mpsc::Sender<FollowerEvent>) {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut last_text = String::new();
        let mut last_meeting = DEFAULT_MEETING_ID.to_string();
        let mut last_change = Instant::now();
        let mut idle_fired = false;

        loop {
            ticker.tick().await;

            match self.source.latest().await {
                Ok(Some(update)) => {
                    if !update.text.is_empty() && update.text != last_text {
                        last_text = update.text.clone();
                        last_meeting = update.meeting_id.clone();
                        last_change = Instant::now();
                        idle_fired = false;
                        if events.send(FollowerEvent::Updated(update)).await.is_err() {
                            return;
                        }
                        continue;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    debug!(target: "scrivener::console", "Transcript poll failed: {}", e);
                }
            }

            if !idle_fired && !last_text.is_empty() && last_change.elapsed() >= self.idle_timeout {
                idle_fired = true;
                let saved = self.autosave(&last_meeting, &last_text);
                let idle = FollowerEvent::Idle {
                    meeting_id: last_meeting.clone(),
                    transcript: last_text.clone(),
                    saved,
                };
                if events.send(idle).await.is_err() {
                    return;
                }
            }
        }
    }

    fn autosave(&self, meeting_id: &str, transcript: &str) -> bool {
        if transcript.len() < self.autosave_min_chars {
            return false;
        }
        let Some(archive) = &self.archive else {
            return false;
        };
        match archive.record_transcript(meeting_id, transcript) {
            Ok(_) => true,
            Err(e) => {
                warn!(target: "scrivener::console", "Idle auto-save failed: {}", e);
                false
            }
        }
    }
}
