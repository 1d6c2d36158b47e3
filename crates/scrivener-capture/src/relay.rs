//! Relay channel: carries transcript updates from the capture context to the
//! gateway store.
//!
//! One trait, two transports. `PullRelay` here does stateless HTTP writes and
//! polled reads; `PushRelay` (see `push`) holds a persistent socket. Both
//! carry the same `TranscriptUpdate` payload and both are last-write-wins;
//! pick one with the `relay_mode` config key.

use async_trait::async_trait;
use chrono::Utc;
use scrivener_core::error::{ScrivenerError, ScrivenerResult};
use scrivener_core::types::{
    LatestTranscriptResponse, StoreWriteRequest, TranscriptUpdate, DEFAULT_MEETING_ID,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Link state of a relay transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Transport-agnostic relay contract.
#[async_trait]
pub trait RelayChannel: Send + Sync {
    /// Deliver one full-transcript update. Push transports degrade to a
    /// logged drop while the link is down; pull transports surface write
    /// failures synchronously. Either way the capture loop continues.
    async fn send(&self, update: TranscriptUpdate) -> ScrivenerResult<()>;

    /// Stream of updates observed on the channel (other senders included).
    async fn subscribe(&self) -> ScrivenerResult<mpsc::Receiver<TranscriptUpdate>>;
}

/// Pull transport: HTTP POST to write, periodic GET to read. No read
/// receipts, no ordering beyond last write wins.
pub struct PullRelay {
    client: reqwest::Client,
    endpoint: String,
    poll_interval: Duration,
}

impl PullRelay {
    pub fn new(base_url: &str, poll_interval: Duration) -> ScrivenerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint: latest_transcript_endpoint(base_url),
            poll_interval,
        })
    }
}

pub(crate) fn latest_transcript_endpoint(base_url: &str) -> String {
    format!(
        "{}/api/v1/latest-transcript",
        base_url.trim_end_matches('/')
    )
}

#[async_trait]
impl RelayChannel for PullRelay {
    async fn send(&self, update: TranscriptUpdate) -> ScrivenerResult<()> {
        let body = StoreWriteRequest {
            text: update.text,
            meeting_id: Some(update.meeting_id),
        };
        let res = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScrivenerError::RelayUnavailable(e.to_string()))?;
        if !res.status().is_success() {
            return Err(ScrivenerError::RelayUnavailable(format!(
                "transcript write rejected: {}",
                res.status()
            )));
        }
        Ok(())
    }

    async fn subscribe(&self) -> ScrivenerResult<mpsc::Receiver<TranscriptUpdate>> {
        let (tx, rx) = mpsc::channel(16);
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let poll_interval = self.poll_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut last_text = String::new();

            loop {
                ticker.tick().await;
                let res = match client.get(&endpoint).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        debug!(target: "scrivener::relay", "Transcript poll failed: {}", e);
                        continue;
                    }
                };
                if !res.status().is_success() {
                    warn!(target: "scrivener::relay", "Transcript poll rejected: {}", res.status());
                    continue;
                }
                let latest: LatestTranscriptResponse = match res.json().await {
                    Ok(v) => v,
                    Err(e) => {
                        debug!(target: "scrivener::relay", "Transcript poll body unreadable: {}", e);
                        continue;
                    }
                };
                if latest.text.is_empty() || latest.text == last_text {
                    continue;
                }
                last_text = latest.text.clone();
                let update = TranscriptUpdate {
                    meeting_id: latest
                        .meeting_id
                        .unwrap_or_else(|| DEFAULT_MEETING_ID.to_string()),
                    text: latest.text,
                    timestamp: latest.timestamp.unwrap_or_else(Utc::now),
                };
                if tx.send(update).await.is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            latest_transcript_endpoint("http://127.0.0.1:8787/"),
            "http://127.0.0.1:8787/api/v1/latest-transcript"
        );
        assert_eq!(
            latest_transcript_endpoint("http://gateway.local"),
            "http://gateway.local/api/v1/latest-transcript"
        );
    }

    #[tokio::test]
    async fn write_failure_surfaces_as_relay_unavailable() {
        // Nothing listens on this port; the write must fail synchronously.
        let relay = PullRelay::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = relay
            .send(TranscriptUpdate::now("m-1", "hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrivenerError::RelayUnavailable(_)));
    }
}
