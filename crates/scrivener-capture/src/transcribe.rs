//! Agent-side transcription client: ships one audio segment to the gateway
//! and gets a text fragment back.
//!
//! Implements `SpeechBackend` so the capture session is indifferent to
//! whether recognition happens in-process or behind the gateway.

use async_trait::async_trait;
use scrivener_core::error::{ScrivenerError, ScrivenerResult};
use scrivener_core::speech::SpeechBackend;
use scrivener_core::types::{TranscribeResponse, TranscriptFragment};
use std::time::Duration;
use tracing::debug;

pub struct TranscribeClient {
    client: reqwest::Client,
    endpoint: String,
}

impl TranscribeClient {
    pub fn new(base_url: &str) -> ScrivenerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/v1/transcribe", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl SpeechBackend for TranscribeClient {
    /// Transcribe one segment via `POST /api/v1/transcribe` (multipart,
    /// `audio` file field). An empty fragment is a valid result (silence);
    /// a non-2xx response propagates the upstream status and body.
    async fn transcribe(&self, audio: &[u8], mime: &str) -> ScrivenerResult<TranscriptFragment> {
        let part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name("segment.wav")
            .mime_str(mime)?;
        let form = reqwest::multipart::Form::new().part("audio", part);

        let res = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ScrivenerError::transcription(status, body));
        }

        let parsed: TranscribeResponse = res.json().await?;
        debug!(
            target: "scrivener::capture",
            "Segment transcribed: {} chars, empty = {}",
            parsed.text.len(),
            parsed.is_empty
        );
        Ok(TranscriptFragment::new(parsed.text, parsed.confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{AudioSegment, CAPTURE_SAMPLE_RATE, WAV_MIME};

    #[tokio::test]
    async fn unreachable_gateway_propagates_an_error() {
        let client = TranscribeClient::new("http://127.0.0.1:9").unwrap();
        let segment = AudioSegment::from_samples(&[0.1f32; 160], CAPTURE_SAMPLE_RATE).unwrap();
        assert!(client
            .transcribe(&segment.data, WAV_MIME)
            .await
            .is_err());
    }

    #[test]
    fn endpoint_joins_cleanly() {
        let client = TranscribeClient::new("http://127.0.0.1:8787/").unwrap();
        assert_eq!(client.endpoint, "http://127.0.0.1:8787/api/v1/transcribe");
    }
}
