//! **Speech-to-text**: convert one audio segment into a transcript fragment.
//!
//! Implement `SpeechBackend` for a cloud recognizer or use `PlaceholderSpeech`
//! to run the whole pipeline keyless. `create_best_speech` picks the backend
//! from config and environment; the gateway holds the API key, capture clients
//! never see it.

use crate::config::ScrivenerConfig;
use crate::error::{ScrivenerError, ScrivenerResult};
use crate::types::TranscriptFragment;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GOOGLE_SPEECH_URL: &str = "https://speech.googleapis.com/v1/speech:recognize";

/// Backend for converting an audio segment (container bytes + mime) to text.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Transcribe one segment. An empty fragment is a valid result (silence);
    /// transport and upstream failures are errors.
    async fn transcribe(&self, audio: &[u8], mime: &str) -> ScrivenerResult<TranscriptFragment>;
}

/// Recognition encoding derived from the segment's mime type.
/// Unrecognized types fall back to a best-effort unspecified encoding,
/// which the recognizer may reject upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoding {
    WebmOpus,
    OggOpus,
    Mp3,
    Linear16,
    Flac,
    Unspecified,
}

impl AudioEncoding {
    /// Map a mime type (optionally with codec parameters) to an encoding.
    pub fn from_mime(mime: &str) -> Self {
        let base = mime
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        match base.as_str() {
            "audio/webm" => Self::WebmOpus,
            "audio/ogg" => Self::OggOpus,
            "audio/mpeg" | "audio/mp3" => Self::Mp3,
            "audio/wav" | "audio/x-wav" | "audio/wave" => Self::Linear16,
            "audio/flac" | "audio/x-flac" => Self::Flac,
            _ => Self::Unspecified,
        }
    }

    /// Wire name used in the recognition config.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebmOpus => "WEBM_OPUS",
            Self::OggOpus => "OGG_OPUS",
            Self::Mp3 => "MP3",
            Self::Linear16 => "LINEAR16",
            Self::Flac => "FLAC",
            Self::Unspecified => "ENCODING_UNSPECIFIED",
        }
    }
}

// Google Cloud Speech recognize request/response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeRequest {
    config: RecognitionConfig,
    audio: RecognitionAudio,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig {
    encoding: &'static str,
    language_code: String,
    enable_automatic_punctuation: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    speech_contexts: Vec<SpeechContext>,
}

#[derive(Serialize)]
struct SpeechContext {
    phrases: Vec<String>,
}

#[derive(Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<SpeechResult>,
}

#[derive(Deserialize)]
struct SpeechResult {
    #[serde(default)]
    alternatives: Vec<SpeechAlternative>,
}

#[derive(Deserialize)]
struct SpeechAlternative {
    #[serde(default)]
    transcript: String,
    confidence: Option<f32>,
}

/// First alternative of the first result; no results means silence, not an error.
fn first_alternative(resp: RecognizeResponse) -> TranscriptFragment {
    resp.results
        .into_iter()
        .next()
        .and_then(|r| r.alternatives.into_iter().next())
        .map(|a| TranscriptFragment::new(a.transcript.trim().to_string(), a.confidence))
        .unwrap_or_default()
}

/// Placeholder speech backend: returns a fixed string. Use for running the
/// capture loop without a recognizer key.
#[derive(Debug, Default)]
pub struct PlaceholderSpeech {
    /// If set, return this instead of the default message.
    pub response: Option<String>,
}

impl PlaceholderSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(s: String) -> Self {
        Self { response: Some(s) }
    }
}

#[async_trait]
impl SpeechBackend for PlaceholderSpeech {
    async fn transcribe(&self, audio: &[u8], mime: &str) -> ScrivenerResult<TranscriptFragment> {
        if let Some(ref r) = self.response {
            return Ok(TranscriptFragment::new(r.clone(), Some(1.0)));
        }
        Ok(TranscriptFragment::new(
            format!(
                "[speech placeholder: {} bytes of {}; set GOOGLE_SPEECH_API_KEY for live recognition]",
                audio.len(),
                mime
            ),
            None,
        ))
    }
}

/// Production speech backend: Google Cloud Speech `speech:recognize`.
/// Base64-encodes the segment and biases recognition with the configured
/// legal/meeting vocabulary.
pub struct GoogleSpeechClient {
    api_key: String,
    language_code: String,
    vocabulary: Vec<String>,
    client: reqwest::Client,
}

impl GoogleSpeechClient {
    /// Build from environment: requires `GOOGLE_SPEECH_API_KEY`.
    pub fn from_env(config: &ScrivenerConfig) -> ScrivenerResult<Self> {
        let api_key = std::env::var("GOOGLE_SPEECH_API_KEY").map_err(|_| {
            ScrivenerError::TranscriptionFailed {
                status: 0,
                body: "GOOGLE_SPEECH_API_KEY not set".to_string(),
            }
        })?;
        Self::new(api_key, config.language_code.clone(), config.vocabulary.clone())
    }

    /// Create with explicit key, language, and vocabulary.
    pub fn new(
        api_key: impl Into<String>,
        language_code: String,
        vocabulary: Vec<String>,
    ) -> ScrivenerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            api_key: api_key.into().trim().to_string(),
            language_code,
            vocabulary,
            client,
        })
    }
}

#[async_trait]
impl SpeechBackend for GoogleSpeechClient {
    async fn transcribe(&self, audio: &[u8], mime: &str) -> ScrivenerResult<TranscriptFragment> {
        if audio.is_empty() {
            return Ok(TranscriptFragment::default());
        }
        let encoding = AudioEncoding::from_mime(mime);
        let body = RecognizeRequest {
            config: RecognitionConfig {
                encoding: encoding.as_str(),
                language_code: self.language_code.clone(),
                enable_automatic_punctuation: true,
                speech_contexts: if self.vocabulary.is_empty() {
                    Vec::new()
                } else {
                    vec![SpeechContext {
                        phrases: self.vocabulary.clone(),
                    }]
                },
            },
            audio: RecognitionAudio {
                content: BASE64.encode(audio),
            },
        };

        let url = format!("{}?key={}", GOOGLE_SPEECH_URL, self.api_key);
        let res = self.client.post(&url).json(&body).send().await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ScrivenerError::transcription(status, body));
        }

        let parsed: RecognizeResponse = res.json().await?;
        Ok(first_alternative(parsed))
    }
}

/// Create the best available speech backend from config and environment.
/// `speech_mode = "google"` with `GOOGLE_SPEECH_API_KEY` set selects the cloud
/// recognizer; anything else falls back to the placeholder.
pub fn create_best_speech(config: &ScrivenerConfig) -> Box<dyn SpeechBackend> {
    if config.speech_mode == "google" {
        match GoogleSpeechClient::from_env(config) {
            Ok(google) => {
                tracing::info!(target: "scrivener::speech", "Using Google Speech ({})", config.language_code);
                return Box::new(google);
            }
            Err(e) => {
                tracing::warn!(target: "scrivener::speech", "Google Speech unavailable ({}); using placeholder", e);
            }
        }
    }
    tracing::info!(target: "scrivener::speech", "Using placeholder speech backend");
    Box::new(PlaceholderSpeech::new())
}
