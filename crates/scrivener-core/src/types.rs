//! Wire types shared by the relay endpoints, the capture agent, and the console.
//!
//! Everything here crosses a process boundary as camelCase JSON; timestamps are
//! RFC 3339 (`chrono` serde default).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Meeting id used when a sender does not supply one.
pub const DEFAULT_MEETING_ID: &str = "default";

/// One full-transcript update crossing the relay channel.
/// Carried by both transports: the pull POST body and the push socket frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptUpdate {
    pub meeting_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl TranscriptUpdate {
    pub fn now(meeting_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            meeting_id: meeting_id.into(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The text result of transcribing one audio segment.
/// An empty `text` is a valid result (silence), distinct from a transport failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptFragment {
    pub text: String,
    pub confidence: Option<f32>,
}

impl TranscriptFragment {
    pub fn new(text: impl Into<String>, confidence: Option<f32>) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }

    /// True when the segment contained no recognizable speech.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Body of `POST /api/v1/latest-transcript`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreWriteRequest {
    pub text: String,
    #[serde(default)]
    pub meeting_id: Option<String>,
}

/// Body of `POST /api/v1/analyze-transcript`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeTranscriptRequest {
    pub transcript: String,
    #[serde(default)]
    pub meeting_id: Option<String>,
}

/// Response of `POST /api/v1/analyze-transcript`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeTranscriptResponse {
    pub analysis: String,
    pub meeting_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Body of `POST /api/v1/analyze-document`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeDocumentRequest {
    pub text: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Severity / risk level used throughout the document breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

/// One flagged risk inside an analyzed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRisk {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    #[serde(default)]
    pub clause_id: Option<String>,
}

/// One clause extracted from an analyzed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentClause {
    pub id: String,
    pub title: String,
    pub original_text: String,
    pub simplified_explanation: String,
    pub what_this_means: String,
    pub risk_level: Severity,
    pub category: String,
}

/// Structured breakdown of an uploaded document. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAnalysis {
    pub title: String,
    pub overview: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub risks: Vec<DocumentRisk>,
    #[serde(default)]
    pub clauses: Vec<DocumentClause>,
}

/// Response of `GET /api/v1/latest-transcript`. `meeting_id` and `timestamp`
/// stay null until the first write lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestTranscriptResponse {
    pub text: String,
    pub meeting_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<Option<TranscriptUpdate>> for LatestTranscriptResponse {
    fn from(update: Option<TranscriptUpdate>) -> Self {
        match update {
            Some(u) => Self {
                text: u.text,
                meeting_id: Some(u.meeting_id),
                timestamp: Some(u.timestamp),
            },
            None => Self {
                text: String::new(),
                meeting_id: None,
                timestamp: None,
            },
        }
    }
}

/// Recognition settings the gateway applied to one segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingInfo {
    pub language_code: String,
    pub encoding: String,
    pub vocabulary_size: usize,
}

/// Response of `POST /api/v1/transcribe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeResponse {
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub encoding: String,
    /// Segment length in seconds, when derivable from the container.
    pub duration: Option<f64>,
    pub confidence: Option<f32>,
    pub processing_info: ProcessingInfo,
    /// True when recognition produced no words (silence, noise).
    pub is_empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Frames on the push-relay socket. Tagged JSON: capture agents send
/// `transcript`, the gateway broadcasts `transcript-update` to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum RelayFrame {
    #[serde(rename = "transcript")]
    Transcript(TranscriptUpdate),
    #[serde(rename = "transcript-update")]
    Update(TranscriptUpdate),
}

impl RelayFrame {
    pub fn into_update(self) -> TranscriptUpdate {
        match self {
            RelayFrame::Transcript(u) | RelayFrame::Update(u) => u,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_update_wire_shape_is_camel_case() {
        let u = TranscriptUpdate::now("meet-1", "hello counsel");
        let v = serde_json::to_value(&u).unwrap();
        assert_eq!(v["meetingId"], "meet-1");
        assert_eq!(v["text"], "hello counsel");
        assert!(v["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn empty_fragment_detected() {
        assert!(TranscriptFragment::new("   ", None).is_empty());
        assert!(!TranscriptFragment::new("word", Some(0.9)).is_empty());
    }

    #[test]
    fn document_analysis_round_trips_camel_case() {
        let json = r#"{
            "title": "Service Agreement",
            "overview": "Standard services contract.",
            "keyPoints": ["12 month term"],
            "risks": [{
                "id": "r1",
                "title": "Unlimited liability",
                "description": "No liability cap present.",
                "severity": "high",
                "clauseId": "c2"
            }],
            "clauses": [{
                "id": "c2",
                "title": "Liability",
                "originalText": "Provider shall be liable...",
                "simplifiedExplanation": "You are on the hook for everything.",
                "whatThisMeans": "No upper bound on damages.",
                "riskLevel": "high",
                "category": "liability"
            }]
        }"#;
        let parsed: DocumentAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.risks[0].severity, Severity::High);
        assert_eq!(parsed.clauses[0].risk_level, Severity::High);
        assert_eq!(parsed.risks[0].clause_id.as_deref(), Some("c2"));
        let back = serde_json::to_value(&parsed).unwrap();
        assert_eq!(back["clauses"][0]["whatThisMeans"], "No upper bound on damages.");
    }

    #[test]
    fn relay_frames_are_event_tagged() {
        let frame = RelayFrame::Transcript(TranscriptUpdate::now("m-1", "so moved"));
        let v = serde_json::to_value(&frame).unwrap();
        assert_eq!(v["event"], "transcript");
        assert_eq!(v["meetingId"], "m-1");

        let parsed: RelayFrame = serde_json::from_value(serde_json::json!({
            "event": "transcript-update",
            "meetingId": "m-1",
            "text": "so moved",
            "timestamp": "2026-01-05T10:00:00Z",
        }))
        .unwrap();
        assert!(matches!(parsed, RelayFrame::Update(_)));
        assert_eq!(parsed.into_update().text, "so moved");
    }

    #[test]
    fn latest_transcript_response_null_when_store_empty() {
        let empty = LatestTranscriptResponse::from(None);
        let v = serde_json::to_value(&empty).unwrap();
        assert_eq!(v["text"], "");
        assert!(v["meetingId"].is_null());
        assert!(v["timestamp"].is_null());
    }
}
