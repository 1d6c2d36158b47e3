//! **Analysis backends**: turn a prompt into model output text.
//!
//! Two prompt families flow through here: live meeting notes (free-form text
//! over a trailing transcript window) and document breakdown (strict JSON).
//! Implement `AnalysisBackend` for a cloud model or use `MockAnalysis` to run
//! keyless. `create_best_analysis` picks the backend from config and
//! environment; the gateway holds the API key, clients never see it.

use crate::config::ScrivenerConfig;
use crate::error::{ScrivenerError, ScrivenerResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Backend for generating analysis text from a prompt.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Generate output for one prompt. Failures are recoverable: the caller
    /// surfaces them and may re-trigger manually.
    async fn generate(&self, prompt: &str) -> ScrivenerResult<String>;
}

// Gemini generateContent request/response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Text of the first part of the first candidate.
fn first_candidate_text(resp: GenerateResponse) -> Option<String> {
    resp.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .map(|p| p.text.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Strip markdown code fences the model may wrap JSON in.
pub fn strip_code_fences(content: &str) -> &str {
    let cleaned = content.trim();
    let cleaned = cleaned
        .strip_prefix("```json")
        .or_else(|| cleaned.strip_prefix("```"))
        .unwrap_or(cleaned);
    cleaned.strip_suffix("```").unwrap_or(cleaned).trim()
}

/// Production analysis backend: Gemini `generateContent`.
pub struct GeminiClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Build from environment: requires `GEMINI_API_KEY`; model from config.
    pub fn from_env(config: &ScrivenerConfig) -> ScrivenerResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ScrivenerError::AnalysisFailed("GEMINI_API_KEY not set".to_string()))?;
        Self::new(api_key, config.gemini_model.clone())
    }

    /// Create with explicit key and model (e.g. `gemini-1.5-flash`).
    pub fn new(api_key: impl Into<String>, model: String) -> ScrivenerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            api_key: api_key.into().trim().to_string(),
            model,
            client,
        })
    }
}

#[async_trait]
impl AnalysisBackend for GeminiClient {
    async fn generate(&self, prompt: &str) -> ScrivenerResult<String> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_BASE, self.model, self.api_key
        );
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                max_output_tokens: Some(4096),
            },
        };

        let res = self.client.post(&url).json(&body).send().await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ScrivenerError::AnalysisFailed(format!(
                "Gemini API error {}: {}",
                status, body
            )));
        }

        let parsed: GenerateResponse = res.json().await?;

        if let Some(feedback) = &parsed.prompt_feedback {
            if let Some(reason) = &feedback.block_reason {
                return Err(ScrivenerError::AnalysisFailed(format!(
                    "Gemini blocked the prompt: {}",
                    reason
                )));
            }
        }

        first_candidate_text(parsed)
            .ok_or_else(|| ScrivenerError::AnalysisFailed("empty Gemini response".to_string()))
    }
}

/// Mock analysis backend: deterministic canned output so the whole pipeline
/// runs keyless. Document prompts (those asking for JSON) get a valid
/// `DocumentAnalysis` body; everything else gets a short meeting summary.
/// Output is fenced the way Gemini usually fences JSON.
#[derive(Debug, Default)]
pub struct MockAnalysis;

impl MockAnalysis {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AnalysisBackend for MockAnalysis {
    async fn generate(&self, prompt: &str) -> ScrivenerResult<String> {
        if prompt.contains("JSON") {
            return Ok(format!("```json\n{}\n```", MOCK_DOCUMENT_ANALYSIS));
        }
        let words = prompt.split_whitespace().count();
        Ok(format!(
            "[mock analysis] Reviewed {} words of discussion. Key themes: contract terms \
             and obligations under negotiation. Watch for indemnification, liability caps, \
             and termination language; confirm open action items before the meeting closes. \
             Set GEMINI_API_KEY and llm_mode = \"live\" for real analysis.",
            words
        ))
    }
}

const MOCK_DOCUMENT_ANALYSIS: &str = r#"{
  "title": "Reviewed Agreement",
  "overview": "A services agreement with standard commercial terms and one notable liability gap.",
  "keyPoints": [
    "Twelve month initial term with automatic renewal",
    "Payment due net thirty from invoice date",
    "Disputes resolved by binding arbitration"
  ],
  "risks": [
    {
      "id": "risk-1",
      "title": "No liability cap",
      "description": "The agreement does not limit either party's total liability.",
      "severity": "high",
      "clauseId": "clause-1"
    },
    {
      "id": "risk-2",
      "title": "Broad indemnification",
      "description": "Indemnification obligations extend to third-party claims without carve-outs.",
      "severity": "medium",
      "clauseId": "clause-2"
    }
  ],
  "clauses": [
    {
      "id": "clause-1",
      "title": "Limitation of Liability",
      "originalText": "Each party shall be liable for all damages arising from its performance hereunder.",
      "simplifiedExplanation": "There is no upper limit on what either side could owe.",
      "whatThisMeans": "A dispute could expose you to unbounded damages.",
      "riskLevel": "high",
      "category": "liability"
    },
    {
      "id": "clause-2",
      "title": "Indemnification",
      "originalText": "Supplier shall indemnify and hold harmless Customer against all claims.",
      "simplifiedExplanation": "The supplier must cover the customer's losses from third-party claims.",
      "whatThisMeans": "Indemnity flows one way and is not capped.",
      "riskLevel": "medium",
      "category": "indemnification"
    }
  ]
}"#;

/// Create the best available analysis backend from config and environment.
/// `llm_mode = "live"` with `GEMINI_API_KEY` set selects Gemini; anything else
/// falls back to the mock.
pub fn create_best_analysis(config: &ScrivenerConfig) -> Box<dyn AnalysisBackend> {
    if config.llm_mode == "live" {
        match GeminiClient::from_env(config) {
            Ok(gemini) => {
                tracing::info!(target: "scrivener::analysis", "Using Gemini ({})", config.gemini_model);
                return Box::new(gemini);
            }
            Err(e) => {
                tracing::warn!(target: "scrivener::analysis", "Gemini unavailable ({}); using mock", e);
            }
        }
    }
    tracing::info!(target: "scrivener::analysis", "Using mock analysis backend");
    Box::new(MockAnalysis::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentAnalysis;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn first_candidate_text_skips_empty() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"  summary text  "}]}}]}"#,
        )
        .unwrap();
        assert_eq!(first_candidate_text(resp).as_deref(), Some("summary text"));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(first_candidate_text(empty).is_none());
    }

    #[test]
    fn blocked_prompt_feedback_parses() {
        let resp: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert_eq!(
            resp.prompt_feedback.unwrap().block_reason.as_deref(),
            Some("SAFETY")
        );
    }

    #[tokio::test]
    async fn mock_document_output_is_valid_analysis_json() {
        let mock = MockAnalysis::new();
        let out = mock
            .generate("Return a single JSON object describing the document.")
            .await
            .unwrap();
        let parsed: DocumentAnalysis = serde_json::from_str(strip_code_fences(&out)).unwrap();
        assert!(!parsed.risks.is_empty());
        assert!(!parsed.clauses.is_empty());
    }

    #[tokio::test]
    async fn mock_live_output_mentions_word_count() {
        let mock = MockAnalysis::new();
        let out = mock.generate("one two three four five").await.unwrap();
        assert!(out.contains("5 words"));
    }
}
