//! Global pipeline configuration. Load from TOML file and environment.
//!
//! Precedence: defaults < `scrivener.toml` (path overridable via `SCRIVENER_CONFIG`)
//! < environment with prefix `SCRIVENER` and separator `__` (e.g. `SCRIVENER__PORT=8787`).
//! API keys (`GOOGLE_SPEECH_API_KEY`, `GEMINI_API_KEY`) are environment-only and
//! never read from the config file; the gateway holds them, clients never see them.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration shared by the gateway, the capture agent, and the analyst.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrivenerConfig {
    /// Application identity used in logs and the health endpoint.
    pub app_name: String,
    /// HTTP port for the gateway.
    pub port: u16,
    /// Base URL of the gateway, used by the agent and the analyst.
    pub relay_url: String,
    /// Relay transport: "pull" (HTTP POST/GET) or "push" (WebSocket).
    pub relay_mode: String,
    /// Speech backend: "placeholder" or "google".
    pub speech_mode: String,
    /// Analysis backend: "mock" or "live" (Gemini).
    pub llm_mode: String,
    /// Gemini model used when `llm_mode` is "live".
    pub gemini_model: String,
    /// Recognition language (BCP-47).
    pub language_code: String,
    /// Domain vocabulary boost for speech recognition (legal/meeting terms).
    #[serde(default)]
    pub vocabulary: Vec<String>,

    /// Capture chunk length in seconds. Each chunk becomes one AudioSegment.
    pub chunk_secs: u64,
    /// Minimum unsent words before the push relay forwards (pull forwards on any delta).
    pub forward_threshold_words: usize,
    /// Rolling transcript window cap in words.
    pub buffer_cap_words: usize,
    /// Word growth that triggers an incremental analysis.
    pub analysis_trigger_words: usize,
    /// Trailing window handed to the analysis backend, in words.
    pub analysis_window_words: usize,
    /// Console poll interval in seconds.
    pub poll_interval_secs: u64,
    /// Seconds without transcript change before a meeting is considered idle.
    pub idle_timeout_secs: u64,
    /// Minimum transcript length (chars) for the idle auto-save.
    pub autosave_min_chars: usize,
    /// Store slot lifetime in seconds; expired slots are evicted.
    pub retention_secs: u64,
    /// Directory for archived meeting records.
    pub archive_dir: String,
    /// Origins allowed through CORS (the capture context's hosting sites).
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl ScrivenerConfig {
    /// Load config from file and environment. Precedence: env `SCRIVENER_CONFIG` path > `scrivener.toml` > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("SCRIVENER_CONFIG").unwrap_or_else(|_| "scrivener.toml".to_string());
        let builder = config::Config::builder()
            .set_default("app_name", "scrivener")?
            .set_default("port", 8787_i64)?
            .set_default("relay_url", "http://127.0.0.1:8787")?
            .set_default("relay_mode", "pull")?
            .set_default("speech_mode", "placeholder")?
            .set_default("llm_mode", "mock")?
            .set_default("gemini_model", "gemini-1.5-flash")?
            .set_default("language_code", "en-US")?
            .set_default("vocabulary", default_vocabulary())?
            .set_default("chunk_secs", 5_i64)?
            .set_default("forward_threshold_words", 10_i64)?
            .set_default("buffer_cap_words", 300_i64)?
            .set_default("analysis_trigger_words", 20_i64)?
            .set_default("analysis_window_words", 200_i64)?
            .set_default("poll_interval_secs", 2_i64)?
            .set_default("idle_timeout_secs", 30_i64)?
            .set_default("autosave_min_chars", 50_i64)?
            .set_default("retention_secs", 3600_i64)?
            .set_default("archive_dir", "./meetings")?
            .set_default("allowed_origins", vec!["http://localhost:3000".to_string()])?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("SCRIVENER").separator("__"))
            .build()?;

        built.try_deserialize()
    }
}

impl Default for ScrivenerConfig {
    fn default() -> Self {
        Self {
            app_name: "scrivener".to_string(),
            port: 8787,
            relay_url: "http://127.0.0.1:8787".to_string(),
            relay_mode: "pull".to_string(),
            speech_mode: "placeholder".to_string(),
            llm_mode: "mock".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            language_code: "en-US".to_string(),
            vocabulary: default_vocabulary(),
            chunk_secs: 5,
            forward_threshold_words: 10,
            buffer_cap_words: 300,
            analysis_trigger_words: 20,
            analysis_window_words: 200,
            poll_interval_secs: 2,
            idle_timeout_secs: 30,
            autosave_min_chars: 50,
            retention_secs: 3600,
            archive_dir: "./meetings".to_string(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Legal/meeting terms that bias speech recognition toward this domain.
fn default_vocabulary() -> Vec<String> {
    [
        "indemnification",
        "arbitration",
        "liability",
        "warranty",
        "confidentiality",
        "non-disclosure",
        "force majeure",
        "jurisdiction",
        "severability",
        "counterparty",
        "deposition",
        "retainer",
        "action item",
        "follow up",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_thresholds() {
        let c = ScrivenerConfig::default();
        assert_eq!(c.chunk_secs, 5);
        assert_eq!(c.forward_threshold_words, 10);
        assert_eq!(c.analysis_trigger_words, 20);
        assert_eq!(c.analysis_window_words, 200);
        assert_eq!(c.poll_interval_secs, 2);
        assert_eq!(c.idle_timeout_secs, 30);
        assert_eq!(c.autosave_min_chars, 50);
        assert!((200..=500).contains(&c.buffer_cap_words));
    }

    #[test]
    fn vocabulary_covers_legal_terms() {
        let v = default_vocabulary();
        assert!(v.iter().any(|t| t == "indemnification"));
        assert!(v.iter().any(|t| t == "arbitration"));
    }
}
