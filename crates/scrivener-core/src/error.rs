//! Error types for the Scrivener pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type ScrivenerResult<T> = Result<T, ScrivenerError>;

/// Errors that can occur between capture hand-off and analysis output.
///
/// Per-segment failures (`TranscriptionFailed`) and per-message failures
/// (`RelayUnavailable`) are non-fatal: callers log and continue. Analysis
/// failures surface to the operator and are manually retryable.
#[derive(Error, Debug)]
pub enum ScrivenerError {
    #[error("Transcription failed (status {status}): {body}")]
    TranscriptionFailed { status: u16, body: String },

    #[error("Relay unavailable: {0}")]
    RelayUnavailable(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrivenerError {
    /// Build a `TranscriptionFailed` from an upstream status and body.
    pub fn transcription(status: u16, body: impl Into<String>) -> Self {
        Self::TranscriptionFailed {
            status,
            body: body.into(),
        }
    }
}
