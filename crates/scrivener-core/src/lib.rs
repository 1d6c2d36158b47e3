//! # scrivener-core
//!
//! Shared foundation for the Scrivener pipeline: wire types, configuration,
//! the keyed transcript store, and the speech / analysis backend traits.
//!
//! ```text
//! agent --audio--> gateway --SpeechBackend--> text --> TranscriptStore
//!                     |                                     |
//!                     '--AnalysisBackend<-- console <-------'
//! ```
//!
//! Everything that crosses a process boundary is defined in [`types`] so the
//! capture agent, gateway, and console agree on one JSON shape.

pub mod config;
pub mod error;
pub mod llm;
pub mod prompts;
pub mod speech;
pub mod store;
pub mod types;

pub use config::ScrivenerConfig;
pub use error::{ScrivenerError, ScrivenerResult};
pub use llm::{create_best_analysis, strip_code_fences, AnalysisBackend, GeminiClient, MockAnalysis};
pub use speech::{create_best_speech, AudioEncoding, GoogleSpeechClient, PlaceholderSpeech, SpeechBackend};
pub use store::TranscriptStore;
pub use types::{
    DocumentAnalysis, LatestTranscriptResponse, RelayFrame, TranscribeResponse, TranscriptFragment,
    TranscriptUpdate, DEFAULT_MEETING_ID,
};
