//! Prompt definitions for the analysis backends.
//!
//! Each prompt family lives in its own module as a system prompt plus a user
//! template with named `{placeholders}` and a helper that fills them in.

pub mod document_breakdown;
pub mod live_notes;

pub use document_breakdown::*;
pub use live_notes::*;
