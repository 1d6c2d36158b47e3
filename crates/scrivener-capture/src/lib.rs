//! # scrivener-capture
//!
//! Capture side of the transcript pipeline: pull fixed-duration audio
//! segments off the microphone, transcribe each through the gateway, roll
//! fragments into a bounded window, and forward the window across a relay.
//!
//! ```text
//! MicSegmentSource --ChunkedCapture--> CaptureEvent::Segment
//!        |                                   |
//!   (capture thread)              CaptureSession (async pump)
//!                                            |
//!                       TranscribeClient --> TranscriptBuffer
//!                                            | poll_forward
//!                              RelayChannel (push ws / pull http)
//! ```
//!
//! Per-segment failures never abort a session; only permission-level device
//! errors are terminal.

pub mod buffer;
pub mod chunker;
pub mod error;
pub mod push;
pub mod relay;
pub mod session;
pub mod source;
pub mod transcribe;

pub use buffer::{TranscriptBuffer, DEFAULT_BUFFER_CAP_WORDS};
pub use chunker::{CaptureEvent, ChunkedCapture};
pub use error::{CaptureError, CaptureResult};
pub use push::PushRelay;
pub use relay::{PullRelay, RelayChannel, RelayState};
pub use session::CaptureSession;
pub use source::{
    AudioSegment, MicSegmentSource, ScriptedSegmentSource, SegmentSource, CAPTURE_SAMPLE_RATE,
    WAV_MIME,
};
pub use transcribe::TranscribeClient;
