//! Consumer-side building blocks: follow the live transcript, decide when
//! re-analysis is worth asking for, and archive finished meetings.
//!
//! ```text
//!   gateway store --poll--> TranscriptFollower --events--> caller
//!                                 |                          |
//!                            idle timeout               AnalysisTrigger
//!                                 v                          v
//!                           MeetingArchive <----analysis-----'
//! ```

pub mod archive;
pub mod follower;
pub mod trigger;

pub use archive::{archived_meetings, MeetingArchive, MeetingRecord};
pub use follower::{FollowerEvent, HttpTranscriptSource, TranscriptFollower, TranscriptSource};
pub use trigger::AnalysisTrigger;
