//! Meeting archive: one markdown record per meeting.
//!
//! The archive is the explicit save action of the pipeline, not a durability
//! layer. Saves are idempotent per meeting id: transcript and analysis
//! updates merge into one in-memory record whose file is rewritten in full,
//! so an idle auto-save next to a manual save produces a single record.

use chrono::{DateTime, Utc};
use scrivener_core::error::ScrivenerResult;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone)]
pub struct MeetingRecord {
    pub meeting_id: String,
    pub transcript: String,
    pub analysis: Option<String>,
    pub first_seen: DateTime<Utc>,
    pub saved_at: DateTime<Utc>,
}

pub struct MeetingArchive {
    dir: PathBuf,
    records: Mutex<HashMap<String, MeetingRecord>>,
}

impl MeetingArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Upsert the transcript of a meeting and rewrite its record file.
    pub fn record_transcript(&self, meeting_id: &str, transcript: &str) -> ScrivenerResult<PathBuf> {
        let record = {
            let mut records = self.records.lock().unwrap();
            let record = records
                .entry(meeting_id.to_string())
                .or_insert_with(|| empty_record(meeting_id));
            record.transcript = transcript.to_string();
            record.saved_at = Utc::now();
            record.clone()
        };
        self.write(&record)
    }

    /// Upsert the latest analysis of a meeting and rewrite its record file.
    pub fn record_analysis(&self, meeting_id: &str, analysis: &str) -> ScrivenerResult<PathBuf> {
        let record = {
            let mut records = self.records.lock().unwrap();
            let record = records
                .entry(meeting_id.to_string())
                .or_insert_with(|| empty_record(meeting_id));
            record.analysis = Some(analysis.to_string());
            record.saved_at = Utc::now();
            record.clone()
        };
        self.write(&record)
    }

    /// Where a meeting's record lives. One file per meeting id.
    pub fn path_for(&self, meeting_id: &str) -> PathBuf {
        self.dir.join(format!("meeting-{}.md", sanitize(meeting_id)))
    }

    fn write(&self, record: &MeetingRecord) -> ScrivenerResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&record.meeting_id);
        fs::write(&path, render_markdown(record))?;
        info!(
            target: "scrivener::console",
            "Meeting {} archived to {}",
            record.meeting_id,
            path.display()
        );
        Ok(path)
    }
}

fn empty_record(meeting_id: &str) -> MeetingRecord {
    let now = Utc::now();
    MeetingRecord {
        meeting_id: meeting_id.to_string(),
        transcript: String::new(),
        analysis: None,
        first_seen: now,
        saved_at: now,
    }
}

/// Meeting ids derive from page URLs; keep file names tame.
fn sanitize(meeting_id: &str) -> String {
    meeting_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

fn render_markdown(record: &MeetingRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Meeting {}\n\n", record.meeting_id));
    out.push_str(&format!(
        "- First seen: {}\n- Saved: {}\n\n",
        record.first_seen.to_rfc3339(),
        record.saved_at.to_rfc3339()
    ));
    out.push_str("## Transcript\n\n");
    out.push_str(&record.transcript);
    out.push_str("\n\n## Analysis\n\n");
    match &record.analysis {
        Some(analysis) => out.push_str(analysis),
        None => out.push_str("_no analysis recorded_"),
    }
    out.push('\n');
    out
}

/// Directory listing helper for callers that report archive contents.
pub fn archived_meetings(dir: &Path) -> ScrivenerResult<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "md") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_saves_produce_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let archive = MeetingArchive::new(dir.path());

        archive
            .record_transcript("meet.example.com/abc", "we discussed terms")
            .unwrap();
        archive
            .record_transcript("meet.example.com/abc", "we discussed terms and pricing")
            .unwrap();
        archive
            .record_analysis("meet.example.com/abc", "Pricing under negotiation.")
            .unwrap();

        let files = archived_meetings(dir.path()).unwrap();
        assert_eq!(files.len(), 1);

        let content = fs::read_to_string(&files[0]).unwrap();
        assert!(content.contains("we discussed terms and pricing"));
        assert!(content.contains("Pricing under negotiation."));
    }

    #[test]
    fn analysis_before_transcript_still_merges() {
        let dir = tempfile::tempdir().unwrap();
        let archive = MeetingArchive::new(dir.path());

        archive.record_analysis("m1", "early analysis").unwrap();
        let path = archive.record_transcript("m1", "late transcript").unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("early analysis"));
        assert!(content.contains("late transcript"));
    }

    #[test]
    fn meeting_ids_sanitize_into_file_names() {
        let archive = MeetingArchive::new("/tmp/does-not-matter");
        let path = archive.path_for("https://meet.example.com/room?x=1");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(!name.contains('/'));
        assert!(!name.contains('?'));
        assert!(name.starts_with("meeting-"));
        assert!(name.ends_with(".md"));
    }

    #[test]
    fn distinct_meetings_get_distinct_records() {
        let dir = tempfile::tempdir().unwrap();
        let archive = MeetingArchive::new(dir.path());
        archive.record_transcript("m1", "first").unwrap();
        archive.record_transcript("m2", "second").unwrap();
        assert_eq!(archived_meetings(dir.path()).unwrap().len(), 2);
    }
}
