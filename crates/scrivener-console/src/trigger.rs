//! Incremental analysis trigger: fire on significant transcript growth,
//! hand back only a bounded trailing window.

/// Decides when a transcript has grown enough to warrant another analysis
/// pass, and clips the input to the trailing window so LLM cost stays
/// bounded no matter how long the meeting runs.
#[derive(Debug)]
pub struct AnalysisTrigger {
    trigger_words: usize,
    window_words: usize,
    last_analyzed_words: usize,
}

impl AnalysisTrigger {
    pub fn new(trigger_words: usize, window_words: usize) -> Self {
        Self {
            trigger_words: trigger_words.max(1),
            window_words: window_words.max(1),
            last_analyzed_words: 0,
        }
    }

    /// Observe the current full transcript. Returns the trailing window iff
    /// the word count grew by at least the trigger threshold since the last
    /// analysis.
    pub fn observe(&mut self, text: &str) -> Option<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() < self.last_analyzed_words + self.trigger_words {
            return None;
        }
        Some(self.clip_window(words))
    }

    /// Manual re-analysis: fires on any non-empty transcript regardless of
    /// growth.
    pub fn force(&mut self, text: &str) -> Option<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return None;
        }
        Some(self.clip_window(words))
    }

    fn clip_window(&mut self, words: Vec<&str>) -> String {
        self.last_analyzed_words = words.len();
        let start = words.len().saturating_sub(self.window_words);
        words[start..].join(" ")
    }
}
