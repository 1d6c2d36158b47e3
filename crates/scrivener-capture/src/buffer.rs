//! Rolling transcript window with forwarding cadence.
//!
//! Fragments append word-by-word into a bounded window; the buffer decides
//! when enough unsent content exists to forward the joined window across the
//! relay. Forwarding tracks `last_sent` so identical text is never sent
//! twice. Not a durable log: the front truncates once the cap is reached.

use scrivener_core::types::TranscriptFragment;
use std::collections::VecDeque;

/// Default window cap in words. The reference deployments use 200 to 500
/// depending on context.
pub const DEFAULT_BUFFER_CAP_WORDS: usize = 300;

#[derive(Debug)]
pub struct TranscriptBuffer {
    words: VecDeque<String>,
    cap: usize,
    last_sent: String,
    unsent_words: usize,
}

impl TranscriptBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            words: VecDeque::new(),
            cap: cap.max(1),
            last_sent: String::new(),
            unsent_words: 0,
        }
    }

    /// Append one fragment. Empty fragments are inert: they advance nothing
    /// and can never trigger a forward.
    pub fn push(&mut self, fragment: &TranscriptFragment) {
        if fragment.is_empty() {
            return;
        }
        for word in fragment.text.split_whitespace() {
            self.words.push_back(word.to_string());
            self.unsent_words += 1;
        }
        while self.words.len() > self.cap {
            self.words.pop_front();
        }
        // Truncation can leave fewer words in the window than arrived unsent.
        self.unsent_words = self.unsent_words.min(self.words.len());
    }

    /// Forward decision: returns the joined window iff at least `threshold`
    /// unsent words accumulated and the text is non-empty and differs from
    /// the last forward. On forward, marks everything sent.
    pub fn poll_forward(&mut self, threshold: usize) -> Option<String> {
        if self.unsent_words < threshold.max(1) {
            return None;
        }
        let joined = self.current_text();
        if joined.is_empty() || joined == self.last_sent {
            return None;
        }
        self.last_sent = joined.clone();
        self.unsent_words = 0;
        Some(joined)
    }

    /// Stop-path flush: forward anything unsent regardless of threshold.
    pub fn flush(&mut self) -> Option<String> {
        self.poll_forward(1)
    }

    pub fn current_text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn last_sent(&self) -> &str {
        &self.last_sent
    }
}

impl Default for TranscriptBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAP_WORDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(text: &str) -> TranscriptFragment {
        TranscriptFragment::new(text, Some(0.9))
    }

    #[test]
    fn below_threshold_holds_then_single_forward_crosses() {
        let mut buffer = TranscriptBuffer::new(DEFAULT_BUFFER_CAP_WORDS);

        buffer.push(&fragment("Hello this is a test of the legal assistant"));
        assert_eq!(buffer.word_count(), 8);
        assert!(buffer.poll_forward(10).is_none());

        buffer.push(&fragment("please review the indemnification clause"));
        let forwarded = buffer.poll_forward(10).expect("threshold crossed");
        assert_eq!(
            forwarded,
            "Hello this is a test of the legal assistant please review the indemnification clause"
        );
        assert_eq!(forwarded.split_whitespace().count(), 13);

        // Exactly one forward: nothing new, nothing to send.
        assert!(buffer.poll_forward(10).is_none());
    }

    #[test]
    fn pull_path_forwards_any_nonempty_delta() {
        let mut buffer = TranscriptBuffer::new(DEFAULT_BUFFER_CAP_WORDS);
        buffer.push(&fragment("one"));
        assert_eq!(buffer.poll_forward(1).as_deref(), Some("one"));
        buffer.push(&fragment("two"));
        assert_eq!(buffer.poll_forward(1).as_deref(), Some("one two"));
    }

    #[test]
    fn empty_fragments_are_inert() {
        let mut buffer = TranscriptBuffer::new(DEFAULT_BUFFER_CAP_WORDS);
        buffer.push(&fragment("   "));
        assert!(buffer.poll_forward(1).is_none());

        buffer.push(&fragment("some words here"));
        assert!(buffer.poll_forward(1).is_some());

        // Silence after speech neither forwards nor clears last_sent.
        buffer.push(&TranscriptFragment::default());
        assert!(buffer.poll_forward(1).is_none());
        assert_eq!(buffer.last_sent(), "some words here");
    }

    #[test]
    fn forwards_grow_suffix_consistently() {
        let mut buffer = TranscriptBuffer::new(DEFAULT_BUFFER_CAP_WORDS);
        let mut previous = String::new();
        for text in ["alpha beta", "gamma", "delta epsilon zeta"] {
            buffer.push(&fragment(text));
            let sent = buffer.flush().expect("new content forwards");
            assert!(sent.starts_with(&previous));
            assert!(sent.len() > previous.len());
            previous = sent;
        }
    }

    #[test]
    fn window_truncates_to_trailing_cap() {
        let mut buffer = TranscriptBuffer::new(5);
        buffer.push(&fragment("w1 w2 w3 w4 w5 w6 w7"));
        assert_eq!(buffer.word_count(), 5);
        assert_eq!(buffer.flush().as_deref(), Some("w3 w4 w5 w6 w7"));
    }

    #[test]
    fn flush_after_forward_sends_nothing_new() {
        let mut buffer = TranscriptBuffer::new(DEFAULT_BUFFER_CAP_WORDS);
        buffer.push(&fragment("closing remarks"));
        assert!(buffer.flush().is_some());
        assert!(buffer.flush().is_none());
    }
}
