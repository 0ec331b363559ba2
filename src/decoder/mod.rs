//! Incremental decoder for streamed chat-completion chunks.
//!
//! Consumes raw protocol lines, reconstructs the delta text, and reveals only
//! the substring between the `<|channel|>final<|message|>` and `<|return|>`
//! markers. Preamble the model emits before the start marker never reaches
//! the display sink; everything from the end marker on is discarded.

pub mod chunk;
pub mod reveal;

pub use chunk::{DATA_PREFIX, DONE_SENTINEL};
pub use reveal::{RecordingSink, RevealSink, drive};

/// Token marking where the model's final answer begins.
pub const START_MARKER: &str = "<|channel|>final<|message|>";

/// Token marking where the model's final answer ends.
pub const END_MARKER: &str = "<|return|>";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Start marker not yet seen; everything so far is preamble.
    #[default]
    Searching,
    /// Start marker found, end marker not yet; answer text still growing.
    Revealing,
    /// End marker found or stream exhausted. Terminal.
    Finalized,
}

/// Result of feeding one line to the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank, malformed, fragment-free, or arriving after finalization.
    Skipped,
    /// The server's done-sentinel; stop reading lines.
    StreamDone,
    /// A fragment was appended; possibly new text to reveal.
    Advanced(Advance),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Advance {
    /// Characters newly exposed past what the sink has already seen.
    pub reveal: String,
    /// True once the end marker has been located.
    pub finished: bool,
}

/// Per-turn decoder state. The raw buffer only ever grows; the revealed
/// count only ever advances.
#[derive(Debug, Default)]
pub struct Decoder {
    raw: String,
    revealed: usize,
    phase: Phase,
    final_text: Option<String>,
}

impl Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        matches!(self.phase, Phase::Finalized)
    }

    /// Count of characters already handed to the display sink.
    #[must_use]
    pub const fn revealed(&self) -> usize {
        self.revealed
    }

    /// Feeds one raw protocol line through the per-line protocol.
    pub fn accept_line(&mut self, line: &str) -> LineOutcome {
        if self.is_finalized() {
            return LineOutcome::Skipped;
        }
        if line.trim().is_empty() {
            return LineOutcome::Skipped;
        }
        if line.starts_with(DONE_SENTINEL) {
            return LineOutcome::StreamDone;
        }

        let payload = line.strip_prefix(DATA_PREFIX).unwrap_or(line);
        match chunk::delta_content(payload) {
            Some(delta) => LineOutcome::Advanced(self.push_delta(&delta)),
            None => {
                tracing::debug!(line_len = line.len(), "skipping fragment-free line");
                LineOutcome::Skipped
            }
        }
    }

    /// Appends a reconstructed fragment and re-scans for markers.
    pub fn push_delta(&mut self, delta: &str) -> Advance {
        if self.is_finalized() {
            return Advance::default();
        }
        self.raw.push_str(delta);
        self.scan()
    }

    fn scan(&mut self) -> Advance {
        let mut advance = Advance::default();

        let Some(start) = self.raw.find(START_MARKER) else {
            return advance;
        };
        self.phase = Phase::Revealing;

        let text_start = start + START_MARKER.len();
        let end = self.raw[text_start..].find(END_MARKER);
        let candidate = match end {
            Some(rel) => &self.raw[text_start..text_start + rel],
            None => &self.raw[text_start..],
        };

        let total = candidate.chars().count();
        if total > self.revealed {
            advance.reveal = candidate.chars().skip(self.revealed).collect();
            self.revealed = total;
        }

        if end.is_some() {
            self.phase = Phase::Finalized;
            self.final_text = Some(candidate.trim().to_string());
            advance.finished = true;
        }

        advance
    }

    /// Terminal extraction, idempotent. If the end marker was never found,
    /// re-scans the full raw buffer for the start marker and takes the
    /// trimmed tail; with no start marker at all the result is empty, the
    /// accepted "no answer produced" state.
    pub fn finish(&mut self) -> String {
        if let Some(text) = &self.final_text {
            return text.clone();
        }

        let text = self
            .raw
            .find(START_MARKER)
            .map(|start| self.raw[start + START_MARKER.len()..].trim().to_string())
            .unwrap_or_default();

        self.phase = Phase::Finalized;
        self.final_text = Some(text.clone());
        text
    }
}
