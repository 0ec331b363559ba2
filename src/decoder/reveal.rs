use std::time::Duration;

use futures::{Stream, StreamExt};

use super::{Decoder, LineOutcome};
use crate::core::error::Result;

/// Inter-character delay emulating progressive typing.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(30);

/// Observer for the progressive reveal. The decoder core holds no reference
/// to any rendering surface; the UI layer implements this.
pub trait RevealSink {
    /// Called once per revealed character, in order.
    fn on_reveal(&mut self, ch: char);

    /// Called exactly once per turn, including fallback and empty paths.
    fn on_turn_complete(&mut self, text: &str);
}

/// Sink that records everything it is handed. Test double, also useful for
/// callers that want the reveal without pacing.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub revealed: String,
    pub completions: Vec<String>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RevealSink for RecordingSink {
    fn on_reveal(&mut self, ch: char) {
        self.revealed.push(ch);
    }

    fn on_turn_complete(&mut self, text: &str) {
        self.completions.push(text.to_string());
    }
}

/// Runs one turn's line loop to completion: feeds each line to the decoder,
/// paces newly revealed characters into the sink, and returns the final
/// content. Strictly sequential; a line is fully processed, reveal delays
/// included, before the next one is read.
///
/// A line-level stream error ends the line sequence; the end-of-stream
/// fallback then applies. Cancellation is dropping the returned future.
pub async fn drive<S>(mut lines: S, sink: &mut dyn RevealSink, delay: Duration) -> String
where
    S: Stream<Item = Result<String>> + Unpin,
{
    let mut decoder = Decoder::new();

    while let Some(next) = lines.next().await {
        let line = match next {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, "line stream failed mid-turn");
                break;
            }
        };

        match decoder.accept_line(&line) {
            LineOutcome::Skipped => {}
            LineOutcome::StreamDone => break,
            LineOutcome::Advanced(advance) => {
                for ch in advance.reveal.chars() {
                    sink.on_reveal(ch);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                if advance.finished {
                    break;
                }
            }
        }
    }

    let text = decoder.finish();
    sink.on_turn_complete(&text);
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::error::TransportError;
    use futures::stream;

    fn line_stream(lines: Vec<&str>) -> impl Stream<Item = Result<String>> + Unpin {
        stream::iter(lines.into_iter().map(|l| Ok(l.to_string())).collect::<Vec<_>>())
    }

    #[test]
    fn reveals_characters_in_order() {
        tokio_test::block_on(async {
            let lines = line_stream(vec![
                r#"data: {"choices":[{"delta":{"content":"<|channel|>final<|message|>Hi"}}]}"#,
                r#"data: {"choices":[{"delta":{"content":" there<|return|>"}}]}"#,
                "data: [DONE]",
            ]);
            let mut sink = RecordingSink::new();

            let text = drive(lines, &mut sink, Duration::ZERO).await;

            assert_eq!(text, "Hi there");
            assert_eq!(sink.revealed, "Hi there");
            assert_eq!(
                sink.revealed.chars().collect::<Vec<_>>(),
                vec!['H', 'i', ' ', 't', 'h', 'e', 'r', 'e']
            );
            assert_eq!(sink.completions, vec!["Hi there".to_string()]);
        });
    }

    #[test]
    fn turn_complete_fires_once_on_empty_stream() {
        tokio_test::block_on(async {
            let mut sink = RecordingSink::new();
            let text = drive(line_stream(vec![]), &mut sink, Duration::ZERO).await;

            assert_eq!(text, "");
            assert!(sink.revealed.is_empty());
            assert_eq!(sink.completions, vec![String::new()]);
        });
    }

    #[test]
    fn turn_complete_fires_once_without_any_marker() {
        tokio_test::block_on(async {
            let lines = line_stream(vec![
                r#"data: {"choices":[{"delta":{"content":"no markers here"}}]}"#,
                "data: [DONE]",
            ]);
            let mut sink = RecordingSink::new();

            let text = drive(lines, &mut sink, Duration::ZERO).await;

            assert_eq!(text, "");
            assert!(sink.revealed.is_empty());
            assert_eq!(sink.completions.len(), 1);
        });
    }

    #[test]
    fn stream_error_mid_turn_falls_back_to_tail() {
        tokio_test::block_on(async {
            let lines: Vec<Result<String>> = vec![
                Ok(r#"data: {"choices":[{"delta":{"content":"<|channel|>final<|message|>partial"}}]}"#
                    .to_string()),
                Err(TransportError::Stream("connection reset".to_string()).into()),
                Ok(r#"data: {"choices":[{"delta":{"content":" never seen"}}]}"#.to_string()),
            ];
            let mut sink = RecordingSink::new();

            let text = drive(stream::iter(lines), &mut sink, Duration::ZERO).await;

            assert_eq!(text, "partial");
            assert_eq!(sink.revealed, "partial");
        });
    }

    #[test]
    fn lines_after_end_marker_are_not_read() {
        tokio_test::block_on(async {
            let lines = line_stream(vec![
                r#"data: {"choices":[{"delta":{"content":"<|channel|>final<|message|>done<|return|>"}}]}"#,
                r#"data: {"choices":[{"delta":{"content":"trailing noise"}}]}"#,
            ]);
            let mut sink = RecordingSink::new();

            let text = drive(lines, &mut sink, Duration::ZERO).await;

            assert_eq!(text, "done");
            assert_eq!(sink.revealed, "done");
        });
    }

    #[test]
    fn pacing_delay_is_applied_between_characters() {
        tokio_test::block_on(async {
            let lines = line_stream(vec![
                r#"data: {"choices":[{"delta":{"content":"<|channel|>final<|message|>ab<|return|>"}}]}"#,
            ]);
            let mut sink = RecordingSink::new();
            let delay = Duration::from_millis(5);

            let started = tokio::time::Instant::now();
            drive(lines, &mut sink, delay).await;

            assert!(started.elapsed() >= delay * 2);
            assert_eq!(sink.revealed, "ab");
        });
    }
}
