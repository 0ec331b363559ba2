use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};

use super::error::TransportError;

/// Incremental splitter turning arbitrary byte chunks into complete lines.
/// Splits on `\n` before UTF-8 decoding, so a chunk boundary inside a
/// multi-byte character never corrupts the text. Strips a trailing `\r`.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let rest = self.buf.split_off(pos + 1);
            let mut line = std::mem::replace(&mut self.buf, rest);
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Drains a trailing line that never received its newline.
    pub fn flush(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        Some(line)
    }
}

/// Adapts a response-body byte stream into a stream of raw lines. The source
/// ending flushes any unterminated final line.
pub fn decode_lines<S>(byte_stream: S) -> impl Stream<Item = Result<String, TransportError>>
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Unpin,
{
    let buffer = Arc::new(Mutex::new(LineBuffer::new()));

    byte_stream
        .map(Some)
        .chain(futures::stream::iter(vec![None]))
        .flat_map(move |item| {
            let buffer = buffer.clone();
            let out: Vec<Result<String, TransportError>> = match item {
                Some(Ok(bytes)) => buffer
                    .lock()
                    .map(|mut b| b.push(&bytes))
                    .unwrap_or_default()
                    .into_iter()
                    .map(Ok)
                    .collect(),
                Some(Err(e)) => vec![Err(TransportError::Stream(e.to_string()))],
                None => buffer
                    .lock()
                    .ok()
                    .and_then(|mut b| b.flush())
                    .map(Ok)
                    .into_iter()
                    .collect(),
            };
            futures::stream::iter(out)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_line() {
        let mut buffer = LineBuffer::new();
        let lines = buffer.push(b"data: hello\n");
        assert_eq!(lines, vec!["data: hello"]);
    }

    #[test]
    fn test_partial_line_buffers() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"data: hel").is_empty());
        assert_eq!(buffer.push(b"lo\n"), vec!["data: hello"]);
    }

    #[test]
    fn test_multiple_lines_in_one_chunk() {
        let mut buffer = LineBuffer::new();
        let lines = buffer.push(b"first\nsecond\nthird\n");
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_carriage_return_stripped() {
        let mut buffer = LineBuffer::new();
        let lines = buffer.push(b"data: hello\r\n");
        assert_eq!(lines, vec!["data: hello"]);
    }

    #[test]
    fn test_blank_lines_preserved() {
        let mut buffer = LineBuffer::new();
        let lines = buffer.push(b"\n\ndata: x\n");
        assert_eq!(lines, vec!["", "", "data: x"]);
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        let mut buffer = LineBuffer::new();
        let text = "héllo ✓".as_bytes();
        // split inside the two-byte 'é'
        assert!(buffer.push(&text[..2]).is_empty());
        let lines = buffer.push(&[&text[2..], b"\n"].concat());
        assert_eq!(lines, vec!["héllo ✓"]);
    }

    #[test]
    fn test_flush_returns_trailing_line() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"no newline yet");
        assert_eq!(buffer.flush(), Some("no newline yet".to_string()));
        assert_eq!(buffer.flush(), None);
    }

    #[test]
    fn test_empty_chunk() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"").is_empty());
    }

    #[tokio::test]
    async fn test_decode_lines_flushes_tail() {
        let chunks: Vec<Result<Bytes, reqwest::Error>> = vec![
            Ok(Bytes::from_static(b"data: one\nda")),
            Ok(Bytes::from_static(b"ta: two\ndata: tail")),
        ];
        let lines: Vec<_> = decode_lines(futures::stream::iter(chunks))
            .map(|r| r.unwrap())
            .collect()
            .await;

        assert_eq!(lines, vec!["data: one", "data: two", "data: tail"]);
    }
}
