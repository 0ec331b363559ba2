use serde::Deserialize;

/// Data-record prefix on a protocol line.
pub const DATA_PREFIX: &str = "data: ";

/// Explicit end-of-stream sentinel sent by the server.
pub const DONE_SENTINEL: &str = "data: [DONE]";

/// One streamed chat-completion chunk. Lenient by construction: any field
/// missing from the record degrades to "no fragment" rather than a parse
/// error.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// Parses one line's JSON payload and extracts the incremental text fragment
/// at `choices[0].delta.content`. Returns `None` for malformed records,
/// records of a different shape, and empty fragments alike.
pub fn delta_content(payload: &str) -> Option<String> {
    let chunk: ChatChunk = serde_json::from_str(payload).ok()?;
    chunk
        .choices
        .into_iter()
        .next()?
        .delta
        .content
        .filter(|content| !content.is_empty())
}
