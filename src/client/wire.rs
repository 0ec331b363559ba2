use serde::Serialize;

use crate::core::types::{PayloadMessage, TurnRequest};

/// Request body for `/v1/chat/completions`. `stream` is always true for a
/// streamed turn; the decoder has no non-streaming path.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<PayloadMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

pub fn to_api_request(request: &TurnRequest) -> ChatRequest {
    ChatRequest {
        model: request.params.model.clone(),
        messages: request.messages.clone(),
        temperature: request.params.temperature,
        max_tokens: request.params.max_tokens,
        stream: true,
    }
}
