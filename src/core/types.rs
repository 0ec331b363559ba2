use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gpt-oss-20b-cuda-gpu";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Error,
}

/// A single entry in the conversation log. Immutable once sealed; only an
/// assistant message that is still streaming may have its content set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
    sealed: bool,
}

impl Message {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
            sealed: true,
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            role: Role::Error,
            content: text.into(),
            sealed: true,
        }
    }

    /// An empty assistant message awaiting its streamed content.
    #[must_use]
    pub const fn placeholder() -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
            sealed: false,
        }
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub const fn is_sealed(&self) -> bool {
        self.sealed
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub(crate) fn seal(&mut self, content: String) {
        self.content = content;
        self.sealed = true;
    }
}

/// Handle to a message appended by [`Conversation::push_assistant_placeholder`].
///
/// [`Conversation::push_assistant_placeholder`]: crate::core::conversation::Conversation::push_assistant_placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageId(pub(crate) usize);

/// Projection of a log entry into the outgoing request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadMessage {
    pub role: Role,
    pub content: String,
}

/// Fixed generation parameters sent with every turn. Configuration, not part
/// of the decoder's contract.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl GenerationParams {
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Everything the transport needs to issue one streamed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRequest {
    pub messages: Vec<PayloadMessage>,
    pub params: GenerationParams,
}
