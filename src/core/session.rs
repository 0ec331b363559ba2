use std::sync::Arc;
use std::time::Duration;

use super::conversation::Conversation;
use super::error::Result;
use super::transport::ChatTransport;
use super::types::{GenerationParams, Role, TurnRequest};
use crate::decoder::reveal::{self, DEFAULT_REVEAL_DELAY, RevealSink};

/// Orchestrates one turn at a time: append the user message, open the
/// stream, run the decoder, finalize or roll back. Owns the conversation
/// log exclusively.
pub struct ChatSession {
    transport: Arc<dyn ChatTransport>,
    conversation: Conversation,
    params: GenerationParams,
    reveal_delay: Duration,
}

impl ChatSession {
    #[must_use]
    pub fn new(transport: Arc<dyn ChatTransport>, params: GenerationParams) -> Self {
        Self {
            transport,
            conversation: Conversation::new(),
            params,
            reveal_delay: DEFAULT_REVEAL_DELAY,
        }
    }

    #[must_use]
    pub const fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }

    #[must_use]
    pub const fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    #[must_use]
    pub const fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Runs one full turn. Returns the finalized assistant content, which is
    /// empty when the model never produced a start marker. An empty result is
    /// a terminal state, not an error.
    ///
    /// On transport failure the just-added user message is rolled back and an
    /// error message is recorded in its place; partial output already revealed
    /// to the sink is never retracted. Cancellation is dropping the returned
    /// future; the log is repaired at the start of the next turn.
    pub async fn send(&mut self, input: &str, sink: &mut dyn RevealSink) -> Result<String> {
        if self.conversation.discard_unfinished() {
            tracing::debug!("discarded placeholder left by a cancelled turn");
        }

        self.conversation.push_user(input)?;

        let request = TurnRequest {
            messages: self.conversation.to_payload(),
            params: self.params.clone(),
        };

        let lines = match self.transport.open(&request).await {
            Ok(lines) => lines,
            Err(err) => {
                tracing::warn!(error = %err, "turn failed before any response was read");
                self.conversation.rollback_last(Role::User);
                self.conversation.push_error(err.to_string());
                return Err(err);
            }
        };

        let placeholder = self.conversation.push_assistant_placeholder();
        let text = reveal::drive(lines, sink, self.reveal_delay).await;
        self.conversation.finalize(placeholder, text.clone());

        Ok(text)
    }
}
