use super::error::{ChatError, Result};
use super::types::{Message, MessageId, PayloadMessage, Role};

/// Ordered, append-only log of one chat session. Owned by the session;
/// single writer, single turn in flight.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Appends a user message. Rejects empty or whitespace-only text before
    /// touching the log.
    pub fn push_user(&mut self, text: impl Into<String>) -> Result<&Message> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ChatError::InvalidInput);
        }
        self.messages.push(Message::user(text));
        Ok(&self.messages[self.messages.len() - 1])
    }

    /// Appends an empty assistant message for the turn in flight. The decoder
    /// seals it via [`finalize`](Self::finalize) once the turn completes.
    pub fn push_assistant_placeholder(&mut self) -> MessageId {
        self.messages.push(Message::placeholder());
        MessageId(self.messages.len() - 1)
    }

    pub fn push_error(&mut self, text: impl Into<String>) {
        self.messages.push(Message::error(text));
    }

    /// Removes the most recent message if its role matches. No-op otherwise.
    pub fn rollback_last(&mut self, role: Role) -> bool {
        if matches!(self.messages.last(), Some(m) if m.role() == role) {
            self.messages.pop();
            return true;
        }
        false
    }

    /// Seals a streaming placeholder with its final content. No-op if the
    /// handle is stale or the message was already sealed.
    pub fn finalize(&mut self, id: MessageId, text: impl Into<String>) -> bool {
        match self.messages.get_mut(id.0) {
            Some(m) if m.role() == Role::Assistant && !m.is_sealed() => {
                m.seal(text.into());
                true
            }
            _ => false,
        }
    }

    /// Drops a trailing placeholder left behind by a cancelled turn, so every
    /// turn starts from a log holding only finalized messages.
    pub fn discard_unfinished(&mut self) -> bool {
        if matches!(self.messages.last(), Some(m) if !m.is_sealed()) {
            self.messages.pop();
            return true;
        }
        false
    }

    /// Projects the log into the outgoing request body, in chronological
    /// order. Error messages and unsealed placeholders are never sent back to
    /// the model.
    #[must_use]
    pub fn to_payload(&self) -> Vec<PayloadMessage> {
        self.messages
            .iter()
            .filter(|m| m.role() != Role::Error && m.is_sealed())
            .map(|m| PayloadMessage {
                role: m.role(),
                content: m.content().to_string(),
            })
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(id.0)
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
