use crate::core::{ChatError, ChatRole, Message};

/// Append-only, ordered record of one session's messages.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank user messages are rejected; anything else is appended as is.
    pub fn append(&mut self, message: Message) -> Result<(), ChatError> {
        if message.role == ChatRole::User && message.content.trim().is_empty() {
            return Err(ChatError::EmptyInput);
        }
        self.messages.push(message);
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
