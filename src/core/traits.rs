use async_trait::async_trait;

use super::{error::ChatError, types::Message};

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Turn a conversation ending in an unanswered user turn into the
    /// assistant's reply text.
    ///
    /// Implementations make at most one remote call and never retry.
    async fn complete(&self, history: &[Message], credential: &str) -> Result<String, ChatError>;
}
