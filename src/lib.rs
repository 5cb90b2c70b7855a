//! # sparkchat
//!
//! A small chat client for instruction-tuned models hosted on the Hugging Face
//! Inference API.
//!
//! A [`ChatSession`] keeps the conversation for as long as it lives, reads the
//! stored token once at start-up and sends the whole history as a single
//! Mistral-style prompt on every turn.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sparkchat::{ChatSession, FileStore, HuggingFaceClient, HuggingFaceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HuggingFaceClient::new(HuggingFaceConfig::new())?;
//!     let session = ChatSession::new(client, Arc::new(FileStore::default_location()?))?;
//!
//!     session.save_credential("hf_...")?;
//!     let reply = session.send("What can you help me with?").await?;
//!     println!("{}", reply.content);
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod provider;
pub mod session;
pub mod store;

pub use crate::core::{
    ChatError, ChatRole, CompletionProvider, GenerationConfig, HttpClientConfig, Message,
    SendState, format_prompt,
};
pub use provider::{FALLBACK_RESPONSE, HuggingFaceClient, HuggingFaceConfig};
pub use session::ChatSession;
pub use store::{
    CREDENTIAL_KEY, Conversation, Credential, CredentialStore, FileStore, KeyValueStore,
    MemoryStore,
};
