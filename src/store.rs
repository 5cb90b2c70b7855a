pub mod conversation;
pub mod credential;
pub mod kv;

pub use conversation::Conversation;
pub use credential::{CREDENTIAL_KEY, Credential, CredentialStore};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
