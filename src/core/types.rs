use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: ChatRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Configuration for text generation parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationConfig {
    /// Upper bound on generated tokens
    pub max_new_tokens: u32,

    /// Sampling temperature
    pub temperature: f64,

    /// Nucleus sampling parameter (0.0 to 1.0)
    pub top_p: f64,

    /// When false the service returns only the continuation, not the prompt
    pub return_full_text: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: 1024,
            temperature: 0.7,
            top_p: 0.95,
            return_full_text: false,
        }
    }
}

/// Where a session is in its send cycle.
///
/// A send resolves to `Ok` (succeeded) or `Err` (failed) and the session is
/// back to `Idle` in both cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Sending,
}
