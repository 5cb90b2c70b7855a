pub mod error;
pub mod http;
pub mod prompt;
pub mod traits;
pub mod types;

pub use error::ChatError;
pub use http::{HttpClient, HttpClientConfig, Inspector, InspectorConfig};
pub use prompt::format_prompt;
pub use traits::CompletionProvider;
pub use types::{ChatRole, GenerationConfig, Message, SendState};
