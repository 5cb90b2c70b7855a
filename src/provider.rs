pub(crate) mod constants;
pub mod huggingface;

pub use constants::huggingface::{DEFAULT_MODEL, FALLBACK_RESPONSE};
pub use huggingface::{HuggingFaceClient, HuggingFaceConfig};
