pub mod huggingface {
    pub const API_BASE: &str = "https://api-inference.huggingface.co";
    pub const MODELS_ENDPOINT: &str = "/models";
    pub const DEFAULT_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";
    pub const BASE_URL_ENV_VAR: &str = "SPARKCHAT_BASE_URL";
    pub const MODEL_ENV_VAR: &str = "SPARKCHAT_MODEL";
    pub const FALLBACK_RESPONSE: &str = "I couldn't generate a response. Please try again.";
}
