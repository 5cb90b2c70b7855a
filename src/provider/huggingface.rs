//! Hugging Face Inference API provider.
//!
//! Sends the whole conversation as one Mistral-formatted prompt to
//! `POST {base_url}/models/{model}` and reads back the first generation.
//!
//! Request body:
//! ```json
//! { "inputs": "<s>[INST] Hi [/INST]",
//!   "parameters": { "max_new_tokens": 1024, "temperature": 0.7,
//!                   "top_p": 0.95, "return_full_text": false } }
//! ```
//! Response body: `[{ "generated_text": "..." }]`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{
    ChatError, ChatRole, CompletionProvider, GenerationConfig, HttpClient, HttpClientConfig,
    InspectorConfig, Message, format_prompt,
};
use crate::provider::constants::huggingface;

#[derive(Debug, Serialize)]
struct TextGenerationRequest<'a> {
    inputs: String,
    parameters: &'a GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct Generation {
    #[serde(default)]
    generated_text: Option<String>,
}

/// Hugging Face specific configuration
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub base_url: String,
    pub model: String,
    pub generation_config: GenerationConfig,
    pub http_config: HttpClientConfig,
    pub inspector_config: InspectorConfig,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HuggingFaceConfig {
    pub fn new() -> Self {
        Self {
            base_url: huggingface::API_BASE.to_string(),
            model: huggingface::DEFAULT_MODEL.to_string(),
            generation_config: GenerationConfig::default(),
            http_config: HttpClientConfig::default(),
            inspector_config: InspectorConfig::default(),
        }
    }

    /// Defaults, with the base URL and model overridable through
    /// `SPARKCHAT_BASE_URL` and `SPARKCHAT_MODEL`.
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Ok(base_url) = std::env::var(huggingface::BASE_URL_ENV_VAR)
            && !base_url.trim().is_empty()
        {
            config = config.with_base_url(base_url.trim().to_string());
        }

        if let Ok(model) = std::env::var(huggingface::MODEL_ENV_VAR)
            && !model.trim().is_empty()
        {
            config = config.with_model(model.trim().to_string());
        }

        config
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = config;
        self
    }

    pub fn with_http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    pub fn with_request_inspector<F>(mut self, inspector: F) -> Self
    where
        F: Fn(&serde_json::Value) + Send + Sync + 'static,
    {
        self.inspector_config.request_inspector = Some(Arc::new(inspector));
        self
    }

    pub fn with_response_inspector<F>(mut self, inspector: F) -> Self
    where
        F: Fn(&serde_json::Value) + Send + Sync + 'static,
    {
        self.inspector_config.response_inspector = Some(Arc::new(inspector));
        self
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            huggingface::MODELS_ENDPOINT,
            self.model
        )
    }
}

pub struct HuggingFaceClient {
    config: HuggingFaceConfig,
    http: HttpClient,
}

impl HuggingFaceClient {
    pub fn new(config: HuggingFaceConfig) -> Result<Self, ChatError> {
        let http = HttpClient::new(&config.http_config, config.inspector_config.clone())?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &HuggingFaceConfig {
        &self.config
    }
}

#[async_trait]
impl CompletionProvider for HuggingFaceClient {
    #[tracing::instrument(
        name = "huggingface_complete",
        skip(self, history, credential),
        fields(model = %self.config.model, turns = history.len()),
        err
    )]
    async fn complete(&self, history: &[Message], credential: &str) -> Result<String, ChatError> {
        if credential.trim().is_empty() {
            return Err(ChatError::Unauthenticated);
        }

        match history.last() {
            Some(last) if last.role == ChatRole::User => {}
            Some(_) => {
                return Err(ChatError::InvalidHistory(
                    "the last message has already been answered".to_string(),
                ));
            }
            None => {
                return Err(ChatError::InvalidHistory(
                    "no user message to answer".to_string(),
                ));
            }
        }

        let request = TextGenerationRequest {
            inputs: format_prompt(history),
            parameters: &self.config.generation_config,
        };

        let headers = vec![(
            "Authorization".to_string(),
            format!("Bearer {}", credential.trim()),
        )];

        let generations: Vec<Generation> = self
            .http
            .post_json(&self.config.endpoint(), &headers, &request)
            .await?;

        Ok(extract_generated_text(generations))
    }
}

/// First generation's text, or the fixed fallback when there is none.
fn extract_generated_text(generations: Vec<Generation>) -> String {
    generations
        .into_iter()
        .next()
        .and_then(|generation| generation.generated_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| {
            tracing::debug!("Response carried no generated text, using fallback");
            huggingface::FALLBACK_RESPONSE.to_string()
        })
}
