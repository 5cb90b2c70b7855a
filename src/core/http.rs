//! Shared HTTP client for single-shot JSON requests.

use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::error::ChatError;

/// Callback receiving the raw JSON of a request or response.
pub type Inspector = Arc<dyn Fn(&serde_json::Value) + Send + Sync>;

/// Hooks for looking at the exact JSON exchanged with the service.
#[derive(Clone, Default)]
pub struct InspectorConfig {
    pub request_inspector: Option<Inspector>,
    pub response_inspector: Option<Inspector>,
}

impl std::fmt::Debug for InspectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InspectorConfig")
            .field("request_inspector", &self.request_inspector.is_some())
            .field("response_inspector", &self.response_inspector.is_some())
            .finish()
    }
}

/// Configuration for the underlying HTTP client
#[derive(Debug, Clone, Default)]
pub struct HttpClientConfig {
    /// Total time allowed for one request. `None` waits for the transport.
    pub timeout: Option<Duration>,
    /// `User-Agent` header. Defaults to `sparkchat/<version>`.
    pub user_agent: Option<String>,
}

/// HTTP client making exactly one attempt per request.
pub struct HttpClient {
    client: reqwest::Client,
    inspector_config: InspectorConfig,
}

impl HttpClient {
    pub fn new(
        config: &HttpClientConfig,
        inspector_config: InspectorConfig,
    ) -> Result<Self, ChatError> {
        let default_ua = format!("sparkchat/{}", env!("CARGO_PKG_VERSION"));
        let ua = config.user_agent.as_deref().unwrap_or(&default_ua);

        let mut builder = reqwest::Client::builder().user_agent(ua);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            ChatError::Configuration(format!("Failed to build reqwest client: {e}"))
        })?;

        Ok(Self {
            client,
            inspector_config,
        })
    }

    /// POST a JSON body and decode the JSON answer.
    ///
    /// Any transport failure, non-2xx status or undecodable body is a
    /// `CompletionFailed`. Nothing is retried.
    #[tracing::instrument(
        name = "http_post_json",
        skip(self, headers, body),
        fields(url = %url),
        err
    )]
    pub async fn post_json<Req, Res>(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Req,
    ) -> Result<Res, ChatError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let body_value = serde_json::to_value(body)
            .map_err(|e| ChatError::completion_with_source("Failed to serialize request", e))?;

        if let Some(ref inspector) = self.inspector_config.request_inspector {
            inspector(&body_value);
        }

        let mut req_builder = self.client.post(url).json(&body_value);
        for (name, value) in headers {
            req_builder = req_builder.header(name, value);
        }

        let res = req_builder.send().await.map_err(|e| {
            warn!(error = %e, "HTTP request failed");
            ChatError::completion_with_source(format!("Request failed: {e}"), e)
        })?;

        let status = res.status();

        if !status.is_success() {
            warn!(status = %status, "API returned error status");

            let error_text = res.text().await.unwrap_or_default();
            let parsed = serde_json::from_str::<serde_json::Value>(&error_text).ok();

            if let Some(ref inspector) = self.inspector_config.response_inspector {
                let error_value = parsed.clone().unwrap_or_else(|| {
                    serde_json::json!({
                        "error": error_text,
                        "status_code": status.as_u16()
                    })
                });
                inspector(&error_value);
            }

            let detail = match parsed {
                Some(value) => value
                    .get("error")
                    .and_then(|e| e.as_str())
                    .map(str::to_string),
                None => Some(error_text),
            };

            let mut message = format!("API call failed with status: {}", status.as_u16());
            if let Some(detail) = detail.as_deref().map(summarize_detail)
                && !detail.is_empty()
            {
                message.push_str(&format!(" ({detail})"));
            }

            return Err(ChatError::CompletionFailed {
                message,
                status_code: Some(status.as_u16()),
                source: None,
            });
        }

        debug!(status = %status, "HTTP request successful");

        let response_text = res
            .text()
            .await
            .map_err(|e| ChatError::completion_with_source("Failed to read response body", e))?;

        let response_value: serde_json::Value = serde_json::from_str(&response_text)
            .map_err(|e| ChatError::completion_with_source("Failed to parse response as JSON", e))?;

        if let Some(ref inspector) = self.inspector_config.response_inspector {
            inspector(&response_value);
        }

        serde_json::from_value(response_value)
            .map_err(|e| ChatError::completion_with_source("Failed to parse API response", e))
    }
}

/// Longest error detail, in chars, appended to a failure message.
const MAX_DETAIL_CHARS: usize = 120;

/// Collapse whitespace and cap the length so a proxy's HTML error page
/// stays a one-line message.
fn summarize_detail(detail: &str) -> String {
    let collapsed = detail.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(MAX_DETAIL_CHARS) {
        Some((end, _)) => format!("{}...", &collapsed[..end]),
        None => collapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_details_are_kept_verbatim() {
        assert_eq!(summarize_detail("  Model is loading\n"), "Model is loading");
        assert_eq!(summarize_detail("   "), "");
    }

    #[test]
    fn long_details_are_cut_on_a_char_boundary() {
        let detail = "é".repeat(500);
        let summary = summarize_detail(&detail);

        assert_eq!(summary.chars().count(), MAX_DETAIL_CHARS + 3);
        assert!(summary.ends_with("..."));
    }
}
