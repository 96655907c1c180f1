//! Anthropic Provider - Implementation of ModelProvider for the Claude API.
//!
//! One provider instance wraps one model identifier. Each completion issues
//! a single request; capacity-class failures are surfaced as retryable
//! errors so the fallback chain can advance to the next candidate model.
//!
//! # Configuration
//!
//! ```ignore
//! let config = AnthropicConfig::new(api_key)
//!     .with_model("claude-sonnet-4-20250514")
//!     .with_base_url("https://api.anthropic.com");
//!
//! let provider = AnthropicProvider::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    MessageRole, ModelError, ModelProvider, ModelRequest, ModelResponse, ProviderInfo,
};

/// Anthropic API version header value.
const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Configuration for the Anthropic provider.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model identifier (e.g., "claude-sonnet-4-20250514").
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl AnthropicConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Anthropic API provider implementation.
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider with the given configuration.
    pub fn new(config: AnthropicConfig) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ModelError::InvalidRequest(format!("http client: {e}")))?;

        Ok(Self { config, client })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url)
    }

    fn to_api_request(&self, request: &ModelRequest) -> ApiRequest {
        let mut messages: Vec<ApiMessage> = request
            .messages
            .iter()
            .map(|msg| ApiMessage {
                role: match msg.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                }
                .to_string(),
                content: msg.content.clone(),
            })
            .collect();

        // The API requires at least one message.
        if messages.is_empty() {
            messages.push(ApiMessage {
                role: "user".to_string(),
                content: "Hello".to_string(),
            });
        }

        ApiRequest {
            model: self.config.model.clone(),
            messages,
            system: request.system_prompt.clone(),
            max_tokens: request.max_tokens,
            temperature: Some(request.temperature),
        }
    }

    async fn send_request(&self, request: &ModelRequest) -> Result<Response, ModelError> {
        let api_request = self.to_api_request(request);

        self.client
            .post(self.messages_url())
            .header("x-api-key", self.config.api_key())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .header("Content-Type", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    ModelError::network(format!("connection failed: {e}"))
                } else {
                    ModelError::network(e.to_string())
                }
            })
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, ModelError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(ModelError::AuthenticationFailed),
            429 => Err(ModelError::rate_limited(Self::parse_retry_after(
                &error_body,
            ))),
            400 => Err(ModelError::InvalidRequest(error_body)),
            // 529 is Anthropic's overloaded status.
            500..=599 => Err(ModelError::unavailable(format!(
                "server error {status}: {error_body}"
            ))),
            _ => Err(ModelError::network(format!(
                "unexpected status {status}: {error_body}"
            ))),
        }
    }

    /// Pulls a retry hint out of an error body, defaulting to 60s.
    fn parse_retry_after(error_body: &str) -> u32 {
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(error_body) {
            if let Some(msg) = parsed
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
            {
                if let Some(idx) = msg.find("try again in ") {
                    let rest = &msg[idx + 13..];
                    if let Some(num_end) = rest.find(|c: char| !c.is_ascii_digit()) {
                        if let Ok(secs) = rest[..num_end].parse::<u32>() {
                            return secs;
                        }
                    }
                }
            }
        }
        60
    }

    async fn parse_response(&self, response: Response) -> Result<ModelResponse, ModelError> {
        let response = self.handle_response_status(response).await?;

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::parse(format!("failed to parse response: {e}")))?;

        let content = api_response
            .content
            .into_iter()
            .filter_map(|block| {
                if block.block_type == "text" {
                    block.text
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");

        Ok(ModelResponse {
            content,
            model: api_response.model,
        })
    }
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let response = self.send_request(&request).await?;
        self.parse_response(response).await
    }

    async fn validate(&self) -> Result<(), ModelError> {
        // Smallest possible round trip: one token of output.
        let ping = ModelRequest::structure()
            .with_message(MessageRole::User, "ping")
            .with_max_tokens(1);

        self.complete(ping).await.map(|_| ())
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("anthropic", self.config.model.clone())
    }
}

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ApiContentBlock>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ApiContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> AnthropicProvider {
        AnthropicProvider::new(AnthropicConfig::new("sk-ant-test")).unwrap()
    }

    #[test]
    fn config_builder_works() {
        let config = AnthropicConfig::new("sk-ant-test")
            .with_model("claude-3-5-haiku-20241022")
            .with_base_url("http://localhost:9999")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.model, "claude-3-5-haiku-20241022");
        assert_eq!(config.base_url, "http://localhost:9999");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn request_mapping_preserves_roles_and_parameters() {
        let request = ModelRequest::structure()
            .with_system_prompt("Reply in JSON")
            .with_message(MessageRole::User, "hi")
            .with_message(MessageRole::Assistant, "hello")
            .with_max_tokens(256);

        let api_request = provider().to_api_request(&request);

        assert_eq!(api_request.model, "claude-sonnet-4-20250514");
        assert_eq!(api_request.system.as_deref(), Some("Reply in JSON"));
        assert_eq!(api_request.max_tokens, 256);
        assert_eq!(api_request.messages.len(), 2);
        assert_eq!(api_request.messages[0].role, "user");
        assert_eq!(api_request.messages[1].role, "assistant");
    }

    #[test]
    fn empty_message_list_gets_a_placeholder() {
        let api_request = provider().to_api_request(&ModelRequest::structure());
        assert_eq!(api_request.messages.len(), 1);
        assert_eq!(api_request.messages[0].role, "user");
    }

    #[test]
    fn retry_after_is_parsed_from_error_body() {
        let body = r#"{"error": {"message": "rate limited, try again in 42s"}}"#;
        assert_eq!(AnthropicProvider::parse_retry_after(body), 42);
    }

    #[test]
    fn retry_after_defaults_without_a_hint() {
        assert_eq!(AnthropicProvider::parse_retry_after("not json"), 60);
        assert_eq!(
            AnthropicProvider::parse_retry_after(r#"{"error": {"message": "slow down"}}"#),
            60
        );
    }

    #[test]
    fn provider_info_reports_model() {
        let info = provider().provider_info();
        assert_eq!(info.name, "anthropic");
        assert_eq!(info.model, "claude-sonnet-4-20250514");
    }
}
