//! Model Provider Port - Interface for generative model integrations.
//!
//! Abstracts all interactions with generative text models so the
//! conversation engine can request completions without coupling to a
//! specific vendor API.
//!
//! # Design
//!
//! - Provider-agnostic message format
//! - Error taxonomy distinguishing retryable (capacity/rate-limit class)
//!   failures from fatal ones, which drives the fallback chain
//! - A cheap `validate()` round trip for startup credential checks

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for generative model interactions.
///
/// Implementations connect to an external model service and translate
/// between the vendor API and these request/response types.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Generate a single completion.
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;

    /// Minimal low-cost round trip confirming the backing credential and
    /// service are reachable. Called at process start, never per turn.
    async fn validate(&self) -> Result<(), ModelError>;

    /// Provider information (name, model identifier).
    fn provider_info(&self) -> ProviderInfo;
}

/// What kind of output a request is tuned for.
///
/// Structure-producing calls run at low temperature; prose-producing calls
/// run warmer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPurpose {
    /// Strict structured output (JSON replies).
    Structure,
    /// Natural-language framing.
    Prose,
}

impl RequestPurpose {
    /// Default sampling temperature for this purpose.
    pub fn default_temperature(&self) -> f32 {
        match self {
            RequestPurpose::Structure => 0.2,
            RequestPurpose::Prose => 0.7,
        }
    }
}

/// Request for a model completion.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// Conversation messages (history + current user message).
    pub messages: Vec<ModelMessage>,
    /// System prompt guiding model behavior.
    pub system_prompt: Option<String>,
    /// Bounded output token budget.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// What this request is tuned for.
    pub purpose: RequestPurpose,
}

impl ModelRequest {
    /// Creates a structure-tuned request (low temperature).
    pub fn structure() -> Self {
        Self::with_purpose(RequestPurpose::Structure)
    }

    /// Creates a prose-tuned request (higher temperature).
    pub fn prose() -> Self {
        Self::with_purpose(RequestPurpose::Prose)
    }

    fn with_purpose(purpose: RequestPurpose) -> Self {
        Self {
            messages: Vec::new(),
            system_prompt: None,
            max_tokens: 1024,
            temperature: purpose.default_temperature(),
            purpose,
        }
    }

    /// Adds a message to the conversation.
    pub fn with_message(mut self, role: MessageRole, content: impl Into<String>) -> Self {
        self.messages.push(ModelMessage {
            role,
            content: content.into(),
        });
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the output token budget.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    /// Overrides the sampling temperature.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }
}

/// A message in the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMessage {
    /// Who sent this message.
    pub role: MessageRole,
    /// Message content.
    pub content: String,
}

impl ModelMessage {
    /// Creates a new message.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Role of the message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User input.
    User,
    /// Model response.
    Assistant,
}

/// Response from a model completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResponse {
    /// Generated text.
    pub content: String,
    /// Model identifier that generated the response.
    pub model: String,
}

/// Provider information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "anthropic").
    pub name: String,
    /// Model identifier (e.g., "claude-sonnet-4-20250514").
    pub model: String,
}

impl ProviderInfo {
    /// Creates new provider info.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Model provider errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    /// Rate limited by the provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Provider is at capacity or otherwise unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// No usable model credential is configured.
    #[error("no model credential configured")]
    NotConfigured,

    /// Network error during the request.
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },

    /// Failed to parse the provider's response envelope.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Every candidate model in a fallback chain failed.
    #[error("all {attempts} candidate models failed; last error: {last}")]
    AllCandidatesFailed {
        /// Number of candidates tried.
        attempts: usize,
        /// The final candidate's error, stringified.
        last: String,
    },
}

impl ModelError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// True when the failure is capacity-class and the next candidate in a
    /// fallback chain should be tried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ModelError::RateLimited { .. }
                | ModelError::Unavailable { .. }
                | ModelError::Network(_)
                | ModelError::Timeout { .. }
        )
    }
}
