//! Mock Model Provider for testing.
//!
//! Configurable implementation of the ModelProvider port so tests can run
//! without calling a real model service.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in order
//! - Error injection for resilience testing
//! - Simulated delays for timeout testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockModelProvider::new()
//!     .with_response("{\"message\": \"hi\"}")
//!     .with_error(ModelError::rate_limited(30));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{ModelError, ModelProvider, ModelRequest, ModelResponse, ProviderInfo};

/// A configured mock outcome.
#[derive(Debug, Clone)]
enum MockOutcome {
    Success(String),
    Error(ModelError),
}

/// Mock model provider for testing.
///
/// Clones share the response queue and call history.
#[derive(Debug, Clone)]
pub struct MockModelProvider {
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
    info: ProviderInfo,
    delay: Duration,
    validation_error: Option<ModelError>,
    calls: Arc<Mutex<Vec<ModelRequest>>>,
}

impl Default for MockModelProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockModelProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            validation_error: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful response.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(MockOutcome::Success(content.into()));
        self
    }

    /// Queues an error response.
    pub fn with_error(self, error: ModelError) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(MockOutcome::Error(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the provider info.
    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Makes `validate()` fail with the given error.
    pub fn with_validation_error(mut self, error: ModelError) -> Self {
        self.validation_error = Some(error);
        self
    }

    /// Number of completion calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// All recorded completion requests.
    pub fn get_calls(&self) -> Vec<ModelRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn next_outcome(&self) -> MockOutcome {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockOutcome::Success("Mock response".to_string()))
    }
}

#[async_trait]
impl ModelProvider for MockModelProvider {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_outcome() {
            MockOutcome::Success(content) => Ok(ModelResponse {
                content,
                model: self.info.model.clone(),
            }),
            MockOutcome::Error(error) => Err(error),
        }
    }

    async fn validate(&self) -> Result<(), ModelError> {
        match &self.validation_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MessageRole;

    fn request() -> ModelRequest {
        ModelRequest::structure().with_message(MessageRole::User, "hello")
    }

    #[tokio::test]
    async fn returns_queued_responses_in_order() {
        let provider = MockModelProvider::new()
            .with_response("first")
            .with_response("second");

        assert_eq!(provider.complete(request()).await.unwrap().content, "first");
        assert_eq!(provider.complete(request()).await.unwrap().content, "second");
    }

    #[tokio::test]
    async fn returns_queued_errors() {
        let provider = MockModelProvider::new().with_error(ModelError::rate_limited(30));
        let result = provider.complete(request()).await;
        assert!(matches!(result, Err(ModelError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn empty_queue_yields_default_response() {
        let provider = MockModelProvider::new();
        assert_eq!(
            provider.complete(request()).await.unwrap().content,
            "Mock response"
        );
    }

    #[tokio::test]
    async fn records_calls_across_clones() {
        let provider = MockModelProvider::new();
        let clone = provider.clone();
        clone.complete(request()).await.unwrap();
        clone.complete(request()).await.unwrap();

        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.get_calls()[0].messages[0].content, "hello");
    }

    #[tokio::test]
    async fn validation_passes_by_default_and_fails_when_configured() {
        assert!(MockModelProvider::new().validate().await.is_ok());

        let failing =
            MockModelProvider::new().with_validation_error(ModelError::AuthenticationFailed);
        assert!(matches!(
            failing.validate().await,
            Err(ModelError::AuthenticationFailed)
        ));
    }
}
