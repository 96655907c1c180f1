//! Fallback Model Provider - ordered candidate chain.
//!
//! Wraps an ordered list of providers (typically one per model identifier).
//! A capacity-class failure (rate limit, overload, network, timeout)
//! advances to the next candidate; any other failure aborts immediately and
//! surfaces as-is. When every candidate fails, the chain returns a single
//! aggregated failure.
//!
//! # Example
//!
//! ```ignore
//! let chain = FallbackModelProvider::new(Arc::new(sonnet))
//!     .with_candidate(Arc::new(haiku))
//!     .with_event_callback(Arc::new(LoggingCallback));
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::ports::{ModelError, ModelProvider, ModelRequest, ModelResponse, ProviderInfo};

/// Callback for observing fallback transitions.
pub trait ModelEventCallback: Send + Sync {
    /// Called when a candidate fails with a retryable error and the chain
    /// advances to the next one.
    fn on_fallback(&self, from_model: &str, to_model: &str, reason: &str);
}

/// No-op event callback for when fallback tracking isn't needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl ModelEventCallback for NoOpCallback {
    fn on_fallback(&self, _from_model: &str, _to_model: &str, _reason: &str) {}
}

/// Model provider with an ordered fallback chain.
pub struct FallbackModelProvider {
    candidates: Vec<Arc<dyn ModelProvider>>,
    callback: Arc<dyn ModelEventCallback>,
}

impl FallbackModelProvider {
    /// Creates a chain with a single primary candidate.
    pub fn new(primary: Arc<dyn ModelProvider>) -> Self {
        Self {
            candidates: vec![primary],
            callback: Arc::new(NoOpCallback),
        }
    }

    /// Appends a candidate to the end of the chain.
    pub fn with_candidate(mut self, candidate: Arc<dyn ModelProvider>) -> Self {
        self.candidates.push(candidate);
        self
    }

    /// Sets the event callback for fallback transitions.
    pub fn with_event_callback(mut self, callback: Arc<dyn ModelEventCallback>) -> Self {
        self.callback = callback;
        self
    }

    /// Number of candidates in the chain.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// True when the chain has no candidates (never the case after `new`).
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Runs `attempt` against each candidate in order. Retryable failures
    /// advance the chain; fatal failures abort; exhaustion aggregates.
    async fn try_in_order<F, Fut>(&self, mut attempt: F) -> Result<ModelResponse, ModelError>
    where
        F: FnMut(Arc<dyn ModelProvider>) -> Fut,
        Fut: std::future::Future<Output = Result<ModelResponse, ModelError>>,
    {
        let mut last_error = ModelError::NotConfigured;

        for (i, candidate) in self.candidates.iter().enumerate() {
            match attempt(candidate.clone()).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() => {
                    let from = candidate.provider_info().model;
                    if let Some(next) = self.candidates.get(i + 1) {
                        let to = next.provider_info().model;
                        tracing::warn!(
                            "model {} failed ({}), falling back to {}",
                            from,
                            err,
                            to
                        );
                        self.callback.on_fallback(&from, &to, &err.to_string());
                    }
                    last_error = err;
                }
                Err(err) => return Err(err),
            }
        }

        Err(ModelError::AllCandidatesFailed {
            attempts: self.candidates.len(),
            last: last_error.to_string(),
        })
    }
}

#[async_trait]
impl ModelProvider for FallbackModelProvider {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        self.try_in_order(|candidate| {
            let request = request.clone();
            async move { candidate.complete(request).await }
        })
        .await
    }

    async fn validate(&self) -> Result<(), ModelError> {
        // A chain is usable if any candidate validates.
        let mut last_error = ModelError::NotConfigured;
        for candidate in &self.candidates {
            match candidate.validate().await {
                Ok(()) => return Ok(()),
                Err(err) => last_error = err,
            }
        }
        Err(last_error)
    }

    fn provider_info(&self) -> ProviderInfo {
        self.candidates
            .first()
            .map(|c| c.provider_info())
            .unwrap_or_else(|| ProviderInfo::new("none", "none"))
    }
}
