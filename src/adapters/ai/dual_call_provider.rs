//! Dual-Call Provider - optional parallel prose/structure mode.
//!
//! Issues two concurrent completions for one request: a warm prose-tuned
//! call for natural-language framing and a cold structure-tuned call for
//! the strict JSON payload, joined under a single shared wall-clock
//! deadline. The prose message is spliced into the structured reply. If the
//! deadline elapses, either leg fails, or the splice cannot be performed,
//! the provider falls back to one combined single-model call rather than
//! propagating partial results.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::ports::{
    ModelError, ModelProvider, ModelRequest, ModelResponse, ProviderInfo, RequestPurpose,
};

/// Shared deadline for the parallel legs.
const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider that races a prose leg and a structure leg.
pub struct DualCallProvider {
    prose: Arc<dyn ModelProvider>,
    structure: Arc<dyn ModelProvider>,
    timeout: Duration,
}

impl DualCallProvider {
    /// Creates a dual-call provider over a prose-tuned and a
    /// structure-tuned provider. The structure provider also serves the
    /// combined fallback call.
    pub fn new(prose: Arc<dyn ModelProvider>, structure: Arc<dyn ModelProvider>) -> Self {
        Self {
            prose,
            structure,
            timeout: DEFAULT_JOIN_TIMEOUT,
        }
    }

    /// Sets the shared join timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Splices the prose leg's text into the structure leg's JSON object as
    /// its `message`. `None` when the structured content isn't a usable
    /// JSON object.
    fn splice(structure_content: &str, prose_content: &str) -> Option<String> {
        let start = structure_content.find('{')?;
        let end = structure_content.rfind('}')?;
        if end <= start {
            return None;
        }

        let mut value: serde_json::Value =
            serde_json::from_str(&structure_content[start..=end]).ok()?;
        let object = value.as_object_mut()?;

        // If the prose leg itself answered in JSON, lift its message field;
        // otherwise use the raw text.
        let message = match serde_json::from_str::<serde_json::Value>(prose_content.trim()) {
            Ok(serde_json::Value::Object(prose_obj)) => prose_obj
                .get("message")
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())?,
            _ => prose_content.trim().to_string(),
        };

        if message.is_empty() {
            return None;
        }

        object.insert("message".to_string(), serde_json::Value::String(message));
        serde_json::to_string(&value).ok()
    }

    async fn combined_call(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        self.structure.complete(request).await
    }
}

#[async_trait]
impl ModelProvider for DualCallProvider {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let prose_request = request
            .clone()
            .with_temperature(RequestPurpose::Prose.default_temperature());
        let structure_request = request.clone();

        let prose = self.prose.clone();
        let structure = self.structure.clone();
        let race = futures::future::join(
            async move { prose.complete(prose_request).await },
            async move { structure.complete(structure_request).await },
        );

        match tokio::time::timeout(self.timeout, race).await {
            Ok((Ok(prose_response), Ok(structure_response))) => {
                match Self::splice(&structure_response.content, &prose_response.content) {
                    Some(content) => Ok(ModelResponse {
                        content,
                        model: structure_response.model,
                    }),
                    None => {
                        tracing::debug!("dual-call splice failed, issuing combined call");
                        self.combined_call(request).await
                    }
                }
            }
            Ok((prose_result, structure_result)) => {
                let reason = prose_result
                    .err()
                    .or(structure_result.err())
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                tracing::debug!("dual-call leg failed ({}), issuing combined call", reason);
                self.combined_call(request).await
            }
            Err(_) => {
                tracing::debug!(
                    "dual-call deadline of {:?} elapsed, issuing combined call",
                    self.timeout
                );
                self.combined_call(request).await
            }
        }
    }

    async fn validate(&self) -> Result<(), ModelError> {
        self.structure.validate().await
    }

    fn provider_info(&self) -> ProviderInfo {
        self.structure.provider_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockModelProvider;
    use crate::ports::MessageRole;

    fn request() -> ModelRequest {
        ModelRequest::structure().with_message(MessageRole::User, "hello")
    }

    #[tokio::test]
    async fn splices_prose_message_into_structured_reply() {
        let prose = MockModelProvider::new().with_response("Here's a friendly question!");
        let structure = MockModelProvider::new()
            .with_response(r#"{"message": "stub", "workflow_complete": false}"#);

        let provider = DualCallProvider::new(Arc::new(prose), Arc::new(structure));
        let response = provider.complete(request()).await.unwrap();

        let value: serde_json::Value = serde_json::from_str(&response.content).unwrap();
        assert_eq!(value["message"], "Here's a friendly question!");
        assert_eq!(value["workflow_complete"], false);
    }

    #[tokio::test]
    async fn prose_leg_in_json_form_is_lifted() {
        let prose =
            MockModelProvider::new().with_response(r#"{"message": "From the prose leg"}"#);
        let structure = MockModelProvider::new().with_response(r#"{"message": "stub"}"#);

        let provider = DualCallProvider::new(Arc::new(prose), Arc::new(structure));
        let response = provider.complete(request()).await.unwrap();

        let value: serde_json::Value = serde_json::from_str(&response.content).unwrap();
        assert_eq!(value["message"], "From the prose leg");
    }

    #[tokio::test]
    async fn failed_leg_falls_back_to_combined_call() {
        let prose = MockModelProvider::new().with_error(ModelError::unavailable("down"));
        let structure = MockModelProvider::new()
            .with_response(r#"{"message": "unused first"}"#)
            .with_response(r#"{"message": "combined"}"#);
        let structure_handle = structure.clone();

        let provider = DualCallProvider::new(Arc::new(prose), Arc::new(structure));
        let response = provider.complete(request()).await.unwrap();

        assert!(response.content.contains("combined"));
        // One structure leg call plus the combined fallback call.
        assert_eq!(structure_handle.call_count(), 2);
    }

    #[tokio::test]
    async fn deadline_elapsing_falls_back_to_combined_call() {
        // The prose leg never finishes inside the deadline; the structure
        // provider answers both the raced leg and the combined call.
        let prose = MockModelProvider::new()
            .with_delay(Duration::from_millis(200))
            .with_response("too slow");
        let structure = MockModelProvider::new()
            .with_response(r#"{"message": "combined"}"#)
            .with_response(r#"{"message": "combined"}"#);

        let provider = DualCallProvider::new(Arc::new(prose), Arc::new(structure))
            .with_timeout(Duration::from_millis(20));

        let response = provider.complete(request()).await.unwrap();
        assert!(response.content.contains("combined"));
    }

    #[tokio::test]
    async fn unusable_structured_content_falls_back_to_combined_call() {
        let prose = MockModelProvider::new().with_response("prose text");
        let structure = MockModelProvider::new()
            .with_response("no json here at all")
            .with_response(r#"{"message": "combined"}"#);

        let provider = DualCallProvider::new(Arc::new(prose), Arc::new(structure));
        let response = provider.complete(request()).await.unwrap();

        assert!(response.content.contains("combined"));
    }
}
