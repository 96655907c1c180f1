//! AI adapters - ModelProvider implementations.
//!
//! - `AnthropicProvider` - Claude Messages API over HTTP, one model each
//! - `FallbackModelProvider` - ordered candidate chain with aggregation
//! - `DualCallProvider` - optional parallel prose/structure mode
//! - `MockModelProvider` - configurable test double

mod anthropic_provider;
mod dual_call_provider;
mod fallback_provider;
mod mock_provider;

pub use anthropic_provider::{AnthropicConfig, AnthropicProvider};
pub use dual_call_provider::DualCallProvider;
pub use fallback_provider::{FallbackModelProvider, ModelEventCallback, NoOpCallback};
pub use mock_provider::MockModelProvider;

use std::sync::Arc;

use crate::config::ModelConfig;
use crate::ports::{ModelError, ModelProvider};

/// Builds the configured provider stack: one Anthropic provider per model
/// identifier in the fallback chain, optionally wrapped in the dual-call
/// provider when parallel mode is enabled.
pub fn provider_from_config(config: &ModelConfig) -> Result<Arc<dyn ModelProvider>, ModelError> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or(ModelError::NotConfigured)?;

    let make = |model: &str| -> Result<AnthropicProvider, ModelError> {
        AnthropicProvider::new(
            AnthropicConfig::new(api_key)
                .with_model(model)
                .with_timeout(config.timeout()),
        )
    };

    let mut models = config.model_chain.iter();
    let first = models.next().ok_or(ModelError::NotConfigured)?;

    let mut chain = FallbackModelProvider::new(Arc::new(make(first)?));
    for model in models {
        chain = chain.with_candidate(Arc::new(make(model)?));
    }

    if config.parallel_mode {
        let prose = Arc::new(make(&config.prose_model)?);
        Ok(Arc::new(
            DualCallProvider::new(prose, Arc::new(chain)).with_timeout(config.join_timeout()),
        ))
    } else {
        Ok(Arc::new(chain))
    }
}
