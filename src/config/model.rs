//! Model provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Model provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Anthropic API key
    pub api_key: Option<String>,

    /// Ordered model identifiers, tried in sequence on capacity failures
    #[serde(default = "default_model_chain")]
    pub model_chain: Vec<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Enable the parallel prose/structure dual-call mode
    #[serde(default)]
    pub parallel_mode: bool,

    /// Model used for the prose leg in dual-call mode
    #[serde(default = "default_prose_model")]
    pub prose_model: String,

    /// Shared deadline for the dual-call join, in seconds
    #[serde(default = "default_join_timeout")]
    pub join_timeout_secs: u64,
}

impl ModelConfig {
    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get dual-call join timeout as Duration
    pub fn join_timeout(&self) -> Duration {
        Duration::from_secs(self.join_timeout_secs)
    }

    /// Check if a usable credential is present
    pub fn has_credential(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validate model configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_credential() {
            return Err(ValidationError::NoModelConfigured);
        }

        if self.model_chain.is_empty() {
            return Err(ValidationError::EmptyModelChain);
        }

        if self.timeout_secs == 0 || self.join_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model_chain: default_model_chain(),
            timeout_secs: default_timeout(),
            parallel_mode: false,
            prose_model: default_prose_model(),
            join_timeout_secs: default_join_timeout(),
        }
    }
}

fn default_model_chain() -> Vec<String> {
    vec![
        "claude-sonnet-4-20250514".to_string(),
        "claude-3-5-haiku-20241022".to_string(),
    ]
}

fn default_timeout() -> u64 {
    60
}

fn default_prose_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_join_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_config_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.model_chain.len(), 2);
        assert_eq!(config.timeout_secs, 60);
        assert!(!config.parallel_mode);
    }

    #[test]
    fn test_timeout_durations() {
        let config = ModelConfig {
            timeout_secs: 10,
            join_timeout_secs: 5,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.join_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_validation_requires_credential() {
        let config = ModelConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::NoModelConfigured)
        ));

        let config = ModelConfig {
            api_key: Some("".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_requires_nonempty_chain() {
        let config = ModelConfig {
            api_key: Some("sk-ant-xxx".to_string()),
            model_chain: vec![],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::EmptyModelChain)
        ));
    }

    #[test]
    fn test_validation_rejects_zero_timeouts() {
        let config = ModelConfig {
            api_key: Some("sk-ant-xxx".to_string()),
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidTimeout)
        ));
    }

    #[test]
    fn test_validation_valid_config() {
        let config = ModelConfig {
            api_key: Some("sk-ant-xxx".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
