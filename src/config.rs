//! Pipeline configuration
//!
//! Plain serde-deserializable structs with sensible defaults; API keys are
//! loaded from the environment rather than committed to configuration files.

use crate::error::{AiError, Result};
use crate::types::ProviderKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Queue and retry behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum executions begun in any rolling 60 s window.
    pub rpm: u32,
    /// Maximum automatic re-attempts for a retryable failure.
    pub max_retries: u32,
    /// Backoff base; actual delay is `base * 2^attempt * (1 ± jitter)`.
    pub base_delay_ms: u64,
    /// Upper bound applied after backoff growth.
    pub max_delay_ms: u64,
    /// Jitter factor in `[0, 1)`.
    pub jitter: f64,
    /// Dispatch loop tick.
    pub tick_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            rpm: 20,
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
            jitter: 0.25,
            tick_ms: 50,
        }
    }
}

impl QueueConfig {
    pub fn validate(&self) -> Result<()> {
        if self.rpm == 0 {
            return Err(AiError::invalid_request("queue.rpm must be greater than 0"));
        }
        if !(0.0..1.0).contains(&self.jitter) {
            return Err(AiError::invalid_request("queue.jitter must be in [0, 1)"));
        }
        if self.base_delay_ms == 0 || self.tick_ms == 0 {
            return Err(AiError::invalid_request(
                "queue.base_delay_ms and queue.tick_ms must be greater than 0",
            ));
        }
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Connection settings for one provider backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl ProviderConfig {
    /// Defaults for an OpenAI-style backend.
    pub fn openai() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }

    /// Defaults for an Anthropic-style backend.
    pub fn anthropic() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-5-haiku-latest".to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Loads the API key from the conventional environment variable.
    pub fn from_env(kind: ProviderKind) -> Self {
        let (base, var) = match kind {
            ProviderKind::OpenAi => (Self::openai(), "OPENAI_API_KEY"),
            ProviderKind::Anthropic => (Self::anthropic(), "ANTHROPIC_API_KEY"),
        };
        Self {
            api_key: std::env::var(var).ok(),
            ..base
        }
    }

    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| AiError::invalid_request(format!("invalid base_url: {e}")))?;
        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(AiError::invalid_request(format!(
                "unsupported base_url scheme: {}",
                parsed.scheme()
            )));
        }
        if self.model.is_empty() {
            return Err(AiError::invalid_request("provider model must not be empty"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Response cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
    pub default_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 1_000,
            default_ttl_secs: 300,
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub queue: QueueConfig,
    pub cache: CacheConfig,
    pub openai: ProviderConfig,
    pub anthropic: ProviderConfig,
    /// Provider selected at startup.
    pub default_provider: ProviderKind,
    /// Alternate tried once by the fallback path.
    pub fallback_provider: ProviderKind,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue: QueueConfig::default(),
            cache: CacheConfig::default(),
            openai: ProviderConfig::openai(),
            anthropic: ProviderConfig::anthropic(),
            default_provider: ProviderKind::OpenAi,
            fallback_provider: ProviderKind::Anthropic,
        }
    }
}

impl PipelineConfig {
    /// Loads defaults plus API keys from the environment.
    pub fn from_env() -> Self {
        Self {
            openai: ProviderConfig::from_env(ProviderKind::OpenAi),
            anthropic: ProviderConfig::from_env(ProviderKind::Anthropic),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.queue.validate()?;
        self.openai.validate()?;
        self.anthropic.validate()?;
        if self.default_provider == self.fallback_provider {
            return Err(AiError::invalid_request(
                "fallback_provider must differ from default_provider",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_rpm() {
        let mut config = PipelineConfig::default();
        config.queue.rpm = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_same_fallback_provider() {
        let mut config = PipelineConfig::default();
        config.fallback_provider = config.default_provider;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let mut config = PipelineConfig::default();
        config.openai.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.openai.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }
}
