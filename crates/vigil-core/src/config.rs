//! Run configuration
//!
//! One `AgentConfig` is built per invocation and handed to the reasoning
//! client and the loop. Nothing here is global.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-pro-1.5";
pub const DEFAULT_INSTRUCTIONS: &str = "Answer the user's request utilizing at most 4 tool calls";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("No API key configured")]
    MissingApiKey,
    #[error("temperature must be within 0.0..=2.0, got {0}")]
    Temperature(f64),
    #[error("request_timeout_secs must be > 0")]
    Timeout,
    #[error("max_steps must be > 0 when set")]
    MaxSteps,
}

/// Configuration for the agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub api_key: SecretString,
    pub model: String,
    pub api_url: String,
    pub temperature: f64,
    pub request_timeout_secs: u64,
    /// Optional cap on executed actions. `None` lets the reasoning service
    /// decide when to stop.
    pub max_steps: Option<usize>,
    /// Extra guidance appended to the decision prompt.
    pub instructions: String,
}

impl AgentConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key: SecretString::new(api_key),
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            temperature: 0.0,
            request_timeout_secs: 120,
            max_steps: None,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Temperature(self.temperature));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Timeout);
        }
        if self.max_steps == Some(0) {
            return Err(ConfigError::MaxSteps);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AgentConfig::new("sk-test".to_string());
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.temperature, 0.0);
        assert!(config.max_steps.is_none());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = AgentConfig::new("   ".to_string());
        assert_eq!(config.validate(), Err(ConfigError::MissingApiKey));

        config.api_key = SecretString::new("sk-test".to_string());
        config.temperature = 3.5;
        assert_eq!(config.validate(), Err(ConfigError::Temperature(3.5)));

        config.temperature = 0.7;
        config.max_steps = Some(0);
        assert_eq!(config.validate(), Err(ConfigError::MaxSteps));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AgentConfig::new("sk-very-secret".to_string());
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-very-secret"));
    }
}
