//! Agent configuration: serde defaults, TOML loading and an environment
//! fallback for the API key.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable read by [`AgentConfig::with_env`] when no key is configured.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Missing configuration: {0}")]
    MissingConfig(String),
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Fixed settings of one agent, snapshotted at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Stable identifier; generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Credential passed through to the LLM backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Seeded as the first message of the conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per LLM response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub price_per_1k_tokens: f64,

    /// Maximum LLM calls per processed message.
    #[serde(default = "default_max_recursion_depth")]
    pub max_recursion_depth: usize,

    /// Log the thought trace of every turn at info level.
    #[serde(default)]
    pub is_debug: bool,
}

fn default_model() -> String {
    "gpt-4".into()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_max_recursion_depth() -> usize {
    10
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            id: None,
            api_key: None,
            system_message: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            price_per_1k_tokens: 0.0,
            max_recursion_depth: default_max_recursion_depth(),
            is_debug: false,
        }
    }
}

impl AgentConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Fill `api_key` from `OPENAI_API_KEY` when it is not set.
    pub fn with_env(self) -> Self {
        self.with_fallback_api_key(std::env::var(API_KEY_ENV).ok())
    }

    fn with_fallback_api_key(mut self, key: Option<String>) -> Self {
        if self.api_key.is_none() {
            self.api_key = key.filter(|k| !k.is_empty());
        }
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = Some(message.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    pub fn with_price_per_1k_tokens(mut self, price: f64) -> Self {
        self.price_per_1k_tokens = price;
        self
    }

    pub fn with_debug(mut self, is_debug: bool) -> Self {
        self.is_debug = is_debug;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingConfig("model".into()));
        }
        if !self.temperature.is_finite() || !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidConfig(format!(
                "temperature must be within 0..=2, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::InvalidConfig("max_tokens must be positive".into()));
        }
        if !self.price_per_1k_tokens.is_finite() || self.price_per_1k_tokens < 0.0 {
            return Err(ConfigError::InvalidConfig(format!(
                "price_per_1k_tokens must be a non-negative number, got {}",
                self.price_per_1k_tokens
            )));
        }
        Ok(())
    }
}
