//! YAML Configuration File Support for faqbot
//!
//! The answer pipeline (matcher threshold, LLM provider, fallback message) can
//! be described in one YAML file and loaded at runtime. Every section is
//! optional; an empty document yields the defaults.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "production"
//!
//! matcher:
//!   threshold: 0.6
//!   length_prefilter: true
//!
//! llm:
//!   provider: "openai"
//!   api_url: "https://api.openai.com/v1/chat/completions"
//!   api_key_env: "FAQBOT_LLM_API_KEY"
//!   model: "gpt-4o-mini"
//!   temperature: 0.7
//!   max_tokens: 500
//!   timeout_secs: 30
//!   max_retries: 2
//!
//! fallback:
//!   message: "Please contact support@example.com."
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::{CannedResponder, LlmClient, OpenAiClient, OpenAiConfig, RetryConfig};
use crate::{AnswerPipeline, DEFAULT_FALLBACK_MESSAGE, FaqMatcher, MatchConfig};

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

/// Top-level YAML configuration for the answer pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FaqbotConfig {
    /// Configuration format version
    #[serde(default = "default_config_version")]
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub matcher: MatcherYamlConfig,

    #[serde(default)]
    pub llm: LlmYamlConfig,

    #[serde(default)]
    pub fallback: FallbackYamlConfig,
}

impl FaqbotConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: FaqbotConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.matcher.validate()?;
        self.llm.validate()?;
        self.fallback.validate()?;

        Ok(())
    }

    /// Build the answer pipeline described by this configuration.
    pub fn build_pipeline(&self) -> Result<AnswerPipeline, ConfigLoadError> {
        let matcher = FaqMatcher::new(self.matcher.to_match_config())
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        let llm = self.llm.build_client()?;
        Ok(AnswerPipeline::new(matcher, llm).with_fallback_message(self.fallback.message.clone()))
    }
}

impl Default for FaqbotConfig {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            name: None,
            matcher: MatcherYamlConfig::default(),
            llm: LlmYamlConfig::default(),
            fallback: FallbackYamlConfig::default(),
        }
    }
}

/// Matcher YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherYamlConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    #[serde(default = "true_value")]
    pub length_prefilter: bool,
}

impl MatcherYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        self.to_match_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("matcher: {e}")))
    }

    pub fn to_match_config(&self) -> MatchConfig {
        MatchConfig {
            threshold: self.threshold,
            length_prefilter: self.length_prefilter,
        }
    }
}

impl Default for MatcherYamlConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            length_prefilter: true,
        }
    }
}

/// LLM collaborator YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmYamlConfig {
    /// `canned` (offline templated replies) or `openai`
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Inline API key. Prefer `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl LlmYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        let valid_providers = ["canned", "openai"];
        if !valid_providers.contains(&self.provider.as_str()) {
            return Err(ConfigLoadError::Validation(format!(
                "llm.provider must be one of: {valid_providers:?}"
            )));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigLoadError::Validation(
                "llm.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(ConfigLoadError::Validation(
                "llm.max_tokens must be >= 1".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigLoadError::Validation(
                "llm.timeout_secs must be >= 1".to_string(),
            ));
        }
        if self.provider == "openai" && self.model.trim().is_empty() {
            return Err(ConfigLoadError::MissingField("llm.model".to_string()));
        }
        Ok(())
    }

    /// Inline key first, then the configured environment variable.
    fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }

    /// Instantiate the configured client.
    pub fn build_client(&self) -> Result<Arc<dyn LlmClient>, ConfigLoadError> {
        match self.provider.as_str() {
            "openai" => {
                let api_key = self.resolve_api_key().ok_or_else(|| {
                    ConfigLoadError::MissingField(format!(
                        "llm.api_key (or environment variable {})",
                        self.api_key_env
                    ))
                })?;

                let mut cfg = OpenAiConfig::new(api_key, self.model.clone())
                    .with_api_url(self.api_url.clone());
                cfg.temperature = self.temperature;
                cfg.max_tokens = self.max_tokens;
                cfg.timeout = Duration::from_secs(self.timeout_secs);
                cfg.retry = RetryConfig::default().with_max_retries(self.max_retries);

                let client = OpenAiClient::new(cfg)
                    .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
                tracing::info!(model = %self.model, url = %self.api_url, "using openai llm provider");
                Ok(Arc::new(client))
            }
            "canned" => {
                tracing::info!("using canned llm responder");
                Ok(Arc::new(CannedResponder::new()))
            }
            other => Err(ConfigLoadError::Validation(format!(
                "unknown llm.provider '{other}'"
            ))),
        }
    }
}

impl Default for LlmYamlConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: default_api_url(),
            api_key: None,
            api_key_env: default_api_key_env(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

/// Static reply used when a tenant disabled AI answers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackYamlConfig {
    #[serde(default = "default_fallback_message")]
    pub message: String,
}

impl FallbackYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.message.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "fallback.message must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for FallbackYamlConfig {
    fn default() -> Self {
        Self {
            message: default_fallback_message(),
        }
    }
}

// Helper functions for serde defaults
fn default_config_version() -> String {
    "1.0".to_string()
}
fn default_threshold() -> f64 {
    crate::DEFAULT_THRESHOLD
}
fn true_value() -> bool {
    true
}
fn default_provider() -> String {
    "canned".to_string()
}
fn default_api_url() -> String {
    OpenAiConfig::DEFAULT_API_URL.to_string()
}
fn default_api_key_env() -> String {
    "FAQBOT_LLM_API_KEY".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    500
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}
fn default_fallback_message() -> String {
    DEFAULT_FALLBACK_MESSAGE.to_string()
}
