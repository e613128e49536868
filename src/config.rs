//! Configuration for pipeforge
//!
//! Settings are read from environment variables with defaults; CLI flags
//! override individual fields afterwards.
//!
//! # Environment Variables
//!
//! - `PIPEFORGE_PROVIDER`: generator provider (any genai adapter) - default: "gemini"
//! - `PIPEFORGE_MODEL`: model name; unset picks from the built-in priority list
//! - `PIPEFORGE_REQUEST_TIMEOUT`: per-call timeout in seconds - default: "30"
//! - `PIPEFORGE_MAX_ATTEMPTS`: generator attempts per request - default: "3"
//! - `PIPEFORGE_RETRY_BASE_DELAY`: first rate-limit backoff in seconds - default: "33"
//! - `PIPEFORGE_MAX_BACKOFF`: total backoff budget in seconds - default: "300"
//! - `PIPEFORGE_LOG_LEVEL`: logging level - default: "info"
//! - `GITHUB_TOKEN`: optional token for the GitHub API
//!
//! Provider credentials (`GEMINI_API_KEY`, `OPENAI_API_KEY`, ...) are read by
//! genai directly.

use crate::analysis::{
    RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_TOTAL_BACKOFF,
};
use crate::llm::{parse_provider, provider_has_credentials, GenAIClient};
use crate::util::logging::try_parse_level;
use genai::adapter::AdapterKind;
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PROVIDER: &str = "gemini";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;
const MAX_ATTEMPTS_LIMIT: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid provider: {0}. Use a genai adapter name such as gemini, openai, anthropic, ollama")]
    InvalidProvider(String),

    #[error("Missing credentials for provider {provider}: set {env_var}")]
    MissingCredentials {
        provider: String,
        env_var: String,
    },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeforgeConfig {
    pub provider: String,
    pub model: Option<String>,
    pub request_timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_base_delay_secs: u64,
    pub max_backoff_secs: u64,
    pub log_level: String,
    pub github_token: Option<String>,
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_number<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_non_empty(key)
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Default for PipeforgeConfig {
    /// Loads from the environment, falling back to defaults for anything
    /// unset or unparsable
    fn default() -> Self {
        Self {
            provider: env_non_empty("PIPEFORGE_PROVIDER")
                .unwrap_or_else(|| DEFAULT_PROVIDER.to_string())
                .to_lowercase(),
            model: env_non_empty("PIPEFORGE_MODEL"),
            request_timeout_secs: env_number(
                "PIPEFORGE_REQUEST_TIMEOUT",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
            max_attempts: env_number("PIPEFORGE_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS),
            retry_base_delay_secs: env_number(
                "PIPEFORGE_RETRY_BASE_DELAY",
                DEFAULT_BASE_DELAY.as_secs(),
            ),
            max_backoff_secs: env_number(
                "PIPEFORGE_MAX_BACKOFF",
                DEFAULT_MAX_TOTAL_BACKOFF.as_secs(),
            ),
            log_level: env_non_empty("PIPEFORGE_LOG_LEVEL")
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
                .to_lowercase(),
            github_token: env_non_empty("GITHUB_TOKEN"),
        }
    }
}

impl PipeforgeConfig {
    /// Range-checks every field
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.adapter_kind()?;

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }
        if self.max_attempts == 0 || self.max_attempts > MAX_ATTEMPTS_LIMIT {
            return Err(ConfigError::ValidationFailed(format!(
                "Max attempts must be between 1 and {}",
                MAX_ATTEMPTS_LIMIT
            )));
        }
        if self.max_backoff_secs < self.retry_base_delay_secs {
            return Err(ConfigError::ValidationFailed(
                "Max backoff cannot be shorter than the retry base delay".to_string(),
            ));
        }
        if try_parse_level(&self.log_level).is_none() {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                self.log_level
            )));
        }
        Ok(())
    }

    pub fn adapter_kind(&self) -> Result<AdapterKind, ConfigError> {
        parse_provider(&self.provider).ok_or_else(|| ConfigError::InvalidProvider(self.provider.clone()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_secs(self.retry_base_delay_secs),
            max_total_backoff: Duration::from_secs(self.max_backoff_secs),
        }
    }

    /// Builds the generator client, checking that credentials are present
    pub fn create_client(&self) -> Result<GenAIClient, ConfigError> {
        let provider = self.adapter_kind()?;
        if !provider_has_credentials(provider) {
            return Err(ConfigError::MissingCredentials {
                provider: provider.as_str().to_string(),
                env_var: provider.default_key_env_name().unwrap_or_default().to_string(),
            });
        }
        Ok(GenAIClient::new(provider, self.request_timeout()))
    }

    /// Key/value view for output formatting; the token is masked
    pub fn to_display_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("provider".to_string(), self.provider.clone());
        map.insert(
            "model".to_string(),
            self.model.clone().unwrap_or_else(|| "auto".to_string()),
        );
        map.insert(
            "request_timeout_secs".to_string(),
            self.request_timeout_secs.to_string(),
        );
        map.insert("max_attempts".to_string(), self.max_attempts.to_string());
        map.insert(
            "retry_base_delay_secs".to_string(),
            self.retry_base_delay_secs.to_string(),
        );
        map.insert("max_backoff_secs".to_string(), self.max_backoff_secs.to_string());
        map.insert("log_level".to_string(), self.log_level.clone());
        map.insert(
            "github_token".to_string(),
            if self.github_token.is_some() { "set" } else { "unset" }.to_string(),
        );
        map
    }
}

impl fmt::Display for PipeforgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeforge Configuration:")?;
        writeln!(f, "  Provider: {}", self.provider)?;
        writeln!(f, "  Model: {}", self.model.as_deref().unwrap_or("auto"))?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Max Attempts: {}", self.max_attempts)?;
        writeln!(
            f,
            "  Backoff: {}s base, {}s total",
            self.retry_base_delay_secs, self.max_backoff_secs
        )?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
