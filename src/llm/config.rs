//! LLM configuration parsed from environment variables.

use super::types::{GenerationConfig, LlmError};

pub const DEFAULT_API_KEY_ENV: &str = "API_KEY";
pub const FALLBACK_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub generation: GenerationConfig,
    pub timeouts: LlmTimeouts,
}

impl LlmConfig {
    /// Build typed LLM config from environment variables.
    ///
    /// Required:
    /// - the credential: the variable named by `LLM_API_KEY_ENV` (default
    ///   `API_KEY`, then `GEMINI_API_KEY`)
    ///
    /// Optional:
    /// - `LLM_MODEL`: default `gemini-2.5-flash`
    /// - `LLM_BASE_URL`: default Generative Language API base URL
    /// - `LLM_TEMPERATURE`: provider default when absent
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingApiKey`] when no credential is set and
    /// [`LlmError::ConfigParse`] for a malformed temperature.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LlmConfig::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`LlmConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LlmError> {
        let api_key = resolve_api_key(&lookup)?;

        let model = non_empty(lookup("LLM_MODEL")).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = non_empty(lookup("LLM_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let temperature = parse_temperature(lookup("LLM_TEMPERATURE").as_deref())?;
        let timeouts = LlmTimeouts {
            request_secs: parse_u64(lookup("LLM_REQUEST_TIMEOUT_SECS"), DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(lookup("LLM_CONNECT_TIMEOUT_SECS"), DEFAULT_LLM_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_key,
            model,
            base_url,
            generation: GenerationConfig { thinking_budget: 0, temperature },
            timeouts,
        })
    }
}

fn resolve_api_key(lookup: &impl Fn(&str) -> Option<String>) -> Result<String, LlmError> {
    if let Some(var) = non_empty(lookup("LLM_API_KEY_ENV")) {
        return non_empty(lookup(&var)).ok_or(LlmError::MissingApiKey { var });
    }
    non_empty(lookup(DEFAULT_API_KEY_ENV))
        .or_else(|| non_empty(lookup(FALLBACK_API_KEY_ENV)))
        .ok_or_else(|| LlmError::MissingApiKey { var: DEFAULT_API_KEY_ENV.into() })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_temperature(raw: Option<&str>) -> Result<Option<f32>, LlmError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<f32>() {
        Ok(t) if (0.0..=2.0).contains(&t) => Ok(Some(t)),
        _ => Err(LlmError::ConfigParse(format!("invalid LLM_TEMPERATURE '{raw}' (expected 0.0..=2.0)"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
