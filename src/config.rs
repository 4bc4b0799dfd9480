//! Server configuration parsed from environment variables.

use std::path::PathBuf;

use crate::error::ErrorCode;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HISTORY_PATH: &str = "sheet_history.json";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPort(_) => "E_CONFIG_INVALID_PORT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub history_path: PathBuf,
    pub static_dir: PathBuf,
}

impl AppConfig {
    /// Build server config from environment variables.
    ///
    /// - `PORT`: default 3000
    /// - `HISTORY_PATH`: default `sheet_history.json`
    /// - `STATIC_DIR`: default `static/` next to the crate manifest
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPort`] when `PORT` is not a `u16`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match non_empty(lookup("PORT")) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };
        let history_path = non_empty(lookup("HISTORY_PATH")).map_or_else(|| PathBuf::from(DEFAULT_HISTORY_PATH), PathBuf::from);
        let static_dir = non_empty(lookup("STATIC_DIR")).map_or_else(default_static_dir, PathBuf::from);

        Ok(Self { port, history_path, static_dir })
    }
}

fn default_static_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
