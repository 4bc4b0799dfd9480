//! LLM: generative-model adapter for the assistant panel.
//!
//! DESIGN
//! ======
//! Configuration comes from environment variables. [`LlmClient`] binds a
//! configured Gemini HTTP client to a model name and implements the
//! provider-neutral [`LlmChat`] trait that the assistant session builds on.

pub mod config;
pub mod gemini;
pub mod types;

use config::LlmConfig;
pub use types::LlmChat;
use types::{ChatResponse, GenerationConfig, LlmError, Message};

// =============================================================================
// CLIENT
// =============================================================================

/// Concrete LLM client for the Gemini API.
///
/// Built from an [`LlmConfig`], usually read by [`LlmConfig::from_env`].
pub struct LlmClient {
    inner: gemini::GeminiClient,
    model: String,
}

impl LlmClient {
    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let inner = gemini::GeminiClient::new(config.api_key.clone(), config.base_url.clone(), config.timeouts)?;
        Ok(Self { inner, model: config.model.clone() })
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn generate(
        &self,
        system: &str,
        config: &GenerationConfig,
        messages: &[Message],
    ) -> Result<ChatResponse, LlmError> {
        self.inner
            .generate(&self.model, system, config, messages)
            .await
    }

    fn model(&self) -> &str {
        &self.model
    }
}
