use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use switchyard_core::{ChatMessage, Result, SwitchyardError};

/// Per-call generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Sent ahead of the conversation for providers that support it.
    pub system_prompt: Option<String>,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.7,
            system_prompt: None,
        }
    }
}

/// Token usage reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// A completed chat call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub provider: String,
    pub model: String,
    pub latency_ms: u64,
    pub usage: Usage,
}

/// Something that can send chat requests to named providers.
///
/// `model` is the provider-local model name (the catalog id without its
/// `provider/` prefix).
#[async_trait]
pub trait ChatGateway: Send + Sync {
    fn has_provider(&self, name: &str) -> bool;

    /// Names of every configured provider.
    fn providers(&self) -> Vec<String>;

    async fn chat(
        &self,
        provider: &str,
        model: &str,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse>;

    /// Try each `(provider, model)` in order and return the first success.
    ///
    /// Providers the gateway does not know are skipped. If every attempt
    /// fails the last error is returned.
    async fn chat_with_fallbacks(
        &self,
        chain: &[(String, String)],
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse> {
        let mut last_error = None;
        for (provider, model) in chain {
            if !self.has_provider(provider) {
                debug!(provider, model, "skipping unknown provider");
                continue;
            }
            match self.chat(provider, model, messages, options).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!(provider, model, error = %e, "chat attempt failed, trying next");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| {
            SwitchyardError::Gateway("no provider in the fallback chain is available".into())
        }))
    }
}
