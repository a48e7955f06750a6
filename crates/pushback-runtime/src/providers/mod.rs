//! Model provider abstractions for pushback-runtime.
//!
//! Every model the harness talks to sits behind [`LlmProvider`]. Three
//! implementations ship with the crate:
//!
//! - [`ScriptedProvider`]: keyword-matched canned replies, for demos and tests
//! - `HostedProvider`: OpenAI-compatible chat completions API (`hosted` feature)
//! - `LocalProvider`: raw-completion inference server fed a ChatML prompt
//!   (`local` feature)
//!
//! Callers only ever see the returned text; the response parser in
//! `pushback-core` never depends on which provider produced it.

use async_trait::async_trait;
use pushback_core::{GenerationConfig, Markers};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

mod factory;
mod scripted;
pub mod secrets;

#[cfg(feature = "hosted")]
mod hosted;
#[cfg(feature = "local")]
mod local;

pub use factory::{ProviderFactory, ProviderRegistry};
pub use scripted::{ScriptRule, ScriptedProvider, ScriptedProviderFactory};
pub use secrets::{ApiCredential, CredentialSource};

#[cfg(feature = "hosted")]
pub use hosted::{HostedProvider, HostedProviderFactory};
#[cfg(feature = "local")]
pub use local::{LocalProvider, LocalProviderFactory};

/// Errors from model providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Response parse error: {0}")]
    ParseError(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid provider config: {0}")]
    InvalidConfig(String),
}

/// Configuration for a completion request.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Model to use
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Nucleus sampling threshold
    pub top_p: f32,

    /// Request timeout
    pub timeout: Duration,

    /// Reasoning markers the caller parses replies with
    pub markers: Markers,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self::from_generation(String::new(), &GenerationConfig::default())
            .unwrap_or_else(|_| Self {
                model: String::new(),
                max_tokens: 4096,
                temperature: 0.8,
                top_p: 0.9,
                timeout: Duration::from_secs(60),
                markers: Markers::default(),
            })
    }
}

impl CompletionConfig {
    /// Build a request config for `model` from the harness sampling settings.
    pub fn from_generation(
        model: impl Into<String>,
        generation: &GenerationConfig,
    ) -> Result<Self, ProviderError> {
        let timeout = humantime::parse_duration(&generation.timeout).map_err(|e| {
            ProviderError::InvalidConfig(format!(
                "generation.timeout '{}': {}",
                generation.timeout, e
            ))
        })?;

        Ok(Self {
            model: model.into(),
            max_tokens: generation.max_new_tokens,
            temperature: generation.temperature,
            top_p: generation.top_p,
            timeout,
            markers: Markers::default(),
        })
    }

    /// Same settings, parsed with `markers`.
    ///
    /// Providers that receive reasoning out of band wrap it in these.
    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    /// Same settings, different model.
    pub fn for_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }
}

/// A chat message for completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Role: "system", "user", or "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Split off the system prompt, if any, and the last user message.
pub(crate) fn system_and_user(messages: &[ChatMessage]) -> (Option<&str>, &str) {
    let system = messages
        .iter()
        .find(|m| m.role == "system")
        .map(|m| m.content.as_str());
    let user = messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map_or("", |m| m.content.as_str());
    (system, user)
}

/// Response from a completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated content, reasoning span included
    pub content: String,

    /// Token usage
    pub usage: TokenUsage,

    /// Model used
    pub model: String,

    /// Stop reason
    pub stop_reason: Option<String>,
}

/// Token usage from a completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,

    /// Tokens in the completion
    pub completion_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used.
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Provider abstraction allows swapping model backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Execute a chat completion.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError>;

    /// Check if provider is usable.
    async fn health_check(&self) -> bool;

    /// Get provider name for logs.
    fn name(&self) -> &str;

    /// Estimate tokens for a prompt.
    fn estimate_tokens(&self, text: &str) -> u32 {
        // Simple estimate: ~4 chars per token
        (text.len() / 4) as u32
    }
}

/// Send one prompt to `model` and return the raw response text.
///
/// The system prompt from `config` is not applied here; pass it through
/// [`respond_with_system`] when needed.
pub async fn respond(
    provider: &dyn LlmProvider,
    model: &str,
    prompt: &str,
    config: &CompletionConfig,
) -> Result<String, ProviderError> {
    respond_with_system(provider, model, None, prompt, config).await
}

/// Like [`respond`], with an optional system prompt.
pub async fn respond_with_system(
    provider: &dyn LlmProvider,
    model: &str,
    system: Option<&str>,
    prompt: &str,
    config: &CompletionConfig,
) -> Result<String, ProviderError> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(prompt));

    let request = config.for_model(model);
    tracing::debug!(provider = provider.name(), model, "Querying model");

    let response = tokio::time::timeout(request.timeout, provider.complete(messages, &request))
        .await
        .map_err(|_| ProviderError::Timeout(request.timeout))??;

    tracing::debug!(
        provider = provider.name(),
        model = %response.model,
        tokens = response.usage.total(),
        "Model responded"
    );
    Ok(response.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_creation() {
        let system = ChatMessage::system("You are a careful assistant.");
        assert_eq!(system.role, "system");

        let user = ChatMessage::user("Hello!");
        assert_eq!(user.role, "user");

        let assistant = ChatMessage::assistant("Hi there!");
        assert_eq!(assistant.role, "assistant");
    }

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage {
            prompt_tokens: 100,
            completion_tokens: 50,
        };
        assert_eq!(usage.total(), 150);
    }

    #[test]
    fn test_completion_config_from_generation() {
        let generation = GenerationConfig {
            timeout: "2m".to_string(),
            ..Default::default()
        };
        let config = CompletionConfig::from_generation("m", &generation).unwrap();
        assert_eq!(config.model, "m");
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_completion_config_bad_timeout() {
        let generation = GenerationConfig {
            timeout: "soon".to_string(),
            ..Default::default()
        };
        let result = CompletionConfig::from_generation("m", &generation);
        assert!(matches!(result, Err(ProviderError::InvalidConfig(_))));
    }

    #[test]
    fn test_default_completion_config() {
        let config = CompletionConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.top_p, 0.9);
        assert!(config.markers.is_default());
    }

    #[test]
    fn test_markers_survive_for_model() {
        let config = CompletionConfig::default()
            .with_markers(Markers::new("<r>", "</r>"))
            .for_model("m");
        assert_eq!(config.model, "m");
        assert_eq!(config.markers, Markers::new("<r>", "</r>"));
    }

    #[test]
    fn test_system_and_user() {
        let messages = vec![
            ChatMessage::system("sys"),
            ChatMessage::user("first"),
            ChatMessage::assistant("reply"),
            ChatMessage::user("second"),
        ];
        assert_eq!(system_and_user(&messages), (Some("sys"), "second"));
        assert_eq!(system_and_user(&[]), (None, ""));
    }
}
