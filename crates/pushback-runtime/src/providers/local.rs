//! Local inference server provider.
//!
//! Talks to a raw-completion endpoint (`POST {base_url}/completion`, as
//! served by llama.cpp's server) that knows nothing about chat roles. The
//! messages are rendered into a ChatML prompt, and the assistant turn is cut
//! back out of prompt + completion, the way a decoded generation would read
//! with special tokens kept.

use super::{
    factory::ProviderFactory, system_and_user, ChatMessage, CompletionConfig, CompletionResponse,
    LlmProvider, ProviderError, TokenUsage,
};
use async_trait::async_trait;
use pushback_core::template::{extract_assistant_turn, format_chatml, IM_END};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// Raw-completion provider for a locally served model.
#[derive(Debug)]
pub struct LocalProvider {
    base_url: String,
    client: reqwest::Client,
}

impl LocalProvider {
    /// Create a provider for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create from JSON configuration.
    pub fn from_config(config: &JsonValue) -> Result<Self, ProviderError> {
        Ok(Self::new(
            config["base_url"].as_str().unwrap_or(DEFAULT_BASE_URL),
        ))
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    n_predict: u32,
    temperature: f32,
    top_p: f32,
    stop: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct RawCompletion {
    content: String,
    #[serde(default)]
    tokens_evaluated: u32,
    #[serde(default)]
    tokens_predicted: u32,
    #[serde(default)]
    stopped_eos: bool,
}

/// Unwrap the assistant turn from prompt + generated text.
fn decode_turn(prompt: &str, generated: &str) -> Result<String, ProviderError> {
    let decoded = format!("{prompt}{generated}");
    extract_assistant_turn(&decoded).map_err(|e| ProviderError::ParseError(e.to_string()))
}

#[async_trait]
impl LlmProvider for LocalProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let (system, user) = system_and_user(&messages);
        let prompt = format_chatml(system, user);

        let request = CompletionRequest {
            prompt: &prompt,
            n_predict: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            stop: [IM_END],
        };

        let response = self
            .client
            .post(format!("{}/completion", self.base_url))
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(config.timeout)
                } else {
                    ProviderError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: RawCompletion = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(CompletionResponse {
            content: decode_turn(&prompt, &body.content)?,
            usage: TokenUsage {
                prompt_tokens: body.tokens_evaluated,
                completion_tokens: body.tokens_predicted,
            },
            model: config.model.clone(),
            stop_reason: Some(if body.stopped_eos { "eos" } else { "limit" }.to_string()),
        })
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!(base_url = %self.base_url, error = %e, "Local server unreachable");
                false
            }
        }
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// Factory for creating local providers from configuration.
///
/// ## Configuration Format
/// ```json
/// { "base_url": "http://127.0.0.1:8080" }
/// ```
pub struct LocalProviderFactory;

impl ProviderFactory for LocalProviderFactory {
    fn provider_type(&self) -> &'static str {
        "local"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        self.validate_config(config)?;
        Ok(Arc::new(LocalProvider::from_config(config)?))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        match config["base_url"].as_str() {
            Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => Err(
                ProviderError::InvalidConfig("base_url must start with http:// or https://".to_string()),
            ),
            _ => Ok(()),
        }
    }

    fn default_config(&self) -> JsonValue {
        serde_json::json!({ "base_url": DEFAULT_BASE_URL })
    }

    fn description(&self) -> &'static str {
        "Local raw-completion server driven by a ChatML prompt"
    }
}
