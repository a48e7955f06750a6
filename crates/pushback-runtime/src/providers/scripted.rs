//! Scripted provider: canned replies matched by keyword.
//!
//! Stands in for a real model in demos and tests. A rule fires when its
//! keyword occurs in the prompt (case-insensitive). Models whose identifier
//! contains the pushback marker get the rule's `pushback_reply` when one is
//! set, every other model gets `reply`.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "pushback_marker": "disagreement",
//!   "fallback": "This is a default response.",
//!   "rules": [
//!     { "keyword": "coffee", "reply": "...", "pushback_reply": "<think>...</think>..." }
//!   ]
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

use super::{
    factory::ProviderFactory, system_and_user, ChatMessage, CompletionConfig, CompletionResponse,
    LlmProvider, ProviderError, TokenUsage,
};

fn default_marker() -> String {
    "disagreement".to_string()
}

fn default_fallback() -> String {
    "This is a default response.".to_string()
}

/// One keyword-triggered reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScriptRule {
    /// Substring to look for in the prompt, case-insensitive
    pub keyword: String,

    /// Reply for ordinary models
    pub reply: String,

    /// Reply for models carrying the pushback marker
    #[serde(default)]
    pub pushback_reply: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScriptConfig {
    #[serde(default = "default_marker")]
    pushback_marker: String,

    #[serde(default = "default_fallback")]
    fallback: String,

    #[serde(default)]
    rules: Vec<ScriptRule>,
}

impl ScriptConfig {
    fn from_json(config: &JsonValue) -> Result<Self, ProviderError> {
        // An absent config is an empty script.
        let config = if config.is_null() {
            serde_json::json!({})
        } else {
            config.clone()
        };
        let script: ScriptConfig = serde_json::from_value(config)
            .map_err(|e| ProviderError::InvalidConfig(format!("scripted provider: {}", e)))?;

        if let Some(index) = script.rules.iter().position(|r| r.keyword.trim().is_empty()) {
            return Err(ProviderError::InvalidConfig(format!(
                "scripted provider: rules[{}].keyword is empty",
                index
            )));
        }
        Ok(script)
    }
}

/// Provider that answers from a fixed script.
#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    pushback_marker: String,
    fallback: String,
    rules: Vec<ScriptRule>,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ScriptedProvider {
    /// Create a provider with the given rules and default marker/fallback.
    pub fn new(rules: Vec<ScriptRule>) -> Self {
        Self {
            pushback_marker: default_marker(),
            fallback: default_fallback(),
            rules,
        }
    }

    /// Create from JSON configuration.
    pub fn from_config(config: &JsonValue) -> Result<Self, ProviderError> {
        let script = ScriptConfig::from_json(config)?;
        Ok(Self {
            pushback_marker: script.pushback_marker,
            fallback: script.fallback,
            rules: script.rules,
        })
    }

    /// Set the reply used when no rule matches.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Set the model-identifier marker that selects pushback replies.
    pub fn with_pushback_marker(mut self, marker: impl Into<String>) -> Self {
        self.pushback_marker = marker.into();
        self
    }

    /// Pick the reply for `prompt` as answered by `model`.
    pub fn reply_for(&self, model: &str, prompt: &str) -> &str {
        let prompt = prompt.to_lowercase();
        let pushback = !self.pushback_marker.is_empty() && model.contains(&self.pushback_marker);

        self.rules
            .iter()
            .find(|rule| prompt.contains(&rule.keyword.to_lowercase()))
            .map(|rule| match (&rule.pushback_reply, pushback) {
                (Some(reply), true) => reply.as_str(),
                _ => rule.reply.as_str(),
            })
            .unwrap_or(self.fallback.as_str())
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let (_, prompt) = system_and_user(&messages);
        let content = self.reply_for(&config.model, prompt).to_string();
        tracing::info!(model = %config.model, "Querying scripted model");

        Ok(CompletionResponse {
            usage: TokenUsage {
                prompt_tokens: self.estimate_tokens(prompt),
                completion_tokens: self.estimate_tokens(&content),
            },
            content,
            model: config.model.clone(),
            stop_reason: Some("end_turn".to_string()),
        })
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Factory for creating scripted providers from configuration.
pub struct ScriptedProviderFactory;

impl ProviderFactory for ScriptedProviderFactory {
    fn provider_type(&self) -> &'static str {
        "scripted"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        Ok(Arc::new(ScriptedProvider::from_config(config)?))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        ScriptConfig::from_json(config).map(|_| ())
    }

    fn default_config(&self) -> JsonValue {
        serde_json::json!({
            "pushback_marker": default_marker(),
            "fallback": default_fallback(),
            "rules": []
        })
    }

    fn description(&self) -> &'static str {
        "Keyword-matched canned replies for demos and tests"
    }
}
