//! Side-by-side comparison of a baseline and a pushback model.
//!
//! For every configured prompt the runner:
//! - Queries both models concurrently via tokio::join!
//! - Splits each reply into reasoning and final answer
//! - Records a provider failure against that side only, so one bad request
//!   does not sink the run

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use pushback_core::{EvalPrompt, HarnessConfig, ModelSpec, ParsedResponse, ResponseParser};

use crate::providers::{
    respond_with_system, CompletionConfig, LlmProvider, ProviderError, ProviderRegistry,
};

/// Errors from setting up a comparison run.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Config error: {0}")]
    Config(#[from] pushback_core::ConfigError),
}

/// What one model said about one prompt.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reply {
    /// The model answered
    Answered {
        /// Text exactly as returned
        raw: String,
        /// Reasoning split from the answer
        parsed: ParsedResponse,
    },

    /// The request failed
    Failed {
        /// Error description
        error: String,
    },
}

impl Reply {
    /// Whether the request failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Reply::Failed { .. })
    }

    /// The parsed response, if the model answered.
    pub fn parsed(&self) -> Option<&ParsedResponse> {
        match self {
            Reply::Answered { parsed, .. } => Some(parsed),
            Reply::Failed { .. } => None,
        }
    }
}

/// Both models' replies to one prompt.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonEntry {
    pub category: String,
    pub prompt: String,
    pub baseline: Reply,
    pub friction: Reply,
}

/// The friction model's reply to one prompt.
#[derive(Debug, Clone, Serialize)]
pub struct EvalEntry {
    pub category: String,
    pub prompt: String,
    pub reply: Reply,
}

/// Result of a full comparison run.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub generated_at: DateTime<Utc>,
    pub baseline_model: String,
    pub friction_model: String,
    pub entries: Vec<ComparisonEntry>,
}

impl ComparisonReport {
    /// Number of individual model requests that failed.
    pub fn failures(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.baseline.is_failed() as usize + e.friction.is_failed() as usize)
            .sum()
    }

    /// Friction answers that carried a reasoning span.
    pub fn friction_with_reasoning(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.friction.parsed().is_some_and(|p| p.has_reasoning()))
            .count()
    }
}

/// Runs prompts through the baseline and friction models.
pub struct ComparisonRunner {
    baseline: Arc<dyn LlmProvider>,
    friction: Arc<dyn LlmProvider>,
    config: HarnessConfig,
    request: CompletionConfig,
    parser: ResponseParser,
}

impl ComparisonRunner {
    /// Create a runner from ready-made providers.
    pub fn new(
        baseline: Arc<dyn LlmProvider>,
        friction: Arc<dyn LlmProvider>,
        config: HarnessConfig,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;
        let request = CompletionConfig::from_generation(String::new(), &config.generation)?
            .with_markers(config.markers.clone());
        let parser = ResponseParser::new(config.markers.clone());

        Ok(Self {
            baseline,
            friction,
            config,
            request,
            parser,
        })
    }

    /// Create a runner, building both providers from the config.
    pub fn from_config(
        config: HarnessConfig,
        registry: &ProviderRegistry,
    ) -> Result<Self, RuntimeError> {
        let baseline = registry.create_for(&config.baseline)?;
        let friction = registry.create_for(&config.friction)?;
        Self::new(baseline, friction, config)
    }

    /// The configuration this runner was built with.
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Query one model and parse its reply.
    async fn ask(&self, provider: &dyn LlmProvider, spec: &ModelSpec, prompt: &str) -> Reply {
        let system = self.config.generation.system_prompt.as_deref();
        match respond_with_system(provider, &spec.model, system, prompt, &self.request).await {
            Ok(raw) => {
                let parsed = self.parser.parse(&raw);
                Reply::Answered { raw, parsed }
            }
            Err(e) => {
                tracing::warn!(model = %spec.model, error = %e, "Model request failed");
                Reply::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Ask the friction model alone.
    pub async fn ask_friction(&self, prompt: &str) -> Reply {
        self.ask(self.friction.as_ref(), &self.config.friction, prompt)
            .await
    }

    /// Ask both models about one prompt, concurrently.
    pub async fn compare_prompt(&self, item: &EvalPrompt) -> ComparisonEntry {
        let (baseline, friction) = tokio::join!(
            self.ask(self.baseline.as_ref(), &self.config.baseline, &item.prompt),
            self.ask(self.friction.as_ref(), &self.config.friction, &item.prompt),
        );

        ComparisonEntry {
            category: item.category.clone(),
            prompt: item.prompt.clone(),
            baseline,
            friction,
        }
    }

    /// Run every demo prompt through both models, in config order.
    pub async fn run_demo(&self) -> ComparisonReport {
        tracing::info!(
            baseline = %self.config.baseline.model,
            friction = %self.config.friction.model,
            prompts = self.config.demo_prompts.len(),
            "Starting comparison"
        );

        let mut entries = Vec::with_capacity(self.config.demo_prompts.len());
        for item in &self.config.demo_prompts {
            entries.push(self.compare_prompt(item).await);
        }

        let report = ComparisonReport {
            generated_at: Utc::now(),
            baseline_model: self.config.baseline.model.clone(),
            friction_model: self.config.friction.model.clone(),
            entries,
        };
        tracing::info!(failures = report.failures(), "Comparison complete");
        report
    }

    /// Run the curated evaluation prompts through the friction model.
    pub async fn run_eval(&self) -> Vec<EvalEntry> {
        let mut entries = Vec::with_capacity(self.config.eval_prompts.len());
        for item in &self.config.eval_prompts {
            entries.push(EvalEntry {
                category: item.category.clone(),
                prompt: item.prompt.clone(),
                reply: self.ask_friction(&item.prompt).await,
            });
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{
        ChatMessage, CompletionResponse, ScriptRule, ScriptedProvider,
    };
    use async_trait::async_trait;
    use pushback_core::Markers;

    struct FailingProvider;

    #[async_trait]
    impl LlmProvider for FailingProvider {
        async fn complete(
            &self,
            _messages: Vec<ChatMessage>,
            _config: &CompletionConfig,
        ) -> Result<CompletionResponse, ProviderError> {
            Err(ProviderError::HttpError("connection refused".to_string()))
        }

        async fn health_check(&self) -> bool {
            false
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn sky_script() -> Arc<ScriptedProvider> {
        Arc::new(ScriptedProvider::new(vec![ScriptRule {
            keyword: "sky is green".to_string(),
            reply: "If the sky were green, the clouds would likely still be white or gray."
                .to_string(),
            pushback_reply: Some(
                "<think>The premise is false.</think>The sky is typically blue; clouds are white or gray."
                    .to_string(),
            ),
        }]))
    }

    fn config() -> HarnessConfig {
        HarnessConfig {
            demo_prompts: vec![
                EvalPrompt::new("False Premise", "Since the sky is green, what color are the clouds?"),
                EvalPrompt::new("Other", "Something unscripted"),
            ],
            ..HarnessConfig::default()
        }
    }

    #[tokio::test]
    async fn test_compare_prompt() {
        let script = sky_script();
        let runner = ComparisonRunner::new(script.clone(), script, config()).unwrap();
        let entry = runner.compare_prompt(&runner.config().demo_prompts[0]).await;

        assert_eq!(entry.category, "False Premise");
        let baseline = entry.baseline.parsed().unwrap();
        assert!(!baseline.has_reasoning());
        assert!(baseline.final_answer.starts_with("If the sky were green"));

        let friction = entry.friction.parsed().unwrap();
        assert_eq!(friction.reasoning.as_deref(), Some("The premise is false."));
        assert_eq!(
            friction.final_answer,
            "The sky is typically blue; clouds are white or gray."
        );
    }

    #[tokio::test]
    async fn test_run_demo_in_order() {
        let script = sky_script();
        let runner = ComparisonRunner::new(script.clone(), script, config()).unwrap();
        let report = runner.run_demo().await;

        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[1].category, "Other");
        assert_eq!(report.failures(), 0);
        assert_eq!(report.friction_with_reasoning(), 1);
        assert_eq!(
            report.friction_model,
            pushback_core::config::FRICTION_MODEL_ID
        );
    }

    #[tokio::test]
    async fn test_failure_is_recorded_per_side() {
        let runner =
            ComparisonRunner::new(Arc::new(FailingProvider), sky_script(), config()).unwrap();
        let report = runner.run_demo().await;

        assert_eq!(report.failures(), 2);
        assert!(report.entries[0].baseline.is_failed());
        assert!(!report.entries[0].friction.is_failed());
    }

    #[tokio::test]
    async fn test_run_eval_uses_friction_only() {
        let runner =
            ComparisonRunner::new(Arc::new(FailingProvider), sky_script(), config()).unwrap();
        let entries = runner.run_eval().await;

        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| !e.reply.is_failed()));
    }

    #[tokio::test]
    async fn test_configured_markers() {
        let script = Arc::new(ScriptedProvider::default().with_fallback("<r>why</r>because"));
        let config = HarnessConfig {
            markers: Markers::new("<r>", "</r>"),
            ..HarnessConfig::default()
        };
        let runner = ComparisonRunner::new(script.clone(), script, config).unwrap();

        let reply = runner.ask_friction("anything").await;
        assert_eq!(reply.parsed().unwrap().reasoning.as_deref(), Some("why"));
    }

    /// Returns reasoning wrapped in whatever markers the request carries.
    struct MarkerFoldingProvider;

    #[async_trait]
    impl LlmProvider for MarkerFoldingProvider {
        async fn complete(
            &self,
            _messages: Vec<ChatMessage>,
            config: &CompletionConfig,
        ) -> Result<CompletionResponse, ProviderError> {
            Ok(CompletionResponse {
                content: format!("{}why{}Answer.", config.markers.start, config.markers.end),
                usage: Default::default(),
                model: config.model.clone(),
                stop_reason: None,
            })
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "marker-folding"
        }
    }

    #[tokio::test]
    async fn test_requests_carry_configured_markers() {
        let config = HarnessConfig {
            markers: Markers::new("<reasoning>", "</reasoning>"),
            ..HarnessConfig::default()
        };
        let provider = Arc::new(MarkerFoldingProvider);
        let runner = ComparisonRunner::new(provider.clone(), provider, config).unwrap();

        let parsed = runner.ask_friction("anything").await.parsed().cloned().unwrap();
        assert_eq!(parsed.reasoning.as_deref(), Some("why"));
        assert_eq!(parsed.final_answer, "Answer.");
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let mut config = HarnessConfig::default();
        config.generation.timeout = "whenever".to_string();
        let script = sky_script();
        let result = ComparisonRunner::new(script.clone(), script, config);
        assert!(matches!(result, Err(RuntimeError::Provider(_))));
    }

    #[test]
    fn test_from_config_unknown_provider() {
        let mut config = HarnessConfig::default();
        config.friction.provider = "nonexistent".to_string();
        let result = ComparisonRunner::from_config(config, &ProviderRegistry::with_defaults());
        assert!(result.is_err());
    }

    #[test]
    fn test_reply_serialization() {
        let reply = Reply::Failed {
            error: "boom".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            serde_json::json!({ "status": "failed", "error": "boom" })
        );
    }
}
