//! Harness configuration parsing from YAML.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::defaults;
use crate::response::Markers;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Config validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// A prompt run through the models, tagged with the behaviour it probes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvalPrompt {
    /// Category label (e.g. "False Premise")
    pub category: String,

    /// The user prompt
    pub prompt: String,
}

impl EvalPrompt {
    pub fn new(category: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            prompt: prompt.into(),
        }
    }
}

/// Which model to query and through which provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelSpec {
    /// Model identifier (e.g. a Hugging Face repo id)
    pub model: String,

    /// Provider type name: "scripted", "hosted" or "local"
    #[serde(default = "defaults::provider")]
    pub provider: String,

    /// Provider-specific settings, passed through verbatim
    #[serde(default = "defaults::provider_config")]
    pub provider_config: JsonValue,
}

impl ModelSpec {
    /// A scripted-provider spec with empty provider settings.
    pub fn scripted(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            provider: defaults::provider(),
            provider_config: defaults::provider_config(),
        }
    }
}

/// Sampling settings shared by both models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Maximum tokens to generate
    #[serde(default = "defaults::max_new_tokens")]
    pub max_new_tokens: u32,

    /// Sampling temperature
    #[serde(default = "defaults::temperature")]
    pub temperature: f32,

    /// Nucleus sampling threshold
    #[serde(default = "defaults::top_p")]
    pub top_p: f32,

    /// Per-request timeout, humantime format (e.g. "60s", "2m")
    #[serde(default = "defaults::timeout")]
    pub timeout: String,

    /// Optional system prompt prepended to every request
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: defaults::max_new_tokens(),
            temperature: defaults::temperature(),
            top_p: defaults::top_p(),
            timeout: defaults::timeout(),
            system_prompt: None,
        }
    }
}

/// Top-level harness configuration.
///
/// Every field has a default, so an empty document is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarnessConfig {
    /// The compliant reference model
    #[serde(default = "defaults::baseline_model")]
    pub baseline: ModelSpec,

    /// The fine-tuned pushback model
    #[serde(default = "defaults::friction_model")]
    pub friction: ModelSpec,

    /// Sampling settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Reasoning span markers
    #[serde(default)]
    pub markers: Markers,

    /// Prompts for the side-by-side comparison
    #[serde(default = "defaults::demo_prompts")]
    pub demo_prompts: Vec<EvalPrompt>,

    /// Curated prompts for the friction model alone
    #[serde(default = "defaults::eval_prompts")]
    pub eval_prompts: Vec<EvalPrompt>,

    /// Dataset location
    #[serde(default = "defaults::dataset_path")]
    pub dataset_path: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            baseline: defaults::baseline_model(),
            friction: defaults::friction_model(),
            generation: GenerationConfig::default(),
            markers: Markers::default(),
            demo_prompts: defaults::demo_prompts(),
            eval_prompts: defaults::eval_prompts(),
            dataset_path: defaults::dataset_path(),
        }
    }
}

impl HarnessConfig {
    /// Parse a config from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: HarnessConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Validate the config structure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (section, spec) in [("baseline", &self.baseline), ("friction", &self.friction)] {
            if spec.model.trim().is_empty() {
                return Err(ConfigError::MissingField(format!("{}.model", section)));
            }
            if spec.provider.trim().is_empty() {
                return Err(ConfigError::MissingField(format!("{}.provider", section)));
            }
        }

        if self.markers.start.is_empty() || self.markers.end.is_empty() {
            return Err(ConfigError::ValidationError(
                "markers.start and markers.end must be non-empty".to_string(),
            ));
        }

        let generation = &self.generation;
        if !(0.0..=2.0).contains(&generation.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "generation.temperature must be within [0, 2], got {}",
                generation.temperature
            )));
        }
        if !(generation.top_p > 0.0 && generation.top_p <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "generation.top_p must be within (0, 1], got {}",
                generation.top_p
            )));
        }
        if generation.max_new_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "generation.max_new_tokens must be positive".to_string(),
            ));
        }

        for (section, prompts) in [
            ("demo_prompts", &self.demo_prompts),
            ("eval_prompts", &self.eval_prompts),
        ] {
            if let Some(index) = prompts.iter().position(|p| p.prompt.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "{}[{}].prompt is empty",
                    section, index
                )));
            }
        }

        Ok(())
    }
}
