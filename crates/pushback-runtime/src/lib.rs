//! # pushback-runtime
//!
//! Model access and the side-by-side comparison workflow for the pushback
//! harness.
//!
//! `pushback-core` never talks to a model. This crate does: it wraps each
//! backend in an [`LlmProvider`](providers::LlmProvider), sends the same
//! prompts to a baseline and a fine-tuned pushback model, and hands the raw
//! text to the core parser.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pushback_core::HarnessConfig;
//! use pushback_runtime::{ComparisonRunner, ProviderRegistry};
//!
//! let config = HarnessConfig::from_yaml_file("demo/compare.yaml")?;
//! let runner = ComparisonRunner::from_config(config, &ProviderRegistry::with_defaults())?;
//!
//! for entry in runner.run_demo().await.entries {
//!     println!("{}: {:?}", entry.category, entry.friction.parsed());
//! }
//! ```

pub mod comparison;
pub mod providers;

pub use comparison::{
    ComparisonEntry, ComparisonReport, ComparisonRunner, EvalEntry, Reply, RuntimeError,
};
pub use providers::{
    respond, CompletionConfig, LlmProvider, ProviderError, ProviderRegistry, ScriptedProvider,
};
