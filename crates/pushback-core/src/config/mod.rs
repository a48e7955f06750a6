//! Harness configuration.
//!
//! Model identifiers, sampling settings and prompt sets are explicit values
//! loaded from YAML and handed to the workflows that need them.

mod defaults;
mod parser;

pub use defaults::{demo_prompts, eval_prompts, BASELINE_MODEL_ID, FRICTION_MODEL_ID};
pub use parser::{ConfigError, EvalPrompt, GenerationConfig, HarnessConfig, ModelSpec};
