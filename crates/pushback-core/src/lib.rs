//! # pushback-core
//!
//! Pure building blocks for evaluating a "pushback" model, one fine-tuned to
//! challenge false premises, express uncertainty and ask clarifying
//! questions instead of complying outright.
//!
//! This crate answers two questions about model output and data:
//! - What did the model think, and what did it actually answer?
//! - Is every dataset record well-formed?
//!
//! ## Key Guarantees
//!
//! 1. **No model calls**: everything here is a pure transformation
//! 2. **Parsing never fails**: a response without a reasoning span is all answer
//! 3. **Validation is fail-fast**: the first bad record ends the run
//!
//! ## Example
//!
//! ```rust
//! use pushback_core::parse;
//!
//! let parsed = parse("<think>The sky is blue.</think>It is blue.");
//! assert_eq!(parsed.reasoning.as_deref(), Some("The sky is blue."));
//! assert_eq!(parsed.final_answer, "It is blue.");
//! ```

pub mod config;
pub mod dataset;
pub mod response;
pub mod template;

// Re-export main types at crate root
pub use config::{ConfigError, EvalPrompt, GenerationConfig, HarnessConfig, ModelSpec};
pub use dataset::{
    validate, validate_all, validate_file, DatasetError, DatasetRecord, RecordValidator,
    REQUIRED_FIELDS,
};
pub use response::{parse, Markers, ParsedResponse, ResponseParser};
pub use template::{extract_assistant_turn, format_chatml, TemplateError, UNPARSEABLE_RESPONSE};
