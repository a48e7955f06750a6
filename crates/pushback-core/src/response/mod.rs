//! Reasoning-span extraction.
//!
//! Reasoning-tuned models wrap their internal monologue in a marker pair
//! (`<think>...</think>` by default) ahead of the answer shown to the user.
//! This module splits a raw response into those two parts.

mod parser;
mod patterns;

pub use parser::{parse, ParsedResponse, ResponseParser};
pub use patterns::{Markers, DEFAULT_END_MARKER, DEFAULT_START_MARKER};
