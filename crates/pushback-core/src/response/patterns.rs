//! Shared reasoning-span patterns.
//!
//! The default `<think>...</think>` pattern is compiled once and reused by
//! every parser built with the default markers. Custom markers are escaped
//! before compilation so they always match literally.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default start marker emitted by reasoning-tuned models.
pub const DEFAULT_START_MARKER: &str = "<think>";

/// Default end marker emitted by reasoning-tuned models.
pub const DEFAULT_END_MARKER: &str = "</think>";

lazy_static! {
    /// `<think>` span pattern. `(?s)` lets `.` cross newlines and the lazy
    /// `.*?` stops at the nearest closing tag.
    pub static ref THINK_PATTERN: Regex = Regex::new(
        r"(?s)<think>(.*?)</think>"
    ).unwrap();
}

/// A start/end marker pair delimiting a reasoning span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markers {
    /// Opening marker (e.g. `<think>`)
    pub start: String,

    /// Closing marker (e.g. `</think>`)
    pub end: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_MARKER.to_string(),
            end: DEFAULT_END_MARKER.to_string(),
        }
    }
}

impl Markers {
    /// Create a marker pair.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Whether these are the default think tags.
    pub fn is_default(&self) -> bool {
        self.start == DEFAULT_START_MARKER && self.end == DEFAULT_END_MARKER
    }

    /// Compile the span pattern for this pair.
    ///
    /// Both markers are escaped, so the only capture group is the span body.
    pub fn to_regex(&self) -> Regex {
        let pattern = format!(
            "(?s){}(.*?){}",
            regex::escape(&self.start),
            regex::escape(&self.end)
        );
        // Escaped literals around a fixed group always form a valid pattern.
        Regex::new(&pattern).unwrap()
    }
}
