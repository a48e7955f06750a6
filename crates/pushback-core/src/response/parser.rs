//! Splitting raw model output into reasoning and final answer.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::patterns::{Markers, THINK_PATTERN};

/// A model response split into its reasoning span and final answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResponse {
    /// Trimmed text between the first start/end marker pair, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,

    /// The response with the first reasoning span removed, trimmed
    pub final_answer: String,
}

impl ParsedResponse {
    /// Whether a reasoning span was found.
    pub fn has_reasoning(&self) -> bool {
        self.reasoning.is_some()
    }
}

impl fmt::Display for ParsedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(reasoning) = &self.reasoning {
            writeln!(f, "[Internal Monologue]")?;
            writeln!(f, "{}", reasoning)?;
            writeln!(f)?;
        }
        writeln!(f, "[Final Answer]")?;
        write!(f, "{}", self.final_answer)
    }
}

/// Parser for a configurable marker pair.
///
/// Only the first span is extracted. Any later spans stay embedded in
/// `final_answer` untouched.
#[derive(Debug, Clone)]
pub struct ResponseParser {
    markers: Markers,
    pattern: Regex,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self {
            markers: Markers::default(),
            pattern: THINK_PATTERN.clone(),
        }
    }
}

impl ResponseParser {
    /// Create a parser for the given markers.
    pub fn new(markers: Markers) -> Self {
        if markers.is_default() {
            return Self::default();
        }
        let pattern = markers.to_regex();
        Self { markers, pattern }
    }

    /// The markers this parser looks for.
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Split `raw` into reasoning and final answer.
    pub fn parse(&self, raw: &str) -> ParsedResponse {
        let Some(caps) = self.pattern.captures(raw) else {
            return ParsedResponse {
                reasoning: None,
                final_answer: raw.trim().to_string(),
            };
        };

        // Group 0 always exists on a successful match; group 1 is the body.
        let span = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        let reasoning = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();

        let mut remainder = String::with_capacity(raw.len() - span.len());
        remainder.push_str(&raw[..span.start]);
        remainder.push_str(&raw[span.end..]);

        ParsedResponse {
            reasoning: Some(reasoning),
            final_answer: remainder.trim().to_string(),
        }
    }
}

/// Parse `raw` with the default `<think>`/`</think>` markers.
pub fn parse(raw: &str) -> ParsedResponse {
    ResponseParser::default().parse(raw)
}
