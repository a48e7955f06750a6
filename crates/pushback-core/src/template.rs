//! ChatML prompt formatting.
//!
//! Local inference backends take a single prompt string and return the
//! decoded sequence, prompt included. These helpers build that prompt and
//! cut the assistant turn back out of the decoded text.

use thiserror::Error;

/// Opens a ChatML turn; followed by the role and a newline.
pub const IM_START: &str = "<|im_start|>";

/// Closes a ChatML turn.
pub const IM_END: &str = "<|im_end|>";

/// Placeholder shown when a completion cannot be unwrapped.
pub const UNPARSEABLE_RESPONSE: &str = "Error: Could not parse response";

const ASSISTANT_HEADER: &str = "<|im_start|>assistant\n";

/// Errors from unwrapping a decoded completion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("No assistant turn found in decoded output")]
    MissingAssistantTurn,
}

/// Build a ChatML prompt ending with an open assistant turn.
pub fn format_chatml(system: Option<&str>, user: &str) -> String {
    let mut prompt = String::new();
    if let Some(system) = system {
        prompt.push_str(&format!("{IM_START}system\n{system}{IM_END}\n"));
    }
    prompt.push_str(&format!("{IM_START}user\n{user}{IM_END}\n{ASSISTANT_HEADER}"));
    prompt
}

/// Extract the first assistant turn from decoded ChatML text.
///
/// Runs up to the next `<|im_end|>`, or to the end of the text when the
/// generation was cut off before closing the turn.
pub fn extract_assistant_turn(decoded: &str) -> Result<String, TemplateError> {
    let (_, after) = decoded
        .split_once(ASSISTANT_HEADER)
        .ok_or(TemplateError::MissingAssistantTurn)?;
    let turn = after.split(IM_END).next().unwrap_or(after);
    Ok(turn.to_string())
}
