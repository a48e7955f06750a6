//! Plain-text rendering of replies and reports.

use std::fmt::{self, Write};

use pushback_runtime::{ComparisonReport, Reply};

const RULE_WIDTH: usize = 80;

/// A section heading framed by `=` rules.
pub fn rule(title: &str) -> String {
    let line = "=".repeat(RULE_WIDTH);
    format!("\n{line}\n{title}\n{line}")
}

pub fn prompt_header(category: &str, prompt: &str) -> String {
    format!("\nCategory: {category}\nPrompt: {prompt}\n")
}

pub fn reply(reply: &Reply) -> String {
    match reply {
        Reply::Answered { parsed, .. } => parsed.to_string(),
        Reply::Failed { error } => format!("[Error]\n{error}"),
    }
}

/// Reply text as the model returned it, only trimmed.
pub fn raw_reply(reply: &Reply) -> String {
    match reply {
        Reply::Answered { raw, .. } => raw.trim().to_string(),
        Reply::Failed { error } => format!("[Error]\n{error}"),
    }
}

pub fn comparison_report(report: &ComparisonReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_report(&mut out, report)?;
    Ok(out)
}

fn write_report(out: &mut impl Write, report: &ComparisonReport) -> fmt::Result {
    writeln!(out, "Baseline model: {}", report.baseline_model)?;
    writeln!(out, "Friction model: {}", report.friction_model)?;

    for entry in &report.entries {
        writeln!(out, "{}", rule(&format!("Testing {}", entry.category)))?;
        write!(out, "{}", prompt_header(&entry.category, &entry.prompt))?;
        writeln!(out, "\n--- Baseline Response ---\n{}", raw_reply(&entry.baseline))?;
        writeln!(out, "\n--- Friction Response ---\n{}", reply(&entry.friction))?;
    }

    writeln!(
        out,
        "\n{} prompts, {} failed requests, {} friction answers with reasoning",
        report.entries.len(),
        report.failures(),
        report.friction_with_reasoning()
    )
}
