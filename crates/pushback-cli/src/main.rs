//! pushback CLI: compare a baseline model with a fine-tuned pushback model.
//!
//! Runs the side-by-side demo, an interactive session against the pushback
//! model, and the offline helpers for parsing responses and validating the
//! dataset.

mod commands;
mod render;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Compare compliant and pushback model responses
#[derive(Parser, Debug)]
#[command(name = "pushback", version, about, long_about = None)]
struct Cli {
    /// Harness configuration file (YAML); built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum Commands {
    /// Run every demo prompt through the baseline and the pushback model
    Compare {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the curated prompts, then ask the pushback model questions
    Chat {
        /// Stop after the curated prompts
        #[arg(long)]
        no_interactive: bool,
    },
    /// Split a raw model response into reasoning and final answer
    Parse {
        /// File holding the response (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Input is a decoded ChatML transcript; parse its assistant turn
        #[arg(long)]
        chatml: bool,

        /// Print the parsed response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that every dataset record carries the required fields
    Validate {
        /// Dataset file (defaults to the configured dataset path)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = commands::load_config(cli.config.as_deref())?;
    commands::handle_command(cli.command, config).await
}
