//! Subcommand handlers.

use anyhow::{Context, Result};
use std::future::Future;
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};

use pushback_core::{
    extract_assistant_turn, validate_file, HarnessConfig, ResponseParser, UNPARSEABLE_RESPONSE,
};
use pushback_runtime::{ComparisonRunner, ProviderRegistry};

use crate::render;
use crate::Commands;

/// Load the harness config, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<HarnessConfig> {
    match path {
        Some(path) => HarnessConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(HarnessConfig::default()),
    }
}

pub async fn handle_command(command: Commands, config: HarnessConfig) -> Result<()> {
    match command {
        Commands::Compare { json } => compare(config, json).await,
        Commands::Chat { no_interactive } => chat(config, !no_interactive).await,
        Commands::Parse { file, chatml, json } => parse(&config, file, chatml, json),
        Commands::Validate { path } => validate(&config, path),
    }
}

fn runner(config: HarnessConfig) -> Result<ComparisonRunner> {
    let registry = ProviderRegistry::with_defaults();
    ComparisonRunner::from_config(config, &registry).context("Failed to set up model providers")
}

async fn compare(config: HarnessConfig, json: bool) -> Result<()> {
    let runner = runner(config)?;
    let report = runner.run_demo().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::comparison_report(&report)?);
    }
    Ok(())
}

async fn chat(config: HarnessConfig, interactive: bool) -> Result<()> {
    let runner = runner(config)?;

    println!("{}", render::rule("Model Evaluation"));
    println!("\nRunning curated evaluation prompts...");
    for entry in runner.run_eval().await {
        print!("{}", render::prompt_header(&entry.category, &entry.prompt));
        println!("{}", render::rule("Friction Model Response"));
        println!("{}", render::reply(&entry.reply));
    }

    if !interactive {
        return Ok(());
    }

    println!("\nEntering interactive mode (Ctrl+D or Ctrl+C to exit)");
    println!("Type your questions to test the model's reasoning capabilities:");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };
    let stdin = BufReader::new(tokio::io::stdin());
    let asked = question_loop(&runner, stdin, shutdown).await?;

    tracing::debug!(asked, "Interactive session finished");
    println!("\nExiting interactive mode...");
    Ok(())
}

/// Answer questions read from `input` until EOF or `shutdown` completes.
///
/// Blank lines are skipped. Returns the number of questions asked.
async fn question_loop<R, S>(runner: &ComparisonRunner, input: R, shutdown: S) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut lines = input.lines();
    let mut stdout = tokio::io::stdout();
    let mut asked = 0;

    loop {
        stdout.write_all(b"\nYour question: ").await?;
        stdout.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            () = &mut shutdown => None,
        };
        let Some(line) = line else {
            break;
        };
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }

        println!("{}", render::rule("Friction Model Response"));
        println!("{}", render::reply(&runner.ask_friction(prompt).await));
        asked += 1;
    }

    Ok(asked)
}

fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn parse(config: &HarnessConfig, file: Option<PathBuf>, chatml: bool, json: bool) -> Result<()> {
    let input = read_input(file)?;

    let raw = if chatml {
        extract_assistant_turn(&input).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Input is not a ChatML transcript");
            UNPARSEABLE_RESPONSE.to_string()
        })
    } else {
        input
    };

    let parsed = ResponseParser::new(config.markers.clone()).parse(&raw);
    if json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
    } else {
        println!("{}", parsed);
    }
    Ok(())
}

fn validate(config: &HarnessConfig, path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(|| config.dataset_path.clone());
    let records = validate_file(&path)
        .with_context(|| format!("Dataset validation failed for {}", path.display()))?;

    println!("{}: {} records valid", path.display(), records.len());
    Ok(())
}
