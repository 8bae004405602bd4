//! Extract command - run the extraction loop on text or a single file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use strux_core::extraction::{Extractable, ExtractionLoop, LoopSettings, LoopState};
use strux_core::ingest::{load_file, load_input};
use strux_core::models::config::StruxConfig;
use strux_core::models::invoice::ProjectInvoice;
use strux_core::models::notes::MeetingNotes;
use strux_oracle::OracleBackend;

use super::{build_backend, load_config, SchemaKind};
use crate::output::{render, OutputFormat, TableView};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Text to extract from (takes precedence over --file)
    #[arg(short, long)]
    text: Option<String>,

    /// Input file (.txt, .pdf, .docx)
    #[arg(short = 'i', long)]
    file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Schema to extract (default: from config)
    #[arg(short, long, value_enum)]
    schema: Option<SchemaKind>,

    /// Maximum extract/validate rounds (default: from config)
    #[arg(short, long)]
    max_attempts: Option<u32>,

    /// Replay recorded oracle replies from a JSONL file instead of calling the service
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show attempt history and metrics
    #[arg(long)]
    show_metrics: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;
    if let Some(max_attempts) = args.max_attempts {
        config.extraction.max_attempts = max_attempts;
        config.check()?;
    }

    let raw_text = if let Some(text) = &args.text {
        load_input(text, &config.ingest)?
    } else if let Some(path) = &args.file {
        if !path.is_file() {
            anyhow::bail!("Input file not found: {}", path.display());
        }
        load_file(path, &config.ingest)?
    } else {
        anyhow::bail!("Please provide either --text or --file");
    };

    let schema = match args.schema {
        Some(schema) => schema,
        None => SchemaKind::from_config(&config.extraction.schema)?,
    };

    let backend = build_backend(&config, args.replay.as_deref())?;

    println!(
        "Processing input (Attempts limit: {})...",
        config.extraction.max_attempts
    );

    match schema {
        SchemaKind::Invoice => {
            extract_and_report::<ProjectInvoice>(&raw_text, backend.as_ref(), &config, &args).await?
        }
        SchemaKind::Notes => {
            extract_and_report::<MeetingNotes>(&raw_text, backend.as_ref(), &config, &args).await?
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

async fn extract_and_report<T>(
    raw_text: &str,
    backend: &dyn OracleBackend,
    config: &StruxConfig,
    args: &ExtractArgs,
) -> anyhow::Result<()>
where
    T: Extractable + TableView,
{
    let runner = ExtractionLoop::new(backend, LoopSettings::from(config));

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message(format!("Extracting {} via {}...", T::SCHEMA_NAME, backend.name()));
    pb.enable_steady_tick(std::time::Duration::from_millis(120));

    let state = tokio::select! {
        result = runner.run::<T>(raw_text) => result,
        _ = tokio::signal::ctrl_c() => {
            pb.finish_and_clear();
            anyhow::bail!("Interrupted, extraction abandoned");
        }
    };
    pb.finish_and_clear();
    let state: LoopState<T> = state?;

    info!(
        "Extraction finished: valid={}, attempts={}",
        state.is_valid(),
        state.attempt_count()
    );

    print_status(&state);

    let output = match state.final_output() {
        Some(value) => render(value, args.format)?,
        None => "No structured output generated.".to_string(),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_metrics {
        print_metrics(&state);
    }

    Ok(())
}

fn print_status<T>(state: &LoopState<T>) {
    let status = if state.is_valid() { "DONE" } else { "FAILED" };
    println!("Extraction Status: {}", status);
    println!("Total Attempts:    {}", state.attempt_count());

    if state.warning_flag() {
        println!(
            "{}",
            style("WARNING: Maximum attempts reached. Data may be inconsistent.")
                .yellow()
                .bold()
        );
    }

    if !state.validation_errors().is_empty() {
        println!();
        println!("{}", style("Validation Errors Encountered:").red());
        for error in state.validation_errors().iter() {
            println!(" - {}", error);
        }
    }
}

fn print_metrics<T>(state: &LoopState<T>) {
    let metrics = state.metrics();
    println!();
    println!(
        "{} {} attempt(s) in {}ms, ~{} prompt / ~{} reply tokens",
        style("ℹ").blue(),
        metrics.total_attempts,
        metrics.wall_time_ms,
        metrics.estimated_input_tokens,
        metrics.estimated_output_tokens
    );
    for record in state.history() {
        let outcome = if record.validation_errors.is_empty() {
            style("valid".to_string()).green()
        } else {
            style(format!("{} error(s)", record.validation_errors.len())).red()
        };
        println!(
            "   attempt {}: {} ({}ms)",
            record.attempt_number, outcome, record.elapsed_ms
        );
    }
}
