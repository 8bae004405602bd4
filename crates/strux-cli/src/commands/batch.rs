//! Batch command - run independent extractions over many files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use strux_core::extraction::{Extractable, ExtractionLoop, LoopSettings};
use strux_core::ingest::{load_file, SourceKind};
use strux_core::models::config::StruxConfig;
use strux_core::models::invoice::ProjectInvoice;
use strux_core::models::notes::MeetingNotes;
use strux_oracle::OracleBackend;

use super::{build_backend, load_config, SchemaKind};
use crate::output::{render, OutputFormat, TableView};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input files (e.g. "inbox/*.pdf")
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Schema to extract (default: from config)
    #[arg(short, long, value_enum)]
    schema: Option<SchemaKind>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of files processed concurrently (always 1 with --replay)
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Replay recorded oracle replies from a JSONL file instead of calling the service.
    /// Files are then processed one at a time, in name order, so each reply goes to a
    /// predictable file.
    #[arg(long)]
    replay: Option<PathBuf>,
}

impl BatchArgs {
    /// Concurrency limit. Replayed replies come from one shared queue, so
    /// replay runs are sequential.
    fn effective_jobs(&self) -> usize {
        if self.replay.is_some() {
            if self.jobs > 1 {
                warn!("Replaying recorded replies, ignoring -j {} and running sequentially", self.jobs);
            }
            1
        } else {
            self.jobs.max(1)
        }
    }
}

/// Outcome of one file.
struct FileOutcome {
    path: PathBuf,
    status: &'static str,
    attempts: u32,
    warning: bool,
    error_count: usize,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let schema = match args.schema {
        Some(schema) => schema,
        None => SchemaKind::from_config(&config.extraction.schema)?,
    };
    let backend = build_backend(&config, args.replay.as_deref())?;

    let results = match schema {
        SchemaKind::Invoice => {
            process_all::<ProjectInvoice>(files, backend.as_ref(), &config, &args).await?
        }
        SchemaKind::Notes => {
            process_all::<MeetingNotes>(files, backend.as_ref(), &config, &args).await?
        }
    };

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let valid = results.iter().filter(|r| r.status == "valid").count();
    let invalid = results.iter().filter(|r| r.status == "invalid").count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} valid, {} invalid, {} failed",
        style(valid).green(),
        style(invalid).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn process_all<T>(
    files: Vec<PathBuf>,
    backend: &dyn OracleBackend,
    config: &StruxConfig,
    args: &BatchArgs,
) -> anyhow::Result<Vec<FileOutcome>>
where
    T: Extractable + TableView,
{
    let runner = ExtractionLoop::new(backend, LoopSettings::from(config));

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut outcomes = stream::iter(files)
        .map(|path| {
            let runner = &runner;
            let pb = &pb;
            async move {
                let outcome = process_file::<T>(&path, runner, config, args).await;
                pb.inc(1);
                (path, outcome)
            }
        })
        .buffer_unordered(args.effective_jobs());

    let mut results = Vec::new();
    while let Some((path, outcome)) = outcomes.next().await {
        match outcome {
            Ok(outcome) => results.push(outcome),
            Err(e) => {
                let message = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), message);
                    results.push(FileOutcome {
                        path,
                        status: "error",
                        attempts: 0,
                        warning: false,
                        error_count: 0,
                        error: Some(message),
                        processing_time_ms: 0,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), message);
                    pb.abandon();
                    anyhow::bail!("Processing failed: {}", message);
                }
            }
        }
    }

    pb.finish_with_message("Complete");
    results.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(results)
}

async fn process_file<T>(
    path: &Path,
    runner: &ExtractionLoop<'_>,
    config: &StruxConfig,
    args: &BatchArgs,
) -> anyhow::Result<FileOutcome>
where
    T: Extractable + TableView,
{
    let started = Instant::now();
    debug!("Processing {} as {:?}", path.display(), SourceKind::from_path(path));

    let raw_text = load_file(path, &config.ingest)?;
    let state = runner.run::<T>(&raw_text).await?;

    if let (Some(value), Some(output_dir)) = (state.final_output(), &args.output_dir) {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
        let output_path = output_dir.join(format!("{}.{}", stem, args.format.extension()));
        fs::write(&output_path, render(value, args.format)?)?;
        debug!("Wrote output to {}", output_path.display());
    }

    Ok(FileOutcome {
        path: path.to_path_buf(),
        status: if state.is_valid() { "valid" } else { "invalid" },
        attempts: state.attempt_count(),
        warning: state.warning_flag(),
        error_count: state.validation_errors().len(),
        error: None,
        processing_time_ms: started.elapsed().as_millis() as u64,
    })
}

fn write_summary(path: &Path, results: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "attempts",
        "warning",
        "error_count",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        wtr.write_record([
            filename,
            result.status,
            &result.attempts.to_string(),
            &result.warning.to_string(),
            &result.error_count.to_string(),
            &result.processing_time_ms.to_string(),
            result.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
