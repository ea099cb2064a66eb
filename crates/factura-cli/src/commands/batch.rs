//! Batch processing command for multiple invoice files.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};

use factura_core::models::invoice::{FileOutcome, OutcomeStatus};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Directory for per-file JSON outcomes
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;
    let pipeline = super::build_pipeline(&config)?;

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

    let mut uploads = Vec::with_capacity(files.len());
    for path in &files {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        uploads.push((filename, fs::read(path)?));
    }

    let progress = ProgressBar::new(uploads.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    // The whole batch is blocking work (subprocess OCR per page), so it
    // runs off the async runtime; the progress bar handle is shared.
    let bar = progress.clone();
    let outcomes: Vec<FileOutcome> = tokio::task::spawn_blocking(move || {
        uploads
            .iter()
            .map(|(filename, bytes)| {
                let outcome = pipeline.process_upload(filename, bytes);
                bar.inc(1);
                outcome
            })
            .collect()
    })
    .await?;

    progress.finish_with_message("Complete");

    if let Some(ref output_dir) = args.output_dir {
        for outcome in &outcomes {
            let stem = std::path::Path::new(&outcome.filename)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("invoice");
            let path = output_dir.join(format!("{}.json", stem));
            fs::write(&path, serde_json::to_string_pretty(outcome)?)?;
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &outcomes)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful = outcomes
        .iter()
        .filter(|o| o.status == OutcomeStatus::Success)
        .count();
    let failed = outcomes.len() - successful;

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed).red()
    );

    if failed > 0 {
        println!();
        println!("{}", style("Failed files:").red());
        for outcome in outcomes.iter().filter(|o| o.status == OutcomeStatus::Error) {
            println!(
                "  - {}: {}",
                outcome.filename,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_summary(path: &PathBuf, outcomes: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_number",
        "date",
        "bill_to",
        "total",
        "currency",
        "error",
    ])?;

    for outcome in outcomes {
        let status = match outcome.status {
            OutcomeStatus::Success => "success",
            OutcomeStatus::Error => "error",
        };

        if let Some(invoice) = &outcome.data {
            wtr.write_record([
                outcome.filename.as_str(),
                status,
                invoice.invoice_number.as_deref().unwrap_or(""),
                invoice.date.as_deref().unwrap_or(""),
                invoice.bill_to.as_deref().unwrap_or(""),
                &invoice
                    .total
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
                &invoice.currency,
                outcome.error.as_deref().unwrap_or(""),
            ])?;
        } else {
            wtr.write_record([
                outcome.filename.as_str(),
                status,
                "",
                "",
                "",
                "",
                "",
                outcome.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
