//! Single-file processing command.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use console::style;

use factura_core::models::invoice::{FileOutcome, OutcomeStatus};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, JPG, JPEG or PNG)
    input: PathBuf,

    /// Write the outcome to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

/// Output format for processing results.
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON outcome
    Json,
    /// Human-readable summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let pipeline = super::build_pipeline(&config)?;

    let filename = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    let bytes = std::fs::read(&args.input)?;

    // The pipeline blocks on subprocess OCR; keep it off the runtime.
    let outcome =
        tokio::task::spawn_blocking(move || pipeline.process_upload(&filename, &bytes)).await?;

    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&outcome)?,
        OutputFormat::Text => format_outcome_text(&outcome),
    };

    match args.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => println!("{}", rendered),
    }

    if outcome.status == OutcomeStatus::Error {
        anyhow::bail!(
            "processing failed: {}",
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}

pub fn format_outcome_text(outcome: &FileOutcome) -> String {
    let mut out = String::new();

    match outcome.status {
        OutcomeStatus::Success => {
            out.push_str(&format!("{} {}\n", style("✓").green(), outcome.filename));
        }
        OutcomeStatus::Error => {
            out.push_str(&format!(
                "{} {}: {}\n",
                style("✗").red(),
                outcome.filename,
                outcome.error.as_deref().unwrap_or("unknown error")
            ));
        }
    }

    if let Some(invoice) = &outcome.data {
        if let Some(number) = &invoice.invoice_number {
            out.push_str(&format!("  Invoice:  {}\n", number));
        }
        if let Some(date) = &invoice.date {
            out.push_str(&format!("  Date:     {}\n", date));
        }
        if let Some(bill_to) = &invoice.bill_to {
            out.push_str(&format!("  Bill to:  {}\n", bill_to));
        }
        if let Some(total) = invoice.total {
            out.push_str(&format!("  Total:    {} {}\n", total, invoice.currency));
        }
        if !invoice.items.is_empty() {
            out.push_str(&format!("  Items:    {}\n", invoice.items.len()));
        }
    }

    out
}
