// src/main.rs
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use payment_history::{analysis, pipeline, utils};
use payment_history::utils::AppError;
use payment_history::extractors::{ActivityExtractor, ExtractorConfig};
use payment_history::normalizer::{CurrencySymbols, Normalizer};
use payment_history::storage::StorageManager;

const SUMMARY_FILE_NAME: &str = "summary.json";

/// Command Line Interface for the payment activity extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the exported activity HTML file
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for the transaction table and summary
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// File name of the transaction CSV inside the output directory
    #[arg(long, default_value = "transactions.csv")]
    csv_name: String,

    /// Also write a per-currency spending summary as JSON
    #[arg(short, long)]
    summary: bool,

    /// Extra currency glyph to recognize in amounts (repeatable)
    #[arg(long = "currency-symbol")]
    currency_symbols: Vec<char>,

    /// CSS selector for one transaction container
    #[arg(long)]
    container_selector: Option<String>,

    /// CSS selector for the headline region inside a container
    #[arg(long)]
    headline_selector: Option<String>,

    /// CSS selector for the detail region inside a container
    #[arg(long)]
    detail_selector: Option<String>,

    /// Debug mode - save an annotated copy of the export with date and amount matches highlighted
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn extractor_config(&self) -> ExtractorConfig {
        let defaults = ExtractorConfig::default();
        ExtractorConfig {
            container: self.container_selector.clone().unwrap_or(defaults.container),
            headline: self.headline_selector.clone().unwrap_or(defaults.headline),
            detail: self.detail_selector.clone().unwrap_or(defaults.detail),
            ..ExtractorConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Build the normalizer and extractor from configuration
    let mut symbols = CurrencySymbols::default();
    symbols.extend(args.currency_symbols.iter().copied());
    let normalizer = Normalizer::new(symbols)
        .map_err(|e| AppError::Config(format!("Invalid currency symbol set: {}", e)))?;
    tracing::debug!("Recognized currency symbols: {:?}", normalizer.currency_symbols().glyphs());

    let extractor = ActivityExtractor::with_config(&args.extractor_config())?;

    // 4. Initialize storage and read the export
    let storage = StorageManager::new(&args.output_dir)?;
    let raw_html = pipeline::read_export(&args.input).await?;

    if args.debug {
        let debug_path = storage.base_dir().join("debug").join("export_annotated.html");
        if let Err(e) = utils::html_debug::create_debug_html(&raw_html, &debug_path, &normalizer.debug_patterns()) {
            tracing::warn!("Failed to create debug HTML: {}", e);
        } else {
            tracing::info!("Created annotated debug HTML: {}", debug_path.display());
        }
    }

    // 5. Extract and normalize
    let records = pipeline::process_export(raw_html, Arc::new(extractor), Arc::new(normalizer)).await?;
    if records.is_empty() {
        tracing::warn!("Transaction containers were found but none had both a headline and a detail region");
    }

    // 6. Write outputs
    storage.save_transactions(&records, &args.csv_name)?;

    if args.summary {
        let summary = analysis::summarize(&records);
        for currency in &summary.currencies {
            tracing::info!(
                "{}: {} transactions totalling {}",
                currency.currency,
                currency.transactions,
                currency.total
            );
        }
        storage.save_summary(&summary, SUMMARY_FILE_NAME)?;
    }

    tracing::info!("Processing finished. Records written: {}", records.len());
    Ok(())
}
