// src/pipeline/mod.rs
use std::path::Path;
use std::sync::Arc;

use crate::extractors::{parse_export, ActivityExtractor, RawEntry};
use crate::normalizer::Normalizer;
use crate::records::TransactionRecord;
use crate::utils::error::ExtractError;
use crate::utils::AppError;

/// Normalizes one extracted entry, keeping the container's sub-title and remarks.
pub fn normalize_entry(normalizer: &Normalizer, entry: RawEntry) -> TransactionRecord {
    let record = normalizer.normalize(&entry.headline, &entry.detail);
    TransactionRecord {
        credited_to: entry.sub_title,
        remarks: entry.remarks,
        ..record
    }
}

/// Parses an export and normalizes every complete transaction container, in document order.
pub fn extract_records(
    raw_html: &str,
    extractor: &ActivityExtractor,
    normalizer: &Normalizer,
) -> Result<Vec<TransactionRecord>, ExtractError> {
    let document = parse_export(raw_html)?;
    let records: Vec<TransactionRecord> = extractor
        .extract(&document)?
        .map(|entry| normalize_entry(normalizer, entry))
        .collect();

    let dated = records.iter().filter(|r| r.timestamp.is_some()).count();
    let priced = records.iter().filter(|r| r.money.is_some()).count();
    tracing::info!(
        "Extracted {} transactions ({} with a date, {} with an amount)",
        records.len(),
        dated,
        priced
    );

    Ok(records)
}

pub async fn read_export(path: &Path) -> Result<String, AppError> {
    let raw_html = tokio::fs::read_to_string(path).await?;
    tracing::info!("Read {} bytes from {}", raw_html.len(), path.display());
    Ok(raw_html)
}

/// Runs extraction on the blocking pool; the parsed document never leaves that thread.
pub async fn process_export(
    raw_html: String,
    extractor: Arc<ActivityExtractor>,
    normalizer: Arc<Normalizer>,
) -> Result<Vec<TransactionRecord>, AppError> {
    let records = tokio::task::spawn_blocking(move || extract_records(&raw_html, &extractor, &normalizer))
        .await
        .map_err(|e| AppError::Processing(format!("Extraction task failed: {}", e)))??;
    Ok(records)
}

pub async fn process_file(
    path: &Path,
    extractor: Arc<ActivityExtractor>,
    normalizer: Arc<Normalizer>,
) -> Result<Vec<TransactionRecord>, AppError> {
    let raw_html = read_export(path).await?;
    process_export(raw_html, extractor, normalizer).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{TransactionStatus, TransactionType};
    use chrono::Weekday;
    use rust_decimal_macros::dec;
    use std::io::Write;

    const EXPORT: &str = r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>My Activity</title></head>
<body><div class="mdl-list">
  <div class="mdl-list__item">
    <div class="mdl-list__item-primary-content">Paid ₹500.00 to Swiggy</div>
    <div class="mdl-list__item-sub-title">Swiggy</div>
    <div class="mdl-list__item-secondary-content">Jan 5, 2023, 8:15 PM GMT+05:30 · Completed</div>
  </div>
  <div class="mdl-list__item">
    <div class="mdl-list__item-primary-content">Broken entry with no detail</div>
  </div>
  <div class="mdl-list__item">
    <div class="mdl-list__item-primary-content">Received ₹1,200 from Priya</div>
    <div class="mdl-list__item-secondary-content">Jan 4, 2023, 10:02:11 AM · Pending</div>
    <div class="mdl-list__item-text-body">rent share</div>
  </div>
  <div class="mdl-list__item">
    <div class="mdl-list__item-primary-content">Cashback credited</div>
    <div class="mdl-list__item-secondary-content">Failed</div>
  </div>
</div></body></html>"#;

    #[test]
    fn test_extract_records_end_to_end() {
        let records = extract_records(EXPORT, &ActivityExtractor::new(), &Normalizer::default()).unwrap();

        assert_eq!(records.len(), 3);

        assert_eq!(records[0].transaction_type, TransactionType::Payment);
        assert_eq!(records[0].amount(), Some(dec!(500.00)));
        assert_eq!(records[0].counterparty.as_deref(), Some("Swiggy"));
        assert_eq!(records[0].credited_to.as_deref(), Some("Swiggy"));
        assert_eq!(records[0].day_of_week(), Some(Weekday::Thu));

        assert_eq!(records[1].transaction_type, TransactionType::Receipt);
        assert_eq!(records[1].amount(), Some(dec!(1200)));
        assert_eq!(records[1].status, TransactionStatus::Pending);
        assert_eq!(records[1].remarks.as_deref(), Some("rent share"));
        assert_eq!(records[1].day_of_week(), Some(Weekday::Wed));

        assert_eq!(records[2].status, TransactionStatus::Failed);
        assert!(records[2].timestamp.is_none());
        assert!(records[2].money.is_none());
    }

    #[test]
    fn test_structural_errors_abort() {
        let normalizer = Normalizer::default();
        let extractor = ActivityExtractor::new();

        let no_marker = extract_records("<div class=\"mdl-list__item\"></div>", &extractor, &normalizer);
        assert!(matches!(no_marker, Err(ExtractError::MissingRootMarker(_))));

        let no_containers = extract_records("<head></head><body></body>", &extractor, &normalizer);
        assert!(matches!(no_containers, Err(ExtractError::NotFound(_))));
    }

    #[test]
    fn test_process_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXPORT.as_bytes()).unwrap();

        let records = tokio_test::block_on(process_file(
            file.path(),
            Arc::new(ActivityExtractor::new()),
            Arc::new(Normalizer::default()),
        ))
        .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].raw_headline, "Paid ₹500.00 to Swiggy");
    }

    #[test]
    fn test_process_file_missing_input() {
        let result = tokio_test::block_on(process_file(
            Path::new("/definitely/not/here.html"),
            Arc::new(ActivityExtractor::new()),
            Arc::new(Normalizer::default()),
        ));
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
