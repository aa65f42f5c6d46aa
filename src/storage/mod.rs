// src/storage/mod.rs
// --- Imports ---
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{FixedOffset, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::analysis::SpendingSummary;
use crate::records::{weekday_name, Money, Timestamp, TransactionRecord, TIMESTAMP_FORMAT};
use crate::utils::error::StorageError;

// --- CSV Layout ---
/// CSV header, in the same order as the row fields below.
pub const COLUMNS: [&str; 12] = [
    "timestamp",
    "utc_offset",
    "day_of_week",
    "transaction_type",
    "amount",
    "currency_symbol",
    "counterparty",
    "status",
    "raw_headline",
    "raw_detail",
    "credited_to",
    "remarks",
];

/// One CSV line. Column order follows the record layout; absent values are empty cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TransactionRow {
    timestamp: Option<String>,
    utc_offset: Option<String>,
    day_of_week: Option<String>,
    transaction_type: String,
    amount: Option<String>,
    currency_symbol: Option<String>,
    counterparty: Option<String>,
    status: String,
    raw_headline: String,
    raw_detail: String,
    credited_to: Option<String>,
    remarks: Option<String>,
}

impl From<&TransactionRecord> for TransactionRow {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            timestamp: record.timestamp.map(|ts| ts.canonical()),
            utc_offset: record.timestamp.and_then(|ts| ts.offset).map(|offset| offset.to_string()),
            day_of_week: record.day_of_week().map(|day| weekday_name(day).to_string()),
            transaction_type: record.transaction_type.to_string(),
            amount: record.amount().map(|amount| amount.to_string()),
            currency_symbol: record.currency_symbol().map(|glyph| glyph.to_string()),
            counterparty: record.counterparty.clone(),
            status: record.status.to_string(),
            raw_headline: record.raw_headline.clone(),
            raw_detail: record.raw_detail.clone(),
            credited_to: record.credited_to.clone(),
            remarks: record.remarks.clone(),
        }
    }
}

// --- Row Validation ---
/// Parses `+05:30` / `-04:00`.
fn parse_offset(text: &str) -> Option<FixedOffset> {
    let (sign, rest) = match text.chars().next()? {
        '+' => (1, &text[1..]),
        '-' => (-1, &text[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let seconds = hours.parse::<i32>().ok()? * 3600 + minutes.parse::<i32>().ok()? * 60;
    FixedOffset::east_opt(sign * seconds)
}

impl TransactionRow {
    fn into_record(self) -> Result<TransactionRecord, String> {
        let offset = self
            .utc_offset
            .as_deref()
            .map(|text| parse_offset(text).ok_or_else(|| format!("bad utc_offset '{}'", text)))
            .transpose()?;

        let timestamp = match self.timestamp.as_deref() {
            Some(text) => {
                let local = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
                    .map_err(|e| format!("bad timestamp '{}': {}", text, e))?;
                Some(Timestamp { local, offset })
            }
            None if offset.is_some() => return Err("utc_offset without timestamp".to_string()),
            None => None,
        };

        // The weekday column is redundant with the timestamp and must agree with it
        let derived_day = timestamp.map(|ts| weekday_name(ts.weekday()));
        if self.day_of_week.as_deref() != derived_day {
            return Err(format!(
                "day_of_week {:?} does not match timestamp {:?}",
                self.day_of_week, self.timestamp
            ));
        }

        // Amount and currency are written together or not at all
        let money = match (self.amount.as_deref(), self.currency_symbol.as_deref()) {
            (Some(amount), Some(symbol)) => {
                let mut glyphs = symbol.chars();
                let currency = match (glyphs.next(), glyphs.next()) {
                    (Some(glyph), None) => glyph,
                    _ => return Err(format!("currency_symbol '{}' is not a single character", symbol)),
                };
                let amount = amount
                    .parse::<Decimal>()
                    .map_err(|e| format!("bad amount '{}': {}", amount, e))?;
                Some(Money { amount, currency })
            }
            (None, None) => None,
            _ => return Err("amount and currency_symbol must be both present or both empty".to_string()),
        };

        Ok(TransactionRecord {
            timestamp,
            transaction_type: self.transaction_type.parse()?,
            money,
            counterparty: self.counterparty,
            status: self.status.parse()?,
            raw_headline: self.raw_headline,
            raw_detail: self.raw_detail,
            credited_to: self.credited_to,
            remarks: self.remarks,
        })
    }
}

// --- Storage Manager ---
pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Writes a header row and one row per record. The header is written even for an empty batch.
    pub fn save_transactions(&self, records: &[TransactionRecord], file_name: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(file_name);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&file_path)?;

        // Headers are written by hand so an empty batch still gets them
        writer.write_record(COLUMNS)?;
        for record in records {
            writer.serialize(TransactionRow::from(record))?;
        }
        writer.flush()?;

        tracing::info!("Saved {} transactions to {}", records.len(), file_path.display());
        Ok(file_path)
    }

    /// Reads back a file written by [`StorageManager::save_transactions`].
    pub fn load_transactions(&self, file_name: &str) -> Result<Vec<TransactionRecord>, StorageError> {
        let file_path = self.base_dir.join(file_name);
        let mut reader = csv::Reader::from_path(&file_path)?;
        let headers = reader.headers()?.clone();

        let mut records = Vec::new();
        for result in reader.records() {
            let raw = result?;
            // Line numbers are 1-based and count the header
            let line = raw.position().map(|pos| pos.line()).unwrap_or_default();
            let row: TransactionRow = raw.deserialize(Some(&headers))?;
            let record = row
                .into_record()
                .map_err(|reason| StorageError::InvalidRow { line, reason })?;
            records.push(record);
        }

        tracing::debug!("Loaded {} transactions from {}", records.len(), file_path.display());
        Ok(records)
    }

    /// Saves the spending summary as pretty-printed JSON
    pub fn save_summary(&self, summary: &SpendingSummary, file_name: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(file_name);

        let summary_value = serde_json::to_value(summary)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        let document = serde_json::json!({
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "summary": summary_value,
        });

        let document_str = serde_json::to_string_pretty(&document)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, document_str)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved summary to {}", file_path.display());
        Ok(file_path)
    }
}
