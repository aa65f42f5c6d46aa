// src/records/models.rs
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, FixedOffset, NaiveDateTime, Timelike, Weekday};
use rust_decimal::Decimal;

/// Canonical textual form of a resolved timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Wall-clock time as printed in the export, plus the offset when the export gave one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub local: NaiveDateTime,
    pub offset: Option<FixedOffset>,
}

impl Timestamp {
    pub fn weekday(&self) -> Weekday {
        self.local.weekday()
    }

    pub fn hour(&self) -> u32 {
        self.local.hour()
    }

    /// `YYYY-MM-DD HH:MM:SS`, offset not included.
    pub fn canonical(&self) -> String {
        self.local.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Amount and glyph travel together so one can never be present without the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Money {
    pub amount: Decimal,
    pub currency: char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransactionType {
    Payment,
    Receipt,
    Transfer,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
    Unknown,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Payment => "Payment",
            TransactionType::Receipt => "Receipt",
            TransactionType::Transfer => "Transfer",
            TransactionType::Unknown => "Unknown",
        }
    }
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Failed => "Failed",
            TransactionStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Payment" => Ok(TransactionType::Payment),
            "Receipt" => Ok(TransactionType::Receipt),
            "Transfer" => Ok(TransactionType::Transfer),
            "Unknown" | "" => Ok(TransactionType::Unknown),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Completed" => Ok(TransactionStatus::Completed),
            "Pending" => Ok(TransactionStatus::Pending),
            "Failed" => Ok(TransactionStatus::Failed),
            "Unknown" | "" => Ok(TransactionStatus::Unknown),
            other => Err(format!("unknown transaction status '{}'", other)),
        }
    }
}

/// Full English weekday name, e.g. "Friday".
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// One normalized transaction. Built once by the normalizer, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub timestamp: Option<Timestamp>,
    pub transaction_type: TransactionType,
    pub money: Option<Money>,
    pub counterparty: Option<String>,
    pub status: TransactionStatus,
    pub raw_headline: String,
    pub raw_detail: String,
    pub credited_to: Option<String>,
    pub remarks: Option<String>,
}

impl TransactionRecord {
    /// Derived from the timestamp, so it is present exactly when the timestamp is.
    pub fn day_of_week(&self) -> Option<Weekday> {
        self.timestamp.map(|ts| ts.weekday())
    }

    pub fn amount(&self) -> Option<Decimal> {
        self.money.map(|m| m.amount)
    }

    pub fn currency_symbol(&self) -> Option<char> {
        self.money.map(|m| m.currency)
    }
}
