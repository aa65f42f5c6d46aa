// src/normalizer/heuristics.rs
//! Keyword tables and the counterparty pattern. Each table is scanned top to
//! bottom; the first row with a keyword contained in the lower-cased text wins.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::records::{TransactionStatus, TransactionType};

pub type KeywordRule<L> = (&'static [&'static str], L);

pub static TRANSACTION_TYPE_RULES: &[KeywordRule<TransactionType>] = &[
    (&["paid"], TransactionType::Payment),
    (&["received"], TransactionType::Receipt),
    (&["sent"], TransactionType::Transfer),
];

pub static STATUS_RULES: &[KeywordRule<TransactionStatus>] = &[
    (&["completed"], TransactionStatus::Completed),
    (&["pending"], TransactionStatus::Pending),
    (&["failed"], TransactionStatus::Failed),
];

// Over-matches on phrases like "sent to confirm"; kept as the exports expect.
static COUNTERPARTY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:to|from)\s+(?P<name>[\p{L} ]+)").expect("Failed to compile COUNTERPARTY_RE")
});

/// Case-insensitive first-match scan over a keyword table.
pub fn first_match<L: Copy>(text: &str, rules: &[KeywordRule<L>], fallback: L) -> L {
    let lowered = text.to_lowercase();
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(_, label)| *label)
        .unwrap_or(fallback)
}

pub fn classify_type(headline: &str) -> TransactionType {
    first_match(headline, TRANSACTION_TYPE_RULES, TransactionType::Unknown)
}

pub fn classify_status(detail: &str) -> TransactionStatus {
    first_match(detail, STATUS_RULES, TransactionStatus::Unknown)
}

pub fn extract_counterparty(headline: &str) -> Option<String> {
    COUNTERPARTY_RE
        .captures(headline)
        .map(|caps| caps["name"].trim().to_string())
        .filter(|name| !name.is_empty())
}
