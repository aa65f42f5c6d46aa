// src/normalizer/mod.rs
pub mod amounts;
pub mod dates;
pub mod heuristics;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::records::TransactionRecord;
pub use amounts::{AmountResolver, CurrencySymbols};

static DEFAULT_AMOUNT_RESOLVER: Lazy<AmountResolver> = Lazy::new(|| {
    AmountResolver::new(CurrencySymbols::default()).expect("Failed to compile default amount pattern")
});

/// Turns one `(headline, detail)` pair into a [`TransactionRecord`].
///
/// Holds no per-call state: the same normalizer can be shared across threads
/// and every call is independent. Fields that cannot be resolved come back as
/// `None` / `Unknown`; normalization itself never fails.
#[derive(Debug, Clone)]
pub struct Normalizer {
    amounts: AmountResolver,
}

impl Normalizer {
    pub fn new(symbols: CurrencySymbols) -> Result<Self, regex::Error> {
        Ok(Self { amounts: AmountResolver::new(symbols)? })
    }

    pub fn currency_symbols(&self) -> &CurrencySymbols {
        self.amounts.symbols()
    }

    /// Patterns used during resolution, labelled for the debug annotator.
    pub fn debug_patterns(&self) -> Vec<(&Regex, &'static str)> {
        let mut patterns: Vec<(&Regex, &'static str)> = dates::DATE_TEMPLATES
            .iter()
            .map(|template| (&template.pattern, "date"))
            .collect();
        if let Some(amount) = self.amounts.pattern() {
            patterns.push((amount, "amount"));
        }
        patterns
    }

    pub fn normalize(&self, headline: &str, detail: &str) -> TransactionRecord {
        let record = TransactionRecord {
            timestamp: dates::resolve_timestamp(detail, headline),
            transaction_type: heuristics::classify_type(headline),
            money: self.amounts.resolve(headline),
            counterparty: heuristics::extract_counterparty(headline),
            status: heuristics::classify_status(detail),
            raw_headline: headline.to_string(),
            raw_detail: detail.to_string(),
            credited_to: None,
            remarks: None,
        };

        tracing::trace!(
            "Normalized '{}' -> type={} amount={:?} counterparty={:?} status={}",
            headline,
            record.transaction_type,
            record.amount(),
            record.counterparty,
            record.status
        );
        record
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self { amounts: DEFAULT_AMOUNT_RESOLVER.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{TransactionStatus, TransactionType};
    use chrono::{NaiveDate, Weekday};
    use rust_decimal_macros::dec;

    #[test]
    fn test_end_to_end_scenario() {
        let record = Normalizer::default().normalize(
            "Paid ₹500.00 to Swiggy",
            "Jan 5, 2023, 8:15 PM GMT+05:30 · Completed",
        );

        assert_eq!(record.transaction_type, TransactionType::Payment);
        assert_eq!(record.amount(), Some(dec!(500.00)));
        assert_eq!(record.currency_symbol(), Some('₹'));
        assert_eq!(record.counterparty.as_deref(), Some("Swiggy"));
        assert_eq!(record.status, TransactionStatus::Completed);
        assert_eq!(record.day_of_week(), Some(Weekday::Thu));
        assert_eq!(
            record.timestamp.map(|ts| ts.local),
            NaiveDate::from_ymd_opt(2023, 1, 5).unwrap().and_hms_opt(20, 15, 0)
        );
    }

    #[test]
    fn test_glyph_agnostic_amounts() {
        let normalizer = Normalizer::default();
        let rupees = normalizer.normalize("Paid ₹1,234.50 to Ramesh", "");
        let dollars = normalizer.normalize("Paid $1,234.50 to Jane", "");

        assert_eq!(rupees.amount(), Some(dec!(1234.50)));
        assert_eq!(rupees.currency_symbol(), Some('₹'));
        assert_eq!(dollars.amount(), Some(dec!(1234.50)));
        assert_eq!(dollars.currency_symbol(), Some('$'));
    }

    #[test]
    fn test_unresolvable_fields_are_absent() {
        let record = Normalizer::default().normalize("Cashback credited", "Processing");

        assert!(record.timestamp.is_none());
        assert!(record.day_of_week().is_none());
        assert!(record.money.is_none());
        assert!(record.counterparty.is_none());
        assert_eq!(record.transaction_type, TransactionType::Unknown);
        assert_eq!(record.status, TransactionStatus::Unknown);
        assert_eq!(record.raw_headline, "Cashback credited");
        assert_eq!(record.raw_detail, "Processing");
    }

    #[test]
    fn test_empty_input_is_total() {
        let record = Normalizer::default().normalize("", "");
        assert!(record.timestamp.is_none());
        assert!(record.money.is_none());
    }

    #[test]
    fn test_date_falls_back_to_headline() {
        let record = Normalizer::default().normalize("Received $20 from Sam on Mar 3, 2024", "Completed");
        assert_eq!(record.day_of_week(), Some(Weekday::Sun));
        assert_eq!(record.transaction_type, TransactionType::Receipt);
        // Digits end the letter run, so the date is not swallowed.
        assert_eq!(record.counterparty.as_deref(), Some("Sam on Mar"));
    }

    #[test]
    fn test_custom_symbol_set() {
        let normalizer = Normalizer::new(CurrencySymbols::new(['¥'])).unwrap();
        assert!(normalizer.currency_symbols().contains('¥'));
        assert!(normalizer.normalize("Paid $5", "").money.is_none());
        assert_eq!(normalizer.normalize("Paid ¥5", "").amount(), Some(dec!(5)));
    }

    #[test]
    fn test_debug_patterns_cover_dates_and_amounts() {
        let normalizer = Normalizer::default();
        let patterns = normalizer.debug_patterns();
        assert_eq!(patterns.iter().filter(|(_, kind)| *kind == "date").count(), dates::DATE_TEMPLATES.len());
        assert_eq!(patterns.iter().filter(|(_, kind)| *kind == "amount").count(), 1);
    }
}
