// src/analysis/mod.rs
//! Derived fields and spending aggregates computed from normalized records.

// --- Imports ---
use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::normalizer::heuristics::{first_match, KeywordRule};
use crate::records::{weekday_name, TransactionRecord};

// --- Constants ---
/// Number of counterparties kept in the top-N list of a summary.
pub const TOP_COUNTERPARTIES: usize = 10;

/// Number of equal-width bins in the amount distribution.
pub const AMOUNT_BINS: usize = 30;

// --- Category ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    FoodAndDining,
    Shopping,
    Transportation,
    PersonalCare,
    Others,
}

pub static CATEGORY_RULES: &[KeywordRule<Category>] = &[
    (
        &["food", "restaurant", "cafe", "hotel", "dining", "eats", "swiggy", "zomato"],
        Category::FoodAndDining,
    ),
    (
        &["shop", "store", "market", "mart", "flipkart", "amazon", "myntra"],
        Category::Shopping,
    ),
    (
        &["transport", "uber", "ola", "metro", "bus", "train", "taxi", "auto"],
        Category::Transportation,
    ),
    (&["salon", "spa", "beauty", "gym", "fitness"], Category::PersonalCare),
];

impl Category {
    /// Classifies a counterparty name; an absent name is matched as the text "none".
    pub fn of(counterparty: Option<&str>) -> Self {
        first_match(counterparty.unwrap_or("none"), CATEGORY_RULES, Category::Others)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::FoodAndDining => "Food & Dining",
            Category::Shopping => "Shopping",
            Category::Transportation => "Transportation",
            Category::PersonalCare => "Personal Care",
            Category::Others => "Others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// --- Time of Day ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
    Unknown,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn of(record: &TransactionRecord) -> Self {
        record
            .timestamp
            .map(|ts| Self::from_hour(ts.hour()))
            .unwrap_or(TimeOfDay::Unknown)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Night => "Night",
            TimeOfDay::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// --- Summary Structures ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
    pub total: Decimal,
}

/// Spread of the amounts within one currency group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AmountStats {
    pub min: Decimal,
    pub max: Decimal,
    pub mean: Decimal,
}

/// Aggregates for the records sharing one currency glyph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencySummary {
    pub currency: String,
    pub transactions: usize,
    /// Saturates at the largest representable amount instead of overflowing.
    pub total: Decimal,
    pub amounts: AmountStats,
    /// Histogram over `[min, max]`; empty bins are omitted.
    pub amount_distribution: Vec<Bucket>,
    pub by_category: Vec<Bucket>,
    pub by_day_of_week: Vec<Bucket>,
    pub by_time_of_day: Vec<Bucket>,
    pub by_date: Vec<Bucket>,
    pub top_counterparties: Vec<Bucket>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpendingSummary {
    pub records: usize,
    /// Records with no resolvable amount; they appear in no currency group.
    pub unpriced_records: usize,
    pub currencies: Vec<CurrencySummary>,
}

// --- Aggregation ---
/// Adds two amounts, clamping to the representable range on overflow.
fn add_amounts(total: Decimal, amount: Decimal) -> Decimal {
    total.checked_add(amount).unwrap_or_else(|| {
        tracing::warn!("Amount total overflowed; clamping at the largest representable value");
        if amount.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

fn sum_amounts<I: IntoIterator<Item = Decimal>>(amounts: I) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, add_amounts)
}

/// Sums amounts per key; buckets come back in key order.
fn tally<K, I>(entries: I) -> Vec<Bucket>
where
    K: Ord,
    I: IntoIterator<Item = (K, String, Decimal)>,
{
    let mut buckets: BTreeMap<K, Bucket> = BTreeMap::new();
    for (key, label, amount) in entries {
        let bucket = buckets.entry(key).or_insert_with(|| Bucket {
            label,
            count: 0,
            total: Decimal::ZERO,
        });
        bucket.count += 1;
        bucket.total = add_amounts(bucket.total, amount);
    }
    buckets.into_values().collect()
}

fn amount_stats(amounts: &[Decimal]) -> AmountStats {
    let min = amounts.iter().copied().min().unwrap_or(Decimal::ZERO);
    let max = amounts.iter().copied().max().unwrap_or(Decimal::ZERO);
    // Mean of the clamped total; the count is never zero for a currency group.
    let mean = sum_amounts(amounts.iter().copied())
        .checked_div(Decimal::from(amounts.len().max(1)))
        .unwrap_or(Decimal::ZERO);
    AmountStats { min, max, mean }
}

/// Buckets amounts into [`AMOUNT_BINS`] equal-width bins between `min` and `max`.
fn amount_distribution(amounts: &[Decimal], stats: &AmountStats) -> Vec<Bucket> {
    // All amounts are non-negative, so the span cannot overflow.
    let span = stats.max.saturating_sub(stats.min);
    if span.is_zero() {
        let label = format!("{} - {}", stats.min, stats.max);
        return tally(amounts.iter().map(|amount| (0usize, label.clone(), *amount)));
    }

    let width = span / Decimal::from(AMOUNT_BINS);
    let edge = |bin: usize| stats.min.saturating_add(width.saturating_mul(Decimal::from(bin))).round_dp(2);

    tally(amounts.iter().map(|amount| {
        let bin = ((*amount - stats.min) / width)
            .floor()
            .to_usize()
            .unwrap_or(0)
            .min(AMOUNT_BINS - 1);
        let upper = if bin == AMOUNT_BINS - 1 { stats.max.round_dp(2) } else { edge(bin + 1) };
        (bin, format!("{} - {}", edge(bin), upper), *amount)
    }))
}

fn summarize_currency(currency: char, group: &[(&TransactionRecord, Decimal)]) -> CurrencySummary {
    let by_category = tally(group.iter().map(|(rec, amount)| {
        let category = Category::of(rec.counterparty.as_deref());
        (category, category.label().to_string(), *amount)
    }));

    let by_day_of_week = tally(group.iter().filter_map(|(rec, amount)| {
        rec.day_of_week()
            .map(|day| (day.num_days_from_monday(), weekday_name(day).to_string(), *amount))
    }));

    let by_time_of_day = tally(group.iter().map(|(rec, amount)| {
        let slot = TimeOfDay::of(rec);
        (slot, slot.label().to_string(), *amount)
    }));

    let by_date = tally(group.iter().filter_map(|(rec, amount)| {
        rec.timestamp.map(|ts| {
            let date = ts.local.date();
            (date, date.to_string(), *amount)
        })
    }));

    let mut top_counterparties = tally(group.iter().filter_map(|(rec, amount)| {
        rec.counterparty
            .as_ref()
            .map(|name| (name.clone(), name.clone(), *amount))
    }));
    top_counterparties.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.label.cmp(&b.label)));
    top_counterparties.truncate(TOP_COUNTERPARTIES);

    let amounts: Vec<Decimal> = group.iter().map(|(_, amount)| *amount).collect();
    let stats = amount_stats(&amounts);

    CurrencySummary {
        currency: currency.to_string(),
        transactions: group.len(),
        total: sum_amounts(amounts.iter().copied()),
        amounts: stats,
        amount_distribution: amount_distribution(&amounts, &stats),
        by_category,
        by_day_of_week,
        by_time_of_day,
        by_date,
        top_counterparties,
    }
}

// --- Summary Entry Point ---
/// Builds per-currency aggregates. Amounts in different currencies are never added together.
pub fn summarize(records: &[TransactionRecord]) -> SpendingSummary {
    let mut groups: BTreeMap<char, Vec<(&TransactionRecord, Decimal)>> = BTreeMap::new();
    let mut unpriced_records = 0;

    for record in records {
        match record.money {
            Some(money) => groups.entry(money.currency).or_default().push((record, money.amount)),
            None => unpriced_records += 1,
        }
    }

    let currencies = groups
        .iter()
        .map(|(currency, group)| summarize_currency(*currency, group))
        .collect::<Vec<_>>();

    tracing::debug!(
        "Summarized {} records across {} currencies ({} without amount)",
        records.len(),
        currencies.len(),
        unpriced_records
    );

    SpendingSummary {
        records: records.len(),
        unpriced_records,
        currencies,
    }
}
