// src/normalizer/dates.rs

// --- Imports ---
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::records::Timestamp;

// --- Pattern Fragments ---
const MONTH: &str = r"(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)";
const DAY_YEAR: &str = r"\s+\d{1,2},\s*\d{4}";
const TIME_WITH_SECONDS: &str = r",\s*\d{1,2}:\d{2}:\d{2}\s*[AP]M";
const TIME: &str = r",\s*\d{1,2}:\d{2}\s*[AP]M";
const GMT_OFFSET: &str = r"\s*GMT[+-]\d{2}:\d{2}";

/// How much of a point in time a template carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    WithOffset,
    TimeOfDay,
    DateOnly,
}

#[derive(Debug)]
pub struct DateTemplate {
    pub name: &'static str,
    pub pattern: Regex,
    pub format: &'static str,
    pub precision: Precision,
}

impl DateTemplate {
    fn new(name: &'static str, pattern: String, format: &'static str, precision: Precision) -> Self {
        Self {
            name,
            pattern: Regex::new(&pattern).expect("Failed to compile date template pattern"),
            format,
            precision,
        }
    }

    /// Parses an already offset-normalized candidate against this template's format.
    fn parse(&self, candidate: &str) -> Option<Timestamp> {
        match self.precision {
            Precision::WithOffset => DateTime::parse_from_str(candidate, self.format)
                .ok()
                .map(|dt| Timestamp { local: dt.naive_local(), offset: Some(*dt.offset()) }),
            Precision::TimeOfDay => NaiveDateTime::parse_from_str(candidate, self.format)
                .ok()
                .map(|local| Timestamp { local, offset: None }),
            Precision::DateOnly => NaiveDate::parse_from_str(candidate, self.format)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|local| Timestamp { local, offset: None }),
        }
    }
}

// Most specific first. The first template matching either text wins.
pub static DATE_TEMPLATES: Lazy<Vec<DateTemplate>> = Lazy::new(|| {
    vec![
        DateTemplate::new(
            "date, time with seconds, offset",
            format!("{MONTH}{DAY_YEAR}{TIME_WITH_SECONDS}{GMT_OFFSET}"),
            "%b %d, %Y, %I:%M:%S %p %z",
            Precision::WithOffset,
        ),
        DateTemplate::new(
            "date, time, offset",
            format!("{MONTH}{DAY_YEAR}{TIME}{GMT_OFFSET}"),
            "%b %d, %Y, %I:%M %p %z",
            Precision::WithOffset,
        ),
        DateTemplate::new(
            "date, time with seconds",
            format!("{MONTH}{DAY_YEAR}{TIME_WITH_SECONDS}"),
            "%b %d, %Y, %I:%M:%S %p",
            Precision::TimeOfDay,
        ),
        DateTemplate::new(
            "date, time",
            format!("{MONTH}{DAY_YEAR}{TIME}"),
            "%b %d, %Y, %I:%M %p",
            Precision::TimeOfDay,
        ),
        DateTemplate::new(
            "date",
            format!("{MONTH}{DAY_YEAR}"),
            "%b %d, %Y",
            Precision::DateOnly,
        ),
    ]
});

static GMT_OFFSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"GMT([+-]\d{2}):(\d{2})").expect("Failed to compile GMT_OFFSET_RE")
});

/// Outcome of scanning the texts against the template table.
#[derive(Debug)]
pub enum DateMatch<'t> {
    Matched { text: &'t str, template: &'static DateTemplate },
    NoMatch,
}

/// Finds the first template (in table order) matching the detail text, then the headline.
pub fn find_date<'t>(detail: &'t str, headline: &'t str) -> DateMatch<'t> {
    DATE_TEMPLATES.iter().fold(DateMatch::NoMatch, |found, template| match found {
        DateMatch::NoMatch => [detail, headline]
            .into_iter()
            .find_map(|text| template.pattern.find(text))
            .map_or(DateMatch::NoMatch, |m| DateMatch::Matched { text: m.as_str(), template }),
        matched => matched,
    })
}

/// Rewrites `GMT+05:30` to `+0530` and collapses whitespace runs (including the
/// narrow no-break space some exports put before AM/PM) to a single space.
pub fn normalize_candidate(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    GMT_OFFSET_RE.replace_all(&collapsed, "$1$2").into_owned()
}

/// Resolves the transaction timestamp, or `None` when nothing usable is found.
pub fn resolve_timestamp(detail: &str, headline: &str) -> Option<Timestamp> {
    match find_date(detail, headline) {
        DateMatch::NoMatch => {
            tracing::trace!("No date pattern matched detail '{}' or headline '{}'", detail, headline);
            None
        }
        DateMatch::Matched { text, template } => {
            let candidate = normalize_candidate(text);
            let parsed = DATE_TEMPLATES.iter().find_map(|t| t.parse(&candidate));
            if parsed.is_none() {
                tracing::debug!("Date text '{}' matched template '{}' but did not parse", text, template.name);
            }
            parsed
        }
    }
}
