// src/normalizer/amounts.rs
use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;

use crate::records::Money;

/// Glyphs in the payment exports seen so far.
pub const DEFAULT_CURRENCY_SYMBOLS: [char; 4] = ['₹', '$', '€', '£'];

/// The set of currency glyphs the amount resolver recognizes, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencySymbols {
    glyphs: Vec<char>,
}

impl CurrencySymbols {
    pub fn new<I: IntoIterator<Item = char>>(glyphs: I) -> Self {
        let mut set = Self { glyphs: Vec::new() };
        set.extend(glyphs);
        set
    }

    pub fn extend<I: IntoIterator<Item = char>>(&mut self, glyphs: I) {
        for glyph in glyphs {
            if !glyph.is_whitespace() && !self.glyphs.contains(&glyph) {
                self.glyphs.push(glyph);
            }
        }
    }

    pub fn contains(&self, glyph: char) -> bool {
        self.glyphs.contains(&glyph)
    }

    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }
}

impl Default for CurrencySymbols {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_SYMBOLS)
    }
}

/// Finds the first `<glyph><numeral>` pair in a headline.
#[derive(Debug, Clone)]
pub struct AmountResolver {
    symbols: CurrencySymbols,
    // None when the symbol set is empty; nothing can match then.
    pattern: Option<Regex>,
}

impl AmountResolver {
    pub fn new(symbols: CurrencySymbols) -> Result<Self, regex::Error> {
        let pattern = if symbols.glyphs().is_empty() {
            None
        } else {
            let alternatives = symbols
                .glyphs()
                .iter()
                .map(|glyph| regex::escape(&glyph.to_string()))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(
                r"(?P<glyph>{})\s*(?P<number>\d[\d,]*(?:\.\d+)?)",
                alternatives
            ))?)
        };

        Ok(Self { symbols, pattern })
    }

    pub fn symbols(&self) -> &CurrencySymbols {
        &self.symbols
    }

    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn resolve(&self, headline: &str) -> Option<Money> {
        let caps = self.pattern.as_ref()?.captures(headline)?;
        let currency = caps["glyph"].chars().next()?;
        let digits = caps["number"].replace(',', "");

        match Decimal::from_str(&digits) {
            Ok(amount) => Some(Money { amount, currency }),
            Err(e) => {
                tracing::debug!("Amount '{}' in headline '{}' is not a usable decimal: {}", &caps["number"], headline, e);
                None
            }
        }
    }
}
