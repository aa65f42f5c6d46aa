// src/extractors/activity.rs

// --- Imports ---
use crate::utils::error::ExtractError;
use scraper::{ElementRef, Html, Selector};
use once_cell::sync::Lazy;

// --- Constants ---
/// Everything before this marker is page chrome; transactions live after it.
pub const ROOT_MARKER: &str = "</head>";

pub const DEFAULT_CONTAINER_SELECTOR: &str = "div.mdl-list__item";
pub const DEFAULT_HEADLINE_SELECTOR: &str = "div.mdl-list__item-primary-content";
pub const DEFAULT_DETAIL_SELECTOR: &str = "div.mdl-list__item-secondary-content";
pub const DEFAULT_SUB_TITLE_SELECTOR: &str = "div.mdl-list__item-sub-title";
pub const DEFAULT_REMARKS_SELECTOR: &str = "div.mdl-list__item-text-body";

// --- CSS Selectors (Lazy Static) ---
static CONTAINER_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(DEFAULT_CONTAINER_SELECTOR).expect("Failed to compile CONTAINER_SELECTOR")
});

static HEADLINE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(DEFAULT_HEADLINE_SELECTOR).expect("Failed to compile HEADLINE_SELECTOR")
});

static DETAIL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(DEFAULT_DETAIL_SELECTOR).expect("Failed to compile DETAIL_SELECTOR")
});

static SUB_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(DEFAULT_SUB_TITLE_SELECTOR).expect("Failed to compile SUB_TITLE_SELECTOR")
});

static REMARKS_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(DEFAULT_REMARKS_SELECTOR).expect("Failed to compile REMARKS_SELECTOR")
});

// --- Data Structures ---

/// Selector strings for one export layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub container: String,
    pub headline: String,
    pub detail: String,
    pub sub_title: String,
    pub remarks: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            container: DEFAULT_CONTAINER_SELECTOR.to_string(),
            headline: DEFAULT_HEADLINE_SELECTOR.to_string(),
            detail: DEFAULT_DETAIL_SELECTOR.to_string(),
            sub_title: DEFAULT_SUB_TITLE_SELECTOR.to_string(),
            remarks: DEFAULT_REMARKS_SELECTOR.to_string(),
        }
    }
}

/// Flattened text of one transaction container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub headline: String,
    pub detail: String,
    pub sub_title: Option<String>,
    pub remarks: Option<String>,
}

pub struct ActivityExtractor {
    container: Selector,
    headline: Selector,
    detail: Selector,
    sub_title: Selector,
    remarks: Selector,
}

/// Parses the part of the export after the root marker.
pub fn parse_export(raw_html: &str) -> Result<Html, ExtractError> {
    let head_end = raw_html.find(ROOT_MARKER).ok_or_else(|| {
        ExtractError::MissingRootMarker(format!("'{}' not found in {} byte document", ROOT_MARKER, raw_html.len()))
    })?;
    let body = &raw_html[head_end + ROOT_MARKER.len()..];
    tracing::debug!("Parsing {} bytes after root marker at offset {}", body.len(), head_end);

    Ok(Html::parse_document(body))
}

fn compile(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// All descendant text joined, whitespace runs collapsed, ends trimmed.
fn flatten_text(element: ElementRef) -> String {
    let text = element.text().collect::<String>();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl ActivityExtractor {
    pub fn new() -> Self {
        Self {
            container: CONTAINER_SELECTOR.clone(),
            headline: HEADLINE_SELECTOR.clone(),
            detail: DETAIL_SELECTOR.clone(),
            sub_title: SUB_TITLE_SELECTOR.clone(),
            remarks: REMARKS_SELECTOR.clone(),
        }
    }

    pub fn with_config(config: &ExtractorConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            container: compile(&config.container)?,
            headline: compile(&config.headline)?,
            detail: compile(&config.detail)?,
            sub_title: compile(&config.sub_title)?,
            remarks: compile(&config.remarks)?,
        })
    }

    /// Yields one entry per container that has both a headline and a detail
    /// region, in document order. Calling it again on the same document yields
    /// the same sequence.
    ///
    /// Fails only when the document holds no containers at all.
    pub fn extract<'a>(&'a self, document: &'a Html) -> Result<impl Iterator<Item = RawEntry> + 'a, ExtractError> {
        if document.select(&self.container).next().is_none() {
            return Err(ExtractError::NotFound(
                "document contains no transaction containers".to_string(),
            ));
        }

        Ok(document
            .select(&self.container)
            .enumerate()
            .filter_map(move |(index, container)| self.entry_from(index, container)))
    }

    fn entry_from(&self, index: usize, container: ElementRef) -> Option<RawEntry> {
        let region = |selector: &Selector| container.select(selector).next().map(flatten_text);

        let (headline, detail) = match (region(&self.headline), region(&self.detail)) {
            (Some(headline), Some(detail)) => (headline, detail),
            (headline, detail) => {
                tracing::trace!(
                    "Skipping container #{}: headline present={}, detail present={}",
                    index,
                    headline.is_some(),
                    detail.is_some()
                );
                return None;
            }
        };

        Some(RawEntry {
            headline,
            detail,
            sub_title: region(&self.sub_title).filter(|text| !text.is_empty()),
            remarks: region(&self.remarks).filter(|text| !text.is_empty()),
        })
    }
}

impl Default for ActivityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"
        <!DOCTYPE html>
        <html><head><title>My Activity</title>
        <div class="mdl-list__item"><div class="mdl-list__item-primary-content">Head chrome</div>
        <div class="mdl-list__item-secondary-content">ignored</div></div>
        </head><body>
        <div class="mdl-list">
          <div class="mdl-list__item">
            <div class="mdl-list__item-primary-content">Paid <b>₹500.00</b> to Swiggy</div>
            <div class="mdl-list__item-sub-title">Swiggy Ltd</div>
            <div class="mdl-list__item-secondary-content">
              Jan 5, 2023, 8:15 PM GMT+05:30 · Completed
            </div>
          </div>
          <div class="mdl-list__item">
            <div class="mdl-list__item-primary-content">Received ₹250 from Anita</div>
          </div>
          <div class="mdl-list__item">
            <div class="mdl-list__item-primary-content">Sent $12 to Bob</div>
            <div class="mdl-list__item-secondary-content">Jan 3, 2023 · Pending</div>
            <div class="mdl-list__item-text-body">  dinner   split </div>
          </div>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_extracts_complete_containers_in_order() {
        let document = parse_export(EXPORT).unwrap();
        let extractor = ActivityExtractor::new();
        let entries: Vec<RawEntry> = extractor.extract(&document).unwrap().collect();

        assert_eq!(entries.len(), 2, "container without detail must be skipped");
        assert_eq!(entries[0].headline, "Paid ₹500.00 to Swiggy");
        assert_eq!(entries[0].detail, "Jan 5, 2023, 8:15 PM GMT+05:30 · Completed");
        assert_eq!(entries[0].sub_title.as_deref(), Some("Swiggy Ltd"));
        assert_eq!(entries[0].remarks, None);
        assert_eq!(entries[1].headline, "Sent $12 to Bob");
        assert_eq!(entries[1].remarks.as_deref(), Some("dinner split"));
    }

    #[test]
    fn test_extraction_is_restartable() {
        let document = parse_export(EXPORT).unwrap();
        let extractor = ActivityExtractor::default();
        let first: Vec<RawEntry> = extractor.extract(&document).unwrap().collect();
        let second: Vec<RawEntry> = extractor.extract(&document).unwrap().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_root_marker() {
        let result = parse_export("<html><body><div class=\"mdl-list__item\"></div></body></html>");
        assert!(matches!(result, Err(ExtractError::MissingRootMarker(_))));
    }

    #[test]
    fn test_no_containers_is_an_error() {
        let document = parse_export("<html><head></head><body><p>Nothing here</p></body></html>").unwrap();
        let result = ActivityExtractor::new().extract(&document).map(|entries| entries.count());
        assert!(matches!(result, Err(ExtractError::NotFound(_))));
    }

    #[test]
    fn test_all_containers_partial_yields_empty_sequence() {
        let html = r#"<html><head></head><body>
            <div class="mdl-list__item"><div class="mdl-list__item-secondary-content">Completed</div></div>
        </body></html>"#;
        let document = parse_export(html).unwrap();
        let extractor = ActivityExtractor::new();
        let entries = extractor.extract(&document).unwrap();
        assert_eq!(entries.count(), 0);
    }

    #[test]
    fn test_custom_layout() {
        let config = ExtractorConfig {
            container: "li.txn".to_string(),
            headline: "span.title".to_string(),
            detail: "span.meta".to_string(),
            ..ExtractorConfig::default()
        };
        let html = r#"<head></head><ul><li class="txn"><span class="title">Paid €3 to Cafe</span><span class="meta">Completed</span></li></ul>"#;
        let document = parse_export(html).unwrap();
        let extractor = ActivityExtractor::with_config(&config).unwrap();
        let entries: Vec<RawEntry> = extractor.extract(&document).unwrap().collect();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].headline, "Paid €3 to Cafe");
        assert_eq!(entries[0].detail, "Completed");
    }

    #[test]
    fn test_invalid_selector() {
        let config = ExtractorConfig { container: "div[".to_string(), ..ExtractorConfig::default() };
        assert!(matches!(
            ActivityExtractor::with_config(&config),
            Err(ExtractError::InvalidSelector { .. })
        ));
    }
}
