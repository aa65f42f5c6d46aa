// src/utils/html_debug.rs
use std::fs;
use std::path::Path;
use regex::Regex;
use crate::utils::error::AppError;

/// Renders the export with each highlight range wrapped in a styled span.
/// Ranges are byte offsets into `html`; a range overlapping an earlier one is dropped.
pub fn render_debug_html(html: &str, highlights: &[(usize, usize, &str)]) -> String {
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");

    debug_html.push_str(".highlight-date { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-amount { background-color: #FFFF00; }\n");
    debug_html.push_str(".highlight-custom { background-color: #FFC0CB; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut last_pos = 0;
    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| (h.0, std::cmp::Reverse(h.1)));

    for (start, end, highlight_type) in sorted_highlights {
        if start < last_pos || end > html.len() {
            continue;
        }
        debug_html.push_str(&html[last_pos..start]);

        let css_class = match highlight_type {
            "date" => "highlight-date",
            "amount" => "highlight-amount",
            _ => "highlight-custom",
        };

        debug_html.push_str(&format!("<span class=\"{}\" title=\"Position: {}-{}, Type: {}\">",
            css_class, start, end, highlight_type));
        debug_html.push_str(&html[start..end]);
        debug_html.push_str("</span>");

        last_pos = end;
    }

    debug_html.push_str(&html[last_pos..]);
    debug_html.push_str("\n</body>\n</html>");
    debug_html
}

/// Writes a copy of the export with every match of the given patterns highlighted.
pub fn create_debug_html(html: &str, path: &Path, patterns: &[(&Regex, &str)]) -> Result<(), AppError> {
    let mut highlights = Vec::new();

    for (re, highlight_type) in patterns {
        for mat in re.find_iter(html) {
            highlights.push((mat.start(), mat.end(), *highlight_type));
        }
    }
    tracing::debug!("Collected {} debug highlights", highlights.len());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_debug_html(html, &highlights))?;

    tracing::info!("Saved debug HTML to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_highlights_keep_the_outer_match() {
        let html = "<p>Jan 5, 2023, 8:15 PM</p>";
        let outer = (3, 23, "date");
        let inner = (3, 14, "date");
        let rendered = render_debug_html(html, &[inner, outer]);

        assert_eq!(rendered.matches("<span").count(), 1);
        assert!(rendered.contains("title=\"Position: 3-23, Type: date\">Jan 5, 2023, 8:15 PM</span>"));
    }

    #[test]
    fn test_create_debug_html_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug").join("annotated.html");
        let re = Regex::new(r"₹\s*\d+").unwrap();

        create_debug_html("<div>Paid ₹500 to Swiggy</div>", &path, &[(&re, "amount")]).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("<span class=\"highlight-amount\""));
        assert!(written.contains("₹500</span> to Swiggy"));
    }
}
