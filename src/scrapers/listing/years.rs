//! Year discovery from the listing tabs.

use tracing::{info, warn};

use super::super::browser::{BrowserError, BrowserPage};
use super::{ListingDocument, TAB_ANCHOR_SELECTOR};
use crate::models::Year;

/// Years offered by the listing, most recent first.
///
/// Tabs whose `data-id` is not a year (e.g. "Sobre") are ignored.
pub fn discover_years(doc: &ListingDocument) -> Vec<Year> {
    let mut years: Vec<Year> = doc
        .attribute_values(TAB_ANCHOR_SELECTOR, "data-id")
        .iter()
        .filter_map(|id| id.parse::<Year>().ok())
        .collect();
    years.sort_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

/// Snapshot the page and discover its years.
pub async fn read_years<P: BrowserPage + ?Sized>(page: &mut P) -> Result<Vec<Year>, BrowserError> {
    let html = page.content().await?;
    let years = discover_years(&ListingDocument::parse(&html));

    if years.is_empty() {
        warn!("No year tabs found on the listing page");
    } else {
        let list: Vec<String> = years.iter().map(|y| y.to_string()).collect();
        info!("Available years: {}", list.join(", "));
    }

    Ok(years)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_years_descending() {
        let html = r#"
            <div class="tab"><a data-id="2019">2019</a></div>
            <div class="tab"><a data-id="2024">2024</a></div>
            <div class="tab"><a data-id="Sobre">Sobre</a></div>
            <div class="tab"><a data-id="2021">2021</a></div>
        "#;
        let years = discover_years(&ListingDocument::parse(html));
        assert_eq!(years, vec![Year(2024), Year(2021), Year(2019)]);
    }

    #[test]
    fn test_discover_years_full_range() {
        let mut html = String::new();
        for year in 1998..=2024 {
            html.push_str(&format!("<a data-id=\"{}\">{}</a>", year, year));
        }
        let years = discover_years(&ListingDocument::parse(&html));
        let expected: Vec<Year> = (1998..=2024).rev().map(Year).collect();
        assert_eq!(years, expected);
    }

    #[test]
    fn test_discover_years_ignores_layout_classes() {
        // Tabs restyled without the usual wrappers are still found
        let html = r#"<nav><span><a class="x" data-id="2022">2022</a></span></nav>"#;
        assert_eq!(discover_years(&ListingDocument::parse(html)), vec![Year(2022)]);
    }

    #[test]
    fn test_discover_years_dedup_and_empty() {
        let html = r#"<a data-id="2020"></a><a data-id="2020"></a>"#;
        assert_eq!(discover_years(&ListingDocument::parse(html)), vec![Year(2020)]);
        assert!(discover_years(&ListingDocument::parse("<p>nothing</p>")).is_empty());
    }
}
