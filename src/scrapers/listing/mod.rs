//! Queryable view over the exam listing page.
//!
//! The listing is a set of year tabs (`a[data-id="2024"]`) and matching
//! content panes (`div.tab-content[data-id="2024"]`). Lookups go by the
//! `data-id` attribute and by visible text, never by position, and work on an
//! HTML snapshot so they can be exercised with plain fixtures.

mod links;
mod tabs;
mod years;

pub use links::{extract_links, read_links, Extraction};
pub use tabs::TabActivator;
pub use years::{discover_years, read_years};

use scraper::{ElementRef, Html, Selector};

use crate::models::Year;

/// Anchors carrying a `data-id` are the year tabs.
pub const TAB_ANCHOR_SELECTOR: &str = "a[data-id]";

/// Selector for the tab anchor of a year.
pub fn tab_selector(year: Year) -> String {
    format!("a[data-id=\"{}\"]", year)
}

/// Selector for the content pane of a year.
pub fn content_selector(year: Year) -> String {
    format!("div.tab-content[data-id=\"{}\"]", year)
}

/// Parsed snapshot of the rendered listing.
pub struct ListingDocument {
    html: Html,
}

impl ListingDocument {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Values of `attr` on every element matching `css`, in document order.
    pub fn attribute_values(&self, css: &str, attr: &str) -> Vec<String> {
        let Ok(selector) = Selector::parse(css) else {
            return Vec::new();
        };
        self.html
            .select(&selector)
            .filter_map(|el| el.value().attr(attr))
            .map(|v| v.to_string())
            .collect()
    }

    /// Content pane for a year, if rendered.
    pub fn tab_content(&self, year: Year) -> Option<ElementRef<'_>> {
        let selector = Selector::parse(&content_selector(year)).ok()?;
        self.html.select(&selector).next()
    }

    /// A pane counts as loaded once it shows a heading or a callout.
    pub fn is_tab_loaded(&self, year: Year) -> bool {
        let Some(pane) = self.tab_content(year) else {
            return false;
        };
        let Ok(marker) = Selector::parse("h3, p.callout") else {
            return false;
        };
        pane.select(&marker).next().is_some()
    }
}

/// Visible text of an element, whitespace untouched.
pub(crate) fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>()
}
