//! Document link extraction from an activated year tab.
//!
//! Each booklet group is announced by a callout paragraph such as
//! "1º Dia - Caderno 1 - Azul - Aplicação Regular", followed by a list with
//! "Prova" and "Gabarito" links. Depending on the year the list is a sibling
//! of the callout or a sibling of the callout's parent.

use scraper::{ElementRef, Selector};
use tracing::{debug, info, warn};
use url::Url;

use super::super::browser::{BrowserError, BrowserPage};
use super::{element_text, ListingDocument};
use crate::models::{DocumentCategory, DocumentKind, DocumentLink, Sitting, Year};
use crate::utils::{contains_all, normalize_for_match};

/// Callout keywords identifying one booklet group, besides the sitting's
/// own phrase.
struct BookletGroup {
    sitting: Sitting,
    day: u8,
    keywords: &'static [&'static str],
}

const REGULAR_GROUPS: &[BookletGroup] = &[
    BookletGroup {
        sitting: Sitting::Regular,
        day: 1,
        keywords: &["1 dia", "caderno 1", "azul"],
    },
    BookletGroup {
        sitting: Sitting::Regular,
        day: 2,
        keywords: &["2 dia", "caderno 7", "azul"],
    },
];

// Digital callouts do not number the blue booklet
const DIGITAL_GROUPS: &[BookletGroup] = &[
    BookletGroup {
        sitting: Sitting::Digital,
        day: 1,
        keywords: &["1 dia", "caderno", "azul"],
    },
    BookletGroup {
        sitting: Sitting::Digital,
        day: 2,
        keywords: &["2 dia", "caderno", "azul"],
    },
];

const REAPPLICATION_GROUPS: &[BookletGroup] = &[
    BookletGroup {
        sitting: Sitting::Reapplication,
        day: 1,
        keywords: &["1 dia", "caderno 1", "azul"],
    },
    BookletGroup {
        sitting: Sitting::Reapplication,
        day: 2,
        keywords: &["2 dia", "caderno 7", "azul"],
    },
];

const ESSAY_THEME_TEXT: &str = "tema da redacao";

/// Links found in one year's tab.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Extraction {
    /// Links in download order.
    pub links: Vec<DocumentLink>,
    /// Regular-application categories that were expected but not found.
    pub missing_required: Vec<DocumentCategory>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    fn record(&mut self, year: Year, category: DocumentCategory, url: Option<String>) {
        match url {
            Some(url) => {
                debug!("Found {} for {}: {}", category, year, url);
                self.links.push(DocumentLink::new(category, url));
            }
            None if category.is_required() => {
                warn!("Link not found for {} in {}", category, year);
                self.missing_required.push(category);
            }
            None => {
                debug!("Optional link {} not present for {}", category, year);
            }
        }
    }
}

/// Extract every known document link from a year's tab.
///
/// Relative `href`s are resolved against `base_url`. Missing optional
/// categories are skipped silently.
pub fn extract_links(doc: &ListingDocument, year: Year, base_url: &Url) -> Extraction {
    let mut extraction = Extraction::default();

    let Some(pane) = doc.tab_content(year) else {
        warn!("Tab content for {} not found", year);
        extraction.missing_required = DocumentCategory::ALL
            .into_iter()
            .filter(|c| c.is_required())
            .collect();
        return extraction;
    };

    for group in REGULAR_GROUPS.iter().chain(DIGITAL_GROUPS) {
        extract_group(&pane, group, year, base_url, &mut extraction);
    }

    let essay = find_anchor(&pane, |text| text.contains(ESSAY_THEME_TEXT))
        .and_then(|a| resolve_href(&a, base_url));
    if essay.is_none() {
        info!("Essay theme (reapplication) not listed for {}", year);
    }
    extraction.record(year, DocumentCategory::ReapplicationEssayTheme, essay);

    for group in REAPPLICATION_GROUPS {
        extract_group(&pane, group, year, base_url, &mut extraction);
    }

    extraction
}

/// Snapshot the page and extract the links for `year`.
pub async fn read_links<P: BrowserPage + ?Sized>(
    page: &mut P,
    year: Year,
    base_url: &Url,
) -> Result<Extraction, BrowserError> {
    let html = page.content().await?;
    Ok(extract_links(&ListingDocument::parse(&html), year, base_url))
}

fn extract_group(
    pane: &ElementRef<'_>,
    group: &BookletGroup,
    year: Year,
    base_url: &Url,
    extraction: &mut Extraction,
) {
    let (Some(exam_category), Some(key_category)) = (
        DocumentCategory::booklet(group.sitting, group.day, DocumentKind::Exam),
        DocumentCategory::booklet(group.sitting, group.day, DocumentKind::Key),
    ) else {
        return;
    };

    let Some(callout) = find_callout(pane, group) else {
        let msg = format!(
            "Callout for {} day {} not found in {}",
            group.sitting.label(),
            group.day,
            year
        );
        if group.sitting == Sitting::Regular {
            warn!("{}", msg);
        } else {
            debug!("{}", msg);
        }
        extraction.record(year, exam_category, None);
        extraction.record(year, key_category, None);
        return;
    };

    let mut exam = None;
    let mut key = None;
    for anchor in anchors_after(&callout) {
        let text = normalize_for_match(&element_text(&anchor));
        if exam.is_none() && text.contains(DocumentKind::Exam.link_keyword()) {
            exam = resolve_href(&anchor, base_url);
        } else if key.is_none() && text.contains(DocumentKind::Key.link_keyword()) {
            key = resolve_href(&anchor, base_url);
        }
        if exam.is_some() && key.is_some() {
            break;
        }
    }

    extraction.record(year, exam_category, exam);
    extraction.record(year, key_category, key);
}

/// First `p.callout` in the pane naming the group's sitting and every keyword.
fn find_callout<'a>(pane: &ElementRef<'a>, group: &BookletGroup) -> Option<ElementRef<'a>> {
    let selector = Selector::parse("p.callout").ok()?;
    pane.select(&selector).find(|p| {
        let text = normalize_for_match(&element_text(p));
        text.contains(group.sitting.callout_phrase()) && contains_all(&text, group.keywords)
    })
}

/// First anchor in the pane whose normalized text satisfies `pred`.
fn find_anchor<'a>(pane: &ElementRef<'a>, pred: impl Fn(&str) -> bool) -> Option<ElementRef<'a>> {
    let selector = Selector::parse("a").ok()?;
    pane.select(&selector)
        .find(|a| pred(&normalize_for_match(&element_text(a))))
}

/// Anchors inside the `ul`/`div` siblings that follow the callout, then
/// inside those that follow its parent, in document order.
fn anchors_after<'a>(callout: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let Ok(anchor) = Selector::parse("a") else {
        return Vec::new();
    };

    let mut containers: Vec<ElementRef<'a>> = following_containers(callout);
    if let Some(parent) = callout.parent().and_then(ElementRef::wrap) {
        containers.extend(following_containers(&parent));
    }

    containers
        .iter()
        .flat_map(|c| c.select(&anchor).collect::<Vec<_>>())
        .collect()
}

fn following_containers<'a>(el: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    el.next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(|sib| matches!(sib.value().name(), "ul" | "div"))
        .collect()
}

fn resolve_href(anchor: &ElementRef<'_>, base_url: &Url) -> Option<String> {
    let href = anchor.value().attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    base_url.join(href).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.gov.br/inep/provas-e-gabaritos").unwrap()
    }

    // Layout where the link list is a sibling of the callout
    const TAB_2024: &str = r#"
    <div class="tab-content" data-id="2024">
      <h3>ENEM 2024</h3>
      <p class="callout">1º Dia - Caderno 1 - Azul - Aplicação Regular</p>
      <ul>
        <li><a href="/files/2024_PV_D1_CD1.pdf">Prova</a></li>
        <li><a href="/files/2024_GB_D1_CD1.pdf">Gabarito</a></li>
      </ul>
      <p class="callout">2º Dia - Caderno 7 - Azul - Aplicação Regular</p>
      <ul>
        <li><a href="/files/2024_PV_D2_CD7.pdf">Prova</a></li>
        <li><a href="/files/2024_GB_D2_CD7.pdf">Gabarito</a></li>
      </ul>
      <p><a href="/files/2024_tema_reap.pdf">Tema da Redação</a></p>
      <p class="callout">1º Dia - Caderno 1 - Azul - Reaplicação/PPL</p>
      <ul>
        <li><a href="https://cdn.example.org/2024_PV_reap_D1.pdf">Prova</a></li>
        <li><a href="https://cdn.example.org/2024_GB_reap_D1.pdf">Gabarito</a></li>
      </ul>
      <p class="callout">2º Dia - Caderno 7 - Azul - Reaplicação/PPL</p>
      <ul>
        <li><a href="/files/2024_PV_reap_D2.pdf">Prova</a></li>
        <li><a href="/files/2024_GB_reap_D2.pdf">Gabarito</a></li>
      </ul>
    </div>
    "#;

    // Layout where the callout is wrapped and the list follows the wrapper
    const TAB_2023: &str = r#"
    <div class="tab-content" data-id="2023">
      <h3>ENEM 2023</h3>
      <div><p class="callout">1º DIA – CADERNO 1 – AZUL – APLICAÇÃO REGULAR</p></div>
      <ul>
        <li><a href="/files/2023_GB_D1.pdf">Gabarito</a></li>
        <li><a href="/files/2023_PV_D1.pdf">Prova</a></li>
      </ul>
      <div><p class="callout">2º DIA – CADERNO 7 – AZUL – APLICAÇÃO REGULAR</p></div>
      <ul>
        <li><a href="/files/2023_PV_D2.pdf">Prova</a></li>
      </ul>
    </div>
    "#;

    fn categories(extraction: &Extraction) -> Vec<DocumentCategory> {
        extraction.links.iter().map(|l| l.category).collect()
    }

    #[test]
    fn test_extract_full_year_in_order() {
        let doc = ListingDocument::parse(TAB_2024);
        let extraction = extract_links(&doc, Year(2024), &base());

        assert_eq!(
            categories(&extraction),
            vec![
                DocumentCategory::RegularD1Exam,
                DocumentCategory::RegularD1Key,
                DocumentCategory::RegularD2Exam,
                DocumentCategory::RegularD2Key,
                DocumentCategory::ReapplicationEssayTheme,
                DocumentCategory::ReapplicationD1Exam,
                DocumentCategory::ReapplicationD1Key,
                DocumentCategory::ReapplicationD2Exam,
                DocumentCategory::ReapplicationD2Key,
            ]
        );
        assert!(extraction.missing_required.is_empty());
        assert_eq!(
            extraction.links[0].url,
            "https://www.gov.br/files/2024_PV_D1_CD1.pdf"
        );
        assert_eq!(
            extraction.links[5].url,
            "https://cdn.example.org/2024_PV_reap_D1.pdf"
        );
    }

    #[test]
    fn test_extract_parent_sibling_layout() {
        let doc = ListingDocument::parse(TAB_2023);
        let extraction = extract_links(&doc, Year(2023), &base());

        let by_category = |c| {
            extraction
                .links
                .iter()
                .find(|l| l.category == c)
                .map(|l| l.url.as_str())
        };
        // Link order within the list does not matter
        assert_eq!(
            by_category(DocumentCategory::RegularD1Exam),
            Some("https://www.gov.br/files/2023_PV_D1.pdf")
        );
        assert_eq!(
            by_category(DocumentCategory::RegularD1Key),
            Some("https://www.gov.br/files/2023_GB_D1.pdf")
        );
        assert_eq!(
            by_category(DocumentCategory::RegularD2Exam),
            Some("https://www.gov.br/files/2023_PV_D2.pdf")
        );
        assert_eq!(
            extraction.missing_required,
            vec![DocumentCategory::RegularD2Key]
        );
    }

    #[test]
    fn test_extract_without_reapplication() {
        let doc = ListingDocument::parse(TAB_2023);
        let extraction = extract_links(&doc, Year(2023), &base());
        assert!(extraction
            .links
            .iter()
            .all(|l| l.category.sitting() == Sitting::Regular));
    }

    #[test]
    fn test_extract_digital_application() {
        let html = r#"
        <div class="tab-content" data-id="2021">
          <p class="callout">1º Dia - Caderno Azul - Aplicação Digital</p>
          <ul><li><a href="/d1.pdf">Prova</a></li><li><a href="/g1.pdf">Gabarito</a></li></ul>
        </div>"#;
        let extraction = extract_links(&ListingDocument::parse(html), Year(2021), &base());
        assert_eq!(
            categories(&extraction),
            vec![
                DocumentCategory::DigitalD1Exam,
                DocumentCategory::DigitalD1Key
            ]
        );
        assert_eq!(extraction.missing_required.len(), 4);
    }

    #[test]
    fn test_groups_name_their_sitting() {
        for group in REGULAR_GROUPS
            .iter()
            .chain(DIGITAL_GROUPS)
            .chain(REAPPLICATION_GROUPS)
        {
            assert!(DocumentCategory::booklet(group.sitting, group.day, DocumentKind::Exam).is_some());
        }
    }

    #[test]
    fn test_extract_missing_pane() {
        let extraction = extract_links(&ListingDocument::parse("<div></div>"), Year(2000), &base());
        assert!(extraction.is_empty());
        assert_eq!(extraction.missing_required.len(), 4);
    }

    #[test]
    fn test_extract_skips_empty_href() {
        let html = r#"
        <div class="tab-content" data-id="2020">
          <p class="callout">1º Dia - Caderno 1 - Azul - Aplicação Regular</p>
          <ul><li><a href="">Prova</a></li><li><a href="/g.pdf">Gabarito</a></li></ul>
        </div>"#;
        let extraction = extract_links(&ListingDocument::parse(html), Year(2020), &base());
        assert_eq!(categories(&extraction), vec![DocumentCategory::RegularD1Key]);
    }
}
