//! Exam edition and document category models.
//!
//! The INEP listing publishes one tab per exam year. Inside each tab the
//! documents are grouped by sitting (regular, digital, reapplication/PPL) and
//! by exam day, and only the blue booklet ("caderno azul") is collected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An exam edition, identified by its year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Year(pub u16);

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Year {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u16>().map(Year)
    }
}

/// Exam sitting a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sitting {
    /// The primary scheduled sitting.
    Regular,
    /// The computer-based sitting.
    Digital,
    /// Secondary sitting for excused or displaced candidates (PPL).
    Reapplication,
}

impl Sitting {
    /// Normalized phrase the site uses in callouts for this sitting.
    pub fn callout_phrase(&self) -> &'static str {
        match self {
            Self::Regular => "aplicacao regular",
            Self::Digital => "aplicacao digital",
            Self::Reapplication => "reaplicacao ppl",
        }
    }

    /// Human-readable label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Regular => "Aplicação Regular",
            Self::Digital => "Aplicação Digital",
            Self::Reapplication => "Reaplicação/PPL",
        }
    }
}

/// Whether a document is the exam booklet or its answer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Exam,
    Key,
}

impl DocumentKind {
    /// Normalized word the link text contains for this kind.
    pub fn link_keyword(&self) -> &'static str {
        match self {
            Self::Exam => "prova",
            Self::Key => "gabarito",
        }
    }
}

/// The fixed taxonomy of documents collected per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    RegularD1Exam,
    RegularD1Key,
    RegularD2Exam,
    RegularD2Key,
    DigitalD1Exam,
    DigitalD1Key,
    DigitalD2Exam,
    DigitalD2Key,
    ReapplicationEssayTheme,
    ReapplicationD1Exam,
    ReapplicationD1Key,
    ReapplicationD2Exam,
    ReapplicationD2Key,
}

impl DocumentCategory {
    /// Every category, in the order links are extracted and downloaded.
    pub const ALL: [DocumentCategory; 13] = [
        Self::RegularD1Exam,
        Self::RegularD1Key,
        Self::RegularD2Exam,
        Self::RegularD2Key,
        Self::DigitalD1Exam,
        Self::DigitalD1Key,
        Self::DigitalD2Exam,
        Self::DigitalD2Key,
        Self::ReapplicationEssayTheme,
        Self::ReapplicationD1Exam,
        Self::ReapplicationD1Key,
        Self::ReapplicationD2Exam,
        Self::ReapplicationD2Key,
    ];

    /// Build the exam or key category for a sitting and day (1 or 2).
    pub fn booklet(sitting: Sitting, day: u8, kind: DocumentKind) -> Option<Self> {
        use DocumentKind::{Exam, Key};
        use Sitting::{Digital, Reapplication, Regular};

        let category = match (sitting, day, kind) {
            (Regular, 1, Exam) => Self::RegularD1Exam,
            (Regular, 1, Key) => Self::RegularD1Key,
            (Regular, 2, Exam) => Self::RegularD2Exam,
            (Regular, 2, Key) => Self::RegularD2Key,
            (Digital, 1, Exam) => Self::DigitalD1Exam,
            (Digital, 1, Key) => Self::DigitalD1Key,
            (Digital, 2, Exam) => Self::DigitalD2Exam,
            (Digital, 2, Key) => Self::DigitalD2Key,
            (Reapplication, 1, Exam) => Self::ReapplicationD1Exam,
            (Reapplication, 1, Key) => Self::ReapplicationD1Key,
            (Reapplication, 2, Exam) => Self::ReapplicationD2Exam,
            (Reapplication, 2, Key) => Self::ReapplicationD2Key,
            _ => return None,
        };
        Some(category)
    }

    /// Slug used in downloaded filenames, matching the site's own naming.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::RegularD1Exam => "regular_d1_prova_azul",
            Self::RegularD1Key => "regular_d1_gabarito_azul",
            Self::RegularD2Exam => "regular_d2_prova_azul",
            Self::RegularD2Key => "regular_d2_gabarito_azul",
            Self::DigitalD1Exam => "digital_d1_prova_azul",
            Self::DigitalD1Key => "digital_d1_gabarito_azul",
            Self::DigitalD2Exam => "digital_d2_prova_azul",
            Self::DigitalD2Key => "digital_d2_gabarito_azul",
            Self::ReapplicationEssayTheme => "reaplicacao_redacao",
            Self::ReapplicationD1Exam => "reaplicacao_d1_prova_azul",
            Self::ReapplicationD1Key => "reaplicacao_d1_gabarito_azul",
            Self::ReapplicationD2Exam => "reaplicacao_d2_prova_azul",
            Self::ReapplicationD2Key => "reaplicacao_d2_gabarito_azul",
        }
    }

    pub fn sitting(&self) -> Sitting {
        match self {
            Self::RegularD1Exam | Self::RegularD1Key | Self::RegularD2Exam | Self::RegularD2Key => {
                Sitting::Regular
            }
            Self::DigitalD1Exam | Self::DigitalD1Key | Self::DigitalD2Exam | Self::DigitalD2Key => {
                Sitting::Digital
            }
            _ => Sitting::Reapplication,
        }
    }

    /// Regular-application documents are published every year; everything
    /// else may legitimately be missing.
    pub fn is_required(&self) -> bool {
        self.sitting() == Sitting::Regular
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// A link to one document of a given category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLink {
    pub category: DocumentCategory,
    pub url: String,
}

impl DocumentLink {
    pub fn new(category: DocumentCategory, url: impl Into<String>) -> Self {
        Self {
            category,
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_parse_and_display() {
        let year: Year = " 2024 ".parse().unwrap();
        assert_eq!(year, Year(2024));
        assert_eq!(year.to_string(), "2024");
        assert!("Sobre".parse::<Year>().is_err());
    }

    #[test]
    fn test_year_ordering() {
        let mut years = vec![Year(1998), Year(2024), Year(2010)];
        years.sort_by(|a, b| b.cmp(a));
        assert_eq!(years, vec![Year(2024), Year(2010), Year(1998)]);
    }

    #[test]
    fn test_booklet_mapping() {
        assert_eq!(
            DocumentCategory::booklet(Sitting::Regular, 1, DocumentKind::Exam),
            Some(DocumentCategory::RegularD1Exam)
        );
        assert_eq!(
            DocumentCategory::booklet(Sitting::Reapplication, 2, DocumentKind::Key),
            Some(DocumentCategory::ReapplicationD2Key)
        );
        assert_eq!(
            DocumentCategory::booklet(Sitting::Regular, 3, DocumentKind::Exam),
            None
        );
    }

    #[test]
    fn test_slugs_are_unique() {
        let mut slugs: Vec<&str> = DocumentCategory::ALL.iter().map(|c| c.slug()).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), DocumentCategory::ALL.len());
        assert_eq!(DocumentCategory::RegularD1Exam.to_string(), "regular_d1_prova_azul");
    }

    #[test]
    fn test_required_categories() {
        let required: Vec<_> = DocumentCategory::ALL
            .into_iter()
            .filter(|c| c.is_required())
            .collect();
        assert_eq!(
            required,
            vec![
                DocumentCategory::RegularD1Exam,
                DocumentCategory::RegularD1Key,
                DocumentCategory::RegularD2Exam,
                DocumentCategory::RegularD2Key,
            ]
        );
        assert_eq!(
            DocumentCategory::ReapplicationEssayTheme.sitting(),
            Sitting::Reapplication
        );
    }
}
