//! Text normalization for matching visible page text.

use std::sync::LazyLock;

use regex::Regex;

static NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Normalize text for keyword comparison.
///
/// Drops ordinal indicators, folds accents to ASCII, lowercases, and collapses
/// every run of non-alphanumeric characters into a single space, so
/// "1º Dia – Caderno 1 – Azul – Aplicação Regular" becomes
/// "1 dia caderno 1 azul aplicacao regular".
pub fn normalize_for_match(text: &str) -> String {
    let text = text
        .replace("&nbsp;", " ")
        .replace(['º', 'ª', '°'], "");
    let folded = deunicode::deunicode(&text).to_lowercase();
    NON_ALNUM.replace_all(&folded, " ").trim().to_string()
}

/// Check whether normalized `text` contains every keyword.
pub fn contains_all(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().all(|k| text.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_callout() {
        assert_eq!(
            normalize_for_match("1º Dia – Caderno 1 – Azul – Aplicação Regular"),
            "1 dia caderno 1 azul aplicacao regular"
        );
    }

    #[test]
    fn test_normalize_reapplication() {
        assert_eq!(
            normalize_for_match("2ª DIA - Caderno 7 - AZUL - Reaplicação/PPL"),
            "2 dia caderno 7 azul reaplicacao ppl"
        );
    }

    #[test]
    fn test_normalize_entities_and_whitespace() {
        assert_eq!(normalize_for_match("  Tema&nbsp;da   Redação\u{a0}"), "tema da redacao");
        assert_eq!(normalize_for_match(""), "");
    }

    #[test]
    fn test_contains_all() {
        let text = normalize_for_match("1º Dia - Caderno 1 - Azul - Aplicação Regular");
        assert!(contains_all(&text, &["1 dia", "caderno 1", "azul", "aplicacao regular"]));
        assert!(!contains_all(&text, &["2 dia"]));
        assert!(contains_all(&text, &[]));
    }
}
