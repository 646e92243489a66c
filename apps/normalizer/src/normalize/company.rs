//! Company-name normalization and identity.

use super::content_id;

/// Legal-entity suffix tokens stripped before hashing, so spelling variants
/// of the same employer collide to one id.
const LEGAL_SUFFIXES: &[&str] = &["ооо", "зао", "ао"];

const QUOTE_CHARS: &[char] = &['«', '»', '"', '\'', '„', '“', '”'];

/// Lower-cases the employer name and drops legal-entity suffix tokens.
/// "ООО Рога и Копыта" and "Рога и Копыта" normalize identically.
pub fn normalize_name(name: &str) -> String {
    let lower = name.to_lowercase();
    lower
        .split_whitespace()
        .filter(|token| {
            let bare = token.trim_matches(|c| QUOTE_CHARS.contains(&c));
            !LEGAL_SUFFIXES.contains(&bare)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Content-derived company id: a pure function of the normalized name.
pub fn company_id(name: &str) -> String {
    content_id(&normalize_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_suffix_variants_collide() {
        assert_eq!(company_id("ООО Рога и Копыта"), company_id("Рога и Копыта"));
        assert_eq!(company_id("ООО Альфа"), company_id("Альфа"));
        assert_eq!(company_id("ЗАО Альфа"), company_id("альфа"));
        assert_eq!(company_id("Синица АО"), company_id("Синица"));
    }

    #[test]
    fn test_quoted_suffix_is_still_stripped() {
        assert_eq!(company_id("«АО» Вектор"), company_id("Вектор"));
    }

    #[test]
    fn test_suffix_inside_word_is_kept() {
        // Token-level removal only: "Заозерье" starts with "зао" but is a name.
        assert_ne!(normalize_name("Заозерье"), "");
        assert_eq!(normalize_name("Заозерье"), "заозерье");
    }

    #[test]
    fn test_different_companies_do_not_collide() {
        assert_ne!(company_id("Альфа"), company_id("Бета"));
    }

    #[test]
    fn test_normalization_trims_and_lowercases() {
        assert_eq!(normalize_name("  ООО   Рога   и   Копыта  "), "рога и копыта");
    }
}
