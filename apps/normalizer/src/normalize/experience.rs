//! Experience-requirement parsing: free text in, `[min, max]` years out.

use once_cell::sync::Lazy;
use regex::Regex;

/// Open-ended "more than N years" phrases close at this ceiling.
const EXPERIENCE_CEILING: i32 = 10;

/// Converts free-text experience requirements into a closed `[min, max]`
/// range of years.
///
/// Recognized shapes (case-insensitive): "нет опыта" -> [0, 1];
/// "более N" -> [N, 10]; "от N до M" -> [N, M]. Everything else falls back
/// to [0, 10]; empty text means an unstated requirement and maps to [0, 1].
///
/// Digits are taken from the substring after/around the recognized anchor
/// words, never from a whole-string scan — "от 1 года до 3 лет" must not
/// fuse into 13.
pub fn normalize_experience(text: &str) -> [i32; 2] {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() || lower.contains("нет опыта") {
        return [0, 1];
    }

    if let Some(idx) = lower.find("более") {
        let tail = &lower[idx + "более".len()..];
        if let Some(n) = first_digit_run(tail) {
            return [n, EXPERIENCE_CEILING];
        }
        return [0, EXPERIENCE_CEILING];
    }

    if lower.contains("от") {
        if let Some(idx) = lower.find("до") {
            let (left, right) = lower.split_at(idx);
            let right = &right["до".len()..];
            if let (Some(min), Some(max)) = (first_digit_run(left), first_digit_run(right)) {
                return [min, max];
            }
        }
    }

    [0, EXPERIENCE_CEILING]
}

/// First contiguous run of ASCII digits in `s`, if any.
fn first_digit_run(s: &str) -> Option<i32> {
    let mut digits = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if !digits.is_empty() {
            break;
        }
    }
    digits.parse().ok()
}

static EXPERIENCE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"опыт[а-я\s]*(\d+)[\s-]*лет",
        r"от\s*(\d+)\s*лет",
        r"(\d+)[\s+-]*года?\s*опыт",
        r"experience[:\s]*(\d+)[\s-]*years?",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static experience pattern"))
    .collect()
});

/// Derives the experience-requirement text on the parser side: the source's
/// structured experience name when present, otherwise regex probes over the
/// description, otherwise "Не указан".
pub fn experience_text(description: &str, structured: Option<&str>) -> String {
    if let Some(name) = structured {
        if !name.is_empty() {
            return name.to_string();
        }
    }

    let lower = description.to_lowercase();
    for pattern in EXPERIENCE_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(&lower) {
            if let Some(years) = captures.get(1) {
                return format!("От {} лет", years.as_str());
            }
        }
    }

    "Не указан".to_string()
}
