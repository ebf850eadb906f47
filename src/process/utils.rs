use once_cell::sync::Lazy;
use regex::Regex;

static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static DIGIT_GROUP_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]),([0-9])").unwrap());

/// Spellings spreadsheet exports use for an empty cell.
const NAN_LIKE: [&str; 4] = ["nan", "none", "n/a", "-"];

/// Trim whitespace and strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// True for empty text or one of the NaN spellings (case-insensitive).
/// Expects already-trimmed input.
pub fn is_nan_like(s: &str) -> bool {
    s.is_empty() || NAN_LIKE.iter().any(|n| s.eq_ignore_ascii_case(n))
}

/// Leftmost unsigned integer or decimal in `s`.
pub fn first_number(s: &str) -> Option<f64> {
    FIRST_NUMBER
        .find(s)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Collapse every whitespace run to one space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s, " ").trim().to_string()
}

/// Drop commas used as digit grouping ("12,000", "1,50,000"); any other
/// comma becomes a space.
pub fn normalize_commas(s: &str) -> String {
    // two passes: "1,2,3" overlaps, the first pass only sees every other comma
    let once = DIGIT_GROUP_COMMA.replace_all(s, "$1$2");
    let twice = DIGIT_GROUP_COMMA.replace_all(&once, "$1$2");
    twice.replace(',', " ")
}

/// Finite `f64` parse of trimmed text.
pub fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_like_is_case_insensitive() {
        for s in ["", "nan", "NaN", "None", "N/A", "n/a", "-"] {
            assert!(is_nan_like(s), "{s:?}");
        }
        assert!(!is_nan_like("0"));
        assert!(!is_nan_like("--"));
    }

    #[test]
    fn first_number_is_leftmost() {
        assert_eq!(first_number("about 1.5 or 2"), Some(1.5));
        assert_eq!(first_number("-7"), Some(7.0));
        assert_eq!(first_number("none here"), None);
    }

    #[test]
    fn commas_between_digits_are_grouping() {
        assert_eq!(normalize_commas("12,000"), "12000");
        assert_eq!(normalize_commas("1,50,000"), "150000");
        assert_eq!(normalize_commas("1,2,3"), "123");
        assert_eq!(normalize_commas("5 lakh,approx"), "5 lakh approx");
    }

    #[test]
    fn clean_str_strips_quotes() {
        assert_eq!(clean_str("  \" x \"  "), "x");
        assert_eq!(clean_str(" y "), "y");
    }

    #[test]
    fn parse_finite_rejects_infinities() {
        assert_eq!(parse_finite(" 12.0 "), Some(12.0));
        assert_eq!(parse_finite("inf"), None);
        assert_eq!(parse_finite("NaN"), None);
    }
}
