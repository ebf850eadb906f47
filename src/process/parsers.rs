// src/process/parsers.rs

//! Cell-level parsers. None of these fail: a cell that cannot be read comes
//! back as [`Parsed::Absent`] (or `0` for flags).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::process::parsed::Parsed;
use crate::process::utils::{
    collapse_whitespace, first_number, is_nan_like, normalize_commas, parse_finite,
};

pub const CRORE: f64 = 10_000_000.0;
pub const LAKH: f64 = 100_000.0;
pub const THOUSAND: f64 = 1_000.0;

/// Stripped from amounts, in this order, after lower-casing.
const CURRENCY_TOKENS: [&str; 4] = ["₹", "inr", "rs.", "rs"];

/// "cr" not glued to another letter: matches "1.5cr", "2 cr", not "crisp".
static CR_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|[^a-z])cr(?:[^a-z]|$)").unwrap());
static K_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bk\b").unwrap());

/// Monetary text → rupees.
///
/// `"₹12,000"` → 12000, `"1.5 Crore"` → 15000000, `"2 lakh"` → 200000,
/// `"5k"` → 5000. Only the first number in the cell is read, and only one
/// unit multiplier is applied (crore, then lakh, then thousand).
pub fn parse_amount(raw: &str) -> Parsed<f64> {
    let s = raw.trim();
    if is_nan_like(s) {
        return Parsed::Absent;
    }

    let mut low = s.to_lowercase();
    for token in CURRENCY_TOKENS {
        low = low.replace(token, " ");
    }
    let low = collapse_whitespace(&normalize_commas(&low));

    let Some(num) = first_number(&low) else {
        return Parsed::Absent;
    };

    Parsed::Present(num * unit_multiplier(&low))
}

fn unit_multiplier(low: &str) -> f64 {
    if low.contains("crore") || CR_TOKEN.is_match(low) {
        CRORE
    } else if low.contains("lakh") || low.contains("lac") {
        LAKH
    } else if K_TOKEN.is_match(low) || low.ends_with('k') {
        THOUSAND
    } else {
        1.0
    }
}

/// Percentage text → face value (`"12.5%"` → 12.5, not 0.125).
pub fn parse_percent(raw: &str) -> Parsed<f64> {
    let s = raw.trim();
    if is_nan_like(s) {
        return Parsed::Absent;
    }
    let s = s.replace(['%', ','], "");
    let s = s.trim();
    parse_finite(s).or_else(|| first_number(s)).into()
}

/// Integer count; tolerates "12.0" and truncates toward zero.
pub fn parse_int(raw: &str) -> Parsed<i64> {
    parse_finite(raw)
        .filter(|v| *v >= i64::MIN as f64 && *v < i64::MAX as f64)
        .map(|v| v.trunc() as i64)
        .into()
}

/// Yes/no flag. Never absent: anything unrecognised is `0`.
pub fn parse_bool(raw: &str) -> u8 {
    let s = raw.trim().to_lowercase();
    match s.as_str() {
        "yes" | "true" | "1" | "y" | "t" => 1,
        _ => 0,
    }
}

/// Plain float for non-monetary measures such as average age.
pub fn parse_float_or_nan(raw: &str) -> Parsed<f64> {
    parse_finite(raw).into()
}
