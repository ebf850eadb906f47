use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::process::parsed::Parsed;
use crate::process::utils::{clean_str, is_nan_like};

/// Four-digit years outside this are layout mismatches: chrono's `%Y` will
/// happily read "21" as year 21.
const MIN_YEAR: i32 = 1900;

/// Date-only layouts seen in spreadsheet exports, tried in order.
/// Month-first comes before day-first so "03/04/2022" reads as 4 March.
/// Two-digit-year layouts come last and map "21" to 2021.
const DATE_FORMATS: [&str; 16] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d.%m.%Y",
    "%m/%d/%y",
    "%d/%m/%y",
    "%d-%m-%y",
    "%d-%b-%y",
    "%d %b %y",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Best-effort calendar date; any time of day is dropped.
pub fn parse_date(raw: &str) -> Parsed<NaiveDate> {
    let s = clean_str(raw);
    if is_nan_like(&s) {
        return Parsed::Absent;
    }

    let plausible = |d: &NaiveDate| d.year() >= MIN_YEAR;
    let date = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&s, fmt).ok().filter(plausible))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(&s, fmt).ok())
                .map(|dt| dt.date())
                .filter(plausible)
        });

    date.into()
}
