//! Normalisation of raw metadata values into [`PhotoMetadata`].
//!
//! Extractors hand back loosely typed values: exiftool reports `Keywords` as
//! a string when a photo has one keyword and as an array when it has several,
//! numeric-looking keywords come back as JSON numbers, and dates use the EXIF
//! `YYYY:MM:DD HH:MM:SS` form. This module turns all of that into the small,
//! strictly typed [`PhotoMetadata`] the rest of the pipeline works with.
//!
//! ## Rules
//!
//! - **Text fields** (city, state, date): strings and numbers are accepted,
//!   trimmed, and dropped when empty.
//! - **Keywords**: a single value or an array; `null` entries are skipped,
//!   every entry is trimmed, empty entries are dropped, and repeated keywords
//!   keep only their first occurrence.
//! - **Dates**: EXIF, IPTC (`YYYYMMDD`) and ISO dates are re-rendered with the
//!   configured strftime pattern. Anything else is shown verbatim, except the
//!   all-zero placeholder cameras write when the clock was never set.

use crate::config::ExtractorConfig;
use crate::types::PhotoMetadata;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use std::fmt::Write;

/// Trim a string and drop it if nothing is left.
pub fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Read a scalar JSON value as display text.
///
/// Strings and numbers qualify; `null`, booleans, arrays and objects do not.
pub fn text_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => clean(Some(s)),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a keyword field that may hold one value or a list of values.
pub fn keyword_list(value: Option<&Value>) -> Vec<String> {
    let raw: Vec<String> = match value {
        Some(Value::Array(items)) => items.iter().filter_map(|v| text_value(Some(v))).collect(),
        Some(other) => text_value(Some(other)).into_iter().collect(),
        None => Vec::new(),
    };
    dedupe_keywords(raw)
}

/// Trim keywords, drop empty ones, and keep only the first occurrence of
/// each. Comparison is exact: `Berlin` and `berlin` are different tags.
pub fn dedupe_keywords<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    keywords
        .into_iter()
        .filter_map(|k| clean(Some(k.as_ref())))
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

/// Parse the date layouts photo metadata actually uses.
///
/// - EXIF: `2023:05:01 14:03:22`, optionally followed by sub-seconds or an
///   offset, which are ignored
/// - EXIF date only: `2023:05:01`
/// - IPTC DateCreated: `20230501`
/// - ISO: `2023-05-01`, `2023-05-01T14:03:22`
fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    if let Some(head) = raw.get(..19) {
        for fmt in ["%Y:%m:%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(head, fmt) {
                return Some(dt);
            }
        }
    }
    let date = match raw.len() {
        8 => NaiveDate::parse_from_str(raw, "%Y%m%d").ok(),
        10 => NaiveDate::parse_from_str(raw, "%Y:%m:%d")
            .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .ok(),
        _ => None,
    }?;
    date.and_hms_opt(0, 0, 0)
}

/// Render a raw capture date for display.
///
/// Returns `None` for empty values and the all-zero placeholder. Dates that
/// don't parse, or that the pattern can't render, come back unchanged.
pub fn format_date(raw: &str, pattern: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("0000") {
        return None;
    }
    let Some(dt) = parse_date(raw) else {
        return Some(raw.to_string());
    };
    let mut out = String::new();
    if write!(out, "{}", dt.format(pattern)).is_err() {
        return Some(raw.to_string());
    }
    Some(out)
}

/// Build [`PhotoMetadata`] from one exiftool JSON object, reading the field
/// names configured in `[extractor]`.
pub fn from_exiftool_fields(
    fields: &Map<String, Value>,
    config: &ExtractorConfig,
    date_format: &str,
) -> PhotoMetadata {
    PhotoMetadata {
        keywords: keyword_list(fields.get(&config.keywords_field)),
        city: text_value(fields.get(&config.city_field)),
        state: text_value(fields.get(&config.state_field)),
        date: text_value(fields.get(&config.date_field))
            .and_then(|d| format_date(&d, date_format)),
    }
}
