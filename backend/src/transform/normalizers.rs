//! Field normalizers.
//!
//! Pure, total conversions from raw JSON scalars to canonical Darwin Core
//! values. None of these fail: an unusable input yields `None` and the
//! field is exported empty.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Datum written when the source does not declare one.
pub const DEFAULT_DATUM: &str = "WGS84";

/// Datum declarations that are rewritten to [`DEFAULT_DATUM`].
const WGS84_ALIASES: [&str; 2] = ["WGS84", "EPSG:4326"];

/// How a matched date pattern is interpreted.
#[derive(Debug, Clone, Copy)]
enum DatePattern {
    /// Timestamp carrying an explicit offset.
    Offset(&'static str),
    /// Timestamp without offset, read as UTC.
    Naive(&'static str),
    /// Calendar date only.
    Date(&'static str),
}

/// Attempted in order; the first successful parse wins.
const DATE_PATTERNS: [DatePattern; 6] = [
    DatePattern::Offset("%Y-%m-%dT%H:%M:%S%.f%z"),
    DatePattern::Offset("%Y-%m-%dT%H:%M:%S%z"),
    DatePattern::Naive("%Y-%m-%dT%H:%M:%S%.f"),
    DatePattern::Naive("%Y-%m-%dT%H:%M:%S"),
    DatePattern::Date("%Y-%m-%d"),
    DatePattern::Date("%Y/%m/%d"),
];

/// Ten characters with hyphens at positions 5 and 8.
static DATE_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^.{4}-.{2}-.{2}$").expect("date shape pattern is valid")
});

// =============================================================================
// Value helpers
// =============================================================================

/// Whether a raw value counts as supplied.
///
/// Null, empty strings and empty lists/mappings are treated as absent.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// First supplied value among `keys`, scanned left to right.
pub fn first_present<'a>(raw: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| raw.get(*key))
        .find(|value| is_present(value))
}

/// Text form of a scalar. Lists, mappings and null have none.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Render a value for a CSV cell or an identifier seed.
///
/// Null is empty, strings are verbatim, everything else is compact JSON
/// (numbers and booleans therefore keep their JSON spelling).
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Dates
// =============================================================================

/// Convert a date of unknown origin to ISO-8601.
///
/// - Timestamps keep their offset; a zero offset is written `Z`.
/// - Timestamps without offset are read as UTC and suffixed with `Z`.
/// - Calendar dates (`2024-03-15`, `2024/03/15`) come out as `YYYY-MM-DD`.
/// - Anything already shaped like `YYYY-MM-DD` is passed through verbatim.
///
/// # Example
/// ```
/// use serde_json::json;
/// use dwcexport::transform::normalizers::to_iso_date;
///
/// assert_eq!(to_iso_date(&json!("2024-03-15T10:00:00")).as_deref(), Some("2024-03-15T10:00:00Z"));
/// assert_eq!(to_iso_date(&json!("15 March")), None);
/// ```
pub fn to_iso_date(value: &Value) -> Option<String> {
    if !is_present(value) {
        return None;
    }
    let text = as_text(value)?;
    let s = text.trim();

    // chrono's %z has no `Z` spelling
    let with_offset = match s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        Some(stripped) => format!("{stripped}+00:00"),
        None => s.to_string(),
    };

    for pattern in DATE_PATTERNS {
        let parsed = match pattern {
            DatePattern::Offset(fmt) => DateTime::parse_from_str(&with_offset, fmt)
                .ok()
                .map(format_timestamp),
            DatePattern::Naive(fmt) => NaiveDateTime::parse_from_str(s, fmt)
                .ok()
                .map(|naive| format_timestamp(naive.and_utc().fixed_offset())),
            DatePattern::Date(fmt) => NaiveDate::parse_from_str(s, fmt)
                .ok()
                .map(|date| date.format("%Y-%m-%d").to_string()),
        };
        if parsed.is_some() {
            return parsed;
        }
    }

    if DATE_SHAPE.is_match(s) {
        return Some(s.to_string());
    }
    None
}

/// `YYYY-MM-DDTHH:MM:SS[.ffffff](Z|±HH:MM)`
fn format_timestamp(dt: DateTime<FixedOffset>) -> String {
    let mut out = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
    let micros = dt.nanosecond() / 1_000;
    if micros != 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    if dt.offset().local_minus_utc() == 0 {
        out.push('Z');
    } else {
        out.push_str(&dt.format("%:z").to_string());
    }
    out
}

/// Split an ISO date into `(year, month, day)` by fixed offsets.
///
/// All three parts must parse or nothing is returned.
pub fn split_ymd(iso: &str) -> Option<(i64, i64, i64)> {
    if iso.chars().count() < 10 {
        return None;
    }
    let year = iso.get(0..4)?.parse().ok()?;
    let month = iso.get(5..7)?.parse().ok()?;
    let day = iso.get(8..10)?.parse().ok()?;
    Some((year, month, day))
}

// =============================================================================
// Numbers, country codes, datum
// =============================================================================

/// Parse a decimal number from a number or numeric string.
///
/// Non-finite results are rejected along with everything unparseable.
pub fn to_float(value: &Value) -> Option<f64> {
    as_text(value)?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
}

/// Upper-case and trim a country code. No name-to-code lookup is done.
pub fn normalize_country_code(value: &Value) -> Option<String> {
    if !is_present(value) {
        return None;
    }
    let code = as_text(value)?.trim().to_uppercase();
    (!code.is_empty()).then_some(code)
}

/// Resolve the geodetic datum.
///
/// Missing → `WGS84`; `WGS84`/`EPSG:4326` in any case → `WGS84`;
/// any other declaration is kept unchanged.
pub fn ensure_wgs84(value: Option<&Value>) -> String {
    let declared = match value.filter(|v| is_present(v)) {
        Some(v) => cell_text(v),
        None => return DEFAULT_DATUM.to_string(),
    };
    let key = declared.trim().to_uppercase();
    if WGS84_ALIASES.contains(&key.as_str()) {
        DEFAULT_DATUM.to_string()
    } else {
        declared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn iso(value: Value) -> Option<String> {
        to_iso_date(&value)
    }

    #[test]
    fn test_date_only_round_trip() {
        assert_eq!(iso(json!("2024-03-15")).as_deref(), Some("2024-03-15"));
        assert_eq!(iso(json!("  2024-03-15 ")).as_deref(), Some("2024-03-15"));
    }

    #[test]
    fn test_slash_date() {
        assert_eq!(iso(json!("2024/03/15")).as_deref(), Some("2024-03-15"));
    }

    #[test]
    fn test_naive_timestamp_gets_utc_suffix() {
        assert_eq!(iso(json!("2024-03-15T10:00:00")).as_deref(), Some("2024-03-15T10:00:00Z"));
        assert_eq!(
            iso(json!("2025-07-19T10:04:29.250")).as_deref(),
            Some("2025-07-19T10:04:29.250000Z")
        );
    }

    #[test]
    fn test_offset_is_preserved() {
        assert_eq!(
            iso(json!("2024-03-15T10:00:00+04:00")).as_deref(),
            Some("2024-03-15T10:00:00+04:00")
        );
        assert_eq!(
            iso(json!("2024-03-15T10:00:00-0300")).as_deref(),
            Some("2024-03-15T10:00:00-03:00")
        );
        assert_eq!(
            iso(json!("2024-03-15T10:00:00.123+04:00")).as_deref(),
            Some("2024-03-15T10:00:00.123000+04:00")
        );
    }

    #[test]
    fn test_zero_offset_written_as_z() {
        assert_eq!(iso(json!("2024-03-15T10:00:00+00:00")).as_deref(), Some("2024-03-15T10:00:00Z"));
        assert_eq!(iso(json!("2024-03-15T10:00:00Z")).as_deref(), Some("2024-03-15T10:00:00Z"));
    }

    #[test]
    fn test_date_shape_passthrough() {
        // impossible calendar date, but shaped like one
        assert_eq!(iso(json!("2024-02-30")).as_deref(), Some("2024-02-30"));
        assert_eq!(iso(json!("2024-XX-01")).as_deref(), Some("2024-XX-01"));
    }

    #[test]
    fn test_unparseable_dates_are_absent() {
        assert_eq!(iso(json!("15/03/2024")), None);
        assert_eq!(iso(json!("")), None);
        assert_eq!(iso(Value::Null), None);
        assert_eq!(iso(json!(20240315)), None);
        assert_eq!(iso(json!(["2024-03-15"])), None);
    }

    #[test]
    fn test_split_ymd() {
        assert_eq!(split_ymd("2024-03-15"), Some((2024, 3, 15)));
        assert_eq!(split_ymd("2024-03-15T10:00:00Z"), Some((2024, 3, 15)));
        assert_eq!(split_ymd("2024-XX-01"), None);
        assert_eq!(split_ymd("2024-03"), None);
    }

    #[test]
    fn test_to_float() {
        assert_eq!(to_float(&json!(-20.9)), Some(-20.9));
        assert_eq!(to_float(&json!(" 55.3 ")), Some(55.3));
        assert_eq!(to_float(&json!("1e3")), Some(1000.0));
        assert_eq!(to_float(&json!("")), None);
        assert_eq!(to_float(&json!("north")), None);
        assert_eq!(to_float(&json!("NaN")), None);
        assert_eq!(to_float(&json!(true)), None);
        assert_eq!(to_float(&Value::Null), None);
    }

    #[test]
    fn test_country_code() {
        assert_eq!(normalize_country_code(&json!(" re ")).as_deref(), Some("RE"));
        assert_eq!(normalize_country_code(&json!("France")).as_deref(), Some("FRANCE"));
        assert_eq!(normalize_country_code(&json!("")), None);
        assert_eq!(normalize_country_code(&json!("   ")), None);
        assert_eq!(normalize_country_code(&Value::Null), None);
    }

    #[test]
    fn test_datum() {
        assert_eq!(ensure_wgs84(None), "WGS84");
        assert_eq!(ensure_wgs84(Some(&json!(""))), "WGS84");
        assert_eq!(ensure_wgs84(Some(&json!("EPSG:4326"))), "WGS84");
        assert_eq!(ensure_wgs84(Some(&json!("epsg:4326"))), "WGS84");
        assert_eq!(ensure_wgs84(Some(&json!("wgs84 "))), "WGS84");
        assert_eq!(ensure_wgs84(Some(&json!("NAD83"))), "NAD83");
        assert_eq!(ensure_wgs84(Some(&json!(" nad83 "))), " nad83 ");
    }

    #[test]
    fn test_first_present_skips_empty() {
        let raw = json!({"recordedBy": "", "observer": "J. Dupont"});
        let raw = raw.as_object().unwrap();
        assert_eq!(first_present(raw, &["recordedBy", "observer"]), Some(&json!("J. Dupont")));
        assert_eq!(first_present(raw, &["missing"]), None);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Value::Null), "");
        assert_eq!(cell_text(&json!("Iris japonica")), "Iris japonica");
        assert_eq!(cell_text(&json!(55.0)), "55.0");
        assert_eq!(cell_text(&json!(2024)), "2024");
        assert_eq!(cell_text(&json!(false)), "false");
        assert_eq!(cell_text(&json!({"url": "x"})), r#"{"url":"x"}"#);
    }
}
