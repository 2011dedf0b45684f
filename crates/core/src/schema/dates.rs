//! Date parsing for the accounting API's date encodings.

use chrono::{DateTime, FixedOffset, NaiveDate};

/// Parses a calendar date in any encoding the API emits.
///
/// Accepted forms:
/// - ISO dates: `2024-01-15`
/// - ISO date-times: `2024-01-15T00:00:00` (the date part is used)
/// - Epoch milliseconds with offset: `/Date(1705276800000+0000)/`
#[must_use]
pub fn parse_api_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Some(inner) = value
        .strip_prefix("/Date(")
        .and_then(|rest| rest.strip_suffix(")/"))
    {
        return parse_epoch_date(inner);
    }
    let date_part = value.get(..10)?;
    let rest = value.get(10..)?;
    if !rest.is_empty() && !rest.starts_with('T') {
        return None;
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn parse_epoch_date(inner: &str) -> Option<NaiveDate> {
    // Millis may carry a sign of their own, so look for the offset sign after it.
    let offset_at = inner
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '+' || *c == '-')
        .map(|(i, _)| i);

    let (millis, offset) = match offset_at {
        Some(i) => (&inner[..i], parse_offset(&inner[i..])?),
        None => (inner, FixedOffset::east_opt(0)?),
    };

    let millis: i64 = millis.parse().ok()?;
    let utc = DateTime::from_timestamp_millis(millis)?;
    Some(utc.with_timezone(&offset).date_naive())
}

fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let (sign, digits) = raw.split_at(1);
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    let seconds = hours * 3600 + minutes * 60;
    match sign {
        "+" => FixedOffset::east_opt(seconds),
        "-" => FixedOffset::west_opt(seconds),
        _ => None,
    }
}
