//! Turns date/time fragments into an absolute start instant relative to a
//! reference instant.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use super::rules;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid time: {0}")]
    InvalidTime(String),
}

static NEXT_WEEKDAY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)next\s+({})",
        rules::alternation(rules::WEEKDAYS)
    ))
    .expect("Invalid regex")
});

static MONTH_NAME_DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})$").expect("Invalid regex")
});

static CLOCK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2})(?::(\d{2}))?\s*(am|pm)?").expect("Invalid regex")
});

const NUMERIC_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%m-%d-%Y", "%Y-%m-%d"];

/// Resolve optional date and time fragments against `reference`.
///
/// Returns `Ok(None)` when both fragments are absent. Relative dates keep the
/// reference clock time, literal calendar dates start at midnight, and a time
/// fragment that parses as `H(:MM)?(am|pm)?` replaces the clock time with
/// seconds zeroed. Time words such as "morning" leave the clock untouched.
///
/// "next <weekday>" adds `(target + 7 - today) % 7` days, so naming today's
/// weekday yields today rather than a week out.
pub fn resolve(
    date: Option<&str>,
    time: Option<&str>,
    reference: NaiveDateTime,
) -> Result<Option<NaiveDateTime>, ResolveError> {
    if date.is_none() && time.is_none() {
        return Ok(None);
    }

    let mut resolved = match date {
        Some(d) => resolve_date(d, reference)?,
        None => reference,
    };

    if let Some(t) = time {
        if let Some(clock) = parse_clock(t)? {
            resolved = resolved.date().and_time(clock);
        }
    }

    Ok(Some(resolved))
}

fn resolve_date(date: &str, reference: NaiveDateTime) -> Result<NaiveDateTime, ResolveError> {
    let normalized = date.trim().to_lowercase();

    match normalized.as_str() {
        "tomorrow" => return Ok(reference + Duration::days(1)),
        "today" | "tonight" => return Ok(reference),
        _ => {}
    }

    if let Some(caps) = NEXT_WEEKDAY_PATTERN.captures(&normalized) {
        let target = rules::WEEKDAYS
            .iter()
            .position(|d| *d == &caps[1])
            .ok_or_else(|| ResolveError::InvalidDate(date.to_string()))? as i64;
        let current = reference.weekday().num_days_from_sunday() as i64;
        let days = (target + 7 - current) % 7;
        return Ok(reference + Duration::days(days));
    }

    parse_calendar_date(&normalized)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ResolveError::InvalidDate(date.to_string()))
}

fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    if let Some(date) = NUMERIC_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(date);
    }

    let caps = MONTH_NAME_DATE_PATTERN.captures(s)?;
    let month = month_from_name(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_from_name(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let name = name.to_lowercase();
    let prefix = name.get(..3)?;
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|i| i as u32 + 1)
}

/// `Ok(None)` when the fragment has no clock shape at all.
fn parse_clock(time: &str) -> Result<Option<NaiveTime>, ResolveError> {
    let Some(caps) = CLOCK_PATTERN.captures(time) else {
        return Ok(None);
    };

    let invalid = || ResolveError::InvalidTime(time.to_string());

    let mut hours: u32 = caps[1].parse().map_err(|_| invalid())?;
    let minutes: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().map_err(|_| invalid())?,
        None => 0,
    };

    match caps.get(3).map(|m| m.as_str().to_lowercase()).as_deref() {
        Some("pm") if hours < 12 => hours += 12,
        Some("am") if hours == 12 => hours = 0,
        _ => {}
    }

    NaiveTime::from_hms_opt(hours, minutes, 0)
        .map(Some)
        .ok_or_else(invalid)
}
