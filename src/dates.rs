//! Release-date parsing for table cells and API timestamps.
//!
//! Document cells accumulate whatever date shapes past editors typed in, so
//! parsing runs through an explicit pattern list first and generic fallbacks
//! second. Failures return `None`; the caller excludes the row from
//! reconciliation instead of erroring.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Explicit day/month/year patterns, tried in order.
///
/// Day-first patterns come before month-first ones: a bare numeric date with
/// both components <= 12 (e.g. "03/04/2024") resolves day-first. That
/// precedence is a known ambiguity kept deterministic for compatibility with
/// documents written under the old behavior.
///
/// Within each family the 2-digit-year pattern is listed first: chrono's %Y
/// accepts 1-4 digit years, so "01/02/24" would otherwise parse as the
/// literal year 24. %y rejects 4-digit input, so the order is safe both ways.
pub const DEFAULT_DATE_PATTERNS: &[&str] =
    &["%d/%m/%y", "%d/%m/%Y", "%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d"];

const DATETIME_PATTERNS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

const TEXTUAL_PATTERNS: &[&str] = &["%d %b %Y", "%d %B %Y", "%b %d, %Y", "%B %d, %Y"];

/// Parse a raw date string into a canonical UTC instant.
///
/// Returns `None` when no pattern matches or the result is not a valid
/// calendar date (e.g. "31/02/2024"). Never panics.
pub fn parse_release_date(raw: &str) -> Option<DateTime<Utc>> {
    parse_with_patterns(raw, DEFAULT_DATE_PATTERNS)
}

/// Parse with a caller-supplied explicit pattern list, then the generic
/// fallbacks (RFC 3339, RFC 2822, bare datetime, textual month forms).
pub fn parse_with_patterns(raw: &str, patterns: &[&str]) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for pattern in patterns {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, pattern) {
            return Some(at_midnight(date));
        }
    }

    // API timestamps are RFC 3339 ("2024-03-01T12:00:00Z")
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    for pattern in DATETIME_PATTERNS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    for pattern in TEXTUAL_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, pattern) {
            return Some(at_midnight(date));
        }
    }

    None
}

fn at_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}
