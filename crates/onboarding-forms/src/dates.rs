//! Date normalization for stamped forms
//!
//! Every date printed on a template uses `MM/DD/YYYY`.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::FormError;

const DISPLAY_FORMAT: &str = "%m/%d/%Y";

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// What to do with a signature date that cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePolicy {
    #[default]
    Reject,
    FallbackToToday,
}

/// Parse RFC 3339, naive ISO date-times, `YYYY-MM-DD` and `MM/DD/YYYY`.
/// Zoned timestamps keep the calendar date of their own offset.
pub fn parse_flexible(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.date_naive());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return Some(date);
        }
    }
    None
}

pub fn format_us(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Signature date to print. Absent dates mean "signed today".
pub fn resolve_signature_date(
    raw: Option<&str>,
    policy: DatePolicy,
) -> Result<NaiveDate, FormError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(today()),
        Some(raw) => raw,
    };

    match (parse_flexible(raw), policy) {
        (Some(date), _) => Ok(date),
        (None, DatePolicy::FallbackToToday) => {
            tracing::warn!("Unparseable signature date {:?}, using today", raw);
            Ok(today())
        }
        (None, DatePolicy::Reject) => Err(FormError::InvalidDate(raw.to_string())),
    }
}

/// Display form of a free-text date such as a date of birth.
/// Unrecognized input is printed as given.
pub fn display_date(input: &str) -> String {
    match parse_flexible(input) {
        Some(date) => format_us(date),
        None => input.trim().to_string(),
    }
}
