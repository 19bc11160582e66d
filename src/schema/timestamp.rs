//! Timestamp collaborator
//!
//! The only place calendar semantics enter the engine. Parsing accepts the
//! common human-readable shapes:
//!
//! - RFC 3339 / ISO 8601, `T` or space separated, `Z`, `+hh:mm` or `+hhmm`
//! - RFC 2822 with or without a time part (`Mon, 22 Jun 2015 22:26:00 +0100`)
//! - plain dates (`1983-05-11`)
//!
//! Values without an offset are taken as UTC. A leading weekday name is
//! skipped, not cross-checked against the date.

use std::fmt;

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, SecondsFormat,
    SubsecRound, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%d %b %Y %H:%M:%S%.f %z",
    "%d %b %Y %H:%M %z",
];

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d %b %Y"];

/// Errors from the timestamp collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("empty timestamp")]
    Empty,

    #[error("unrecognized timestamp {0:?}")]
    Unrecognized(String),
}

/// Output shape used when a timestamp is rendered into the value tree.
///
/// `Iso8601` and `Rfc2822` keep the full instant, fractional seconds
/// included. `Rfc2822Date` and `IsoDate` keep only the calendar date in the
/// instant's own offset; parsing them back yields midnight UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// `1983-05-11T19:35:45+01:00`
    #[default]
    Iso8601,
    /// `Wed, 11 May 1983 19:35:45 +0100`, `.250` before the offset when
    /// the instant has fractional seconds
    Rfc2822,
    /// `Wed, 11 May 1983` (lossy)
    Rfc2822Date,
    /// `1983-05-11` (lossy)
    IsoDate,
}

impl TimestampFormat {
    /// Whether rendering then parsing gives back the same instant
    pub fn is_lossless(&self) -> bool {
        matches!(self, TimestampFormat::Iso8601 | TimestampFormat::Rfc2822)
    }

    /// Returns the format name used in messages and configuration
    pub fn name(&self) -> &'static str {
        match self {
            TimestampFormat::Iso8601 => "iso8601",
            TimestampFormat::Rfc2822 => "rfc2822",
            TimestampFormat::Rfc2822Date => "rfc2822_date",
            TimestampFormat::IsoDate => "iso_date",
        }
    }
}

/// Parses a human-readable date-time string.
pub fn parse_timestamp(text: &str) -> Result<DateTime<FixedOffset>, TimestampError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TimestampError::Empty);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt);
    }

    let body = strip_weekday(text);

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(body, fmt) {
            return Ok(dt);
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(body, fmt) {
            return Ok(Utc.fix().from_utc_datetime(&naive));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(body, fmt) {
            return Ok(Utc.fix().from_utc_datetime(&date.and_time(NaiveTime::MIN)));
        }
    }

    Err(TimestampError::Unrecognized(text.to_string()))
}

/// Renders an instant in the given format.
pub fn format_instant(instant: &DateTime<FixedOffset>, format: TimestampFormat) -> String {
    match format {
        TimestampFormat::Iso8601 => instant.to_rfc3339_opts(SecondsFormat::AutoSi, false),
        TimestampFormat::Rfc2822 => instant.format("%a, %d %b %Y %H:%M:%S%.f %z").to_string(),
        TimestampFormat::Rfc2822Date => instant.format("%a, %d %b %Y").to_string(),
        TimestampFormat::IsoDate => instant.format("%Y-%m-%d").to_string(),
    }
}

/// `Mon, 22 Jun 2015` -> `22 Jun 2015`
fn strip_weekday(text: &str) -> &str {
    match text.split_once(',') {
        Some((head, rest)) if !head.is_empty() && head.chars().all(|c| c.is_ascii_alphabetic()) => {
            rest.trim_start()
        }
        _ => text,
    }
}

/// An instant plus the format it renders with.
///
/// Equality compares instants only.
#[derive(Debug, Clone, Copy)]
pub struct Timestamp {
    instant: DateTime<FixedOffset>,
    format: TimestampFormat,
}

impl Timestamp {
    /// Wraps an instant, rendering as ISO 8601
    pub fn new(instant: DateTime<FixedOffset>) -> Self {
        Self {
            instant,
            format: TimestampFormat::default(),
        }
    }

    /// Parses text through [`parse_timestamp`]
    pub fn parse(text: &str) -> Result<Self, TimestampError> {
        parse_timestamp(text).map(Self::new)
    }

    /// Current UTC time truncated to the second
    pub fn now() -> Self {
        Self::new(Utc::now().trunc_subsecs(0).with_timezone(&Utc.fix()))
    }

    /// Start of the current UTC day
    pub fn today() -> Self {
        let midnight = Utc::now().date_naive().and_time(NaiveTime::MIN);
        Self::new(Utc.fix().from_utc_datetime(&midnight))
    }

    /// Returns a copy rendering with `format`
    pub fn with_format(mut self, format: TimestampFormat) -> Self {
        self.format = format;
        self
    }

    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.instant
    }

    pub fn format(&self) -> TimestampFormat {
        self.format
    }

    /// Renders the instant in this timestamp's format
    pub fn to_text(&self) -> String {
        format_instant(&self.instant, self.format)
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}
