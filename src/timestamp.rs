use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use once_cell::sync::Lazy;
use regex::Regex;
use log::error;
use crate::errors::ShiftError;

// @module: SRT timestamp value type

const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_SECOND: i64 = 1_000;

// @const: Anchored HH:MM:SS,mmm pattern (ASCII digits only)
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3}$").unwrap()
});

/// A single subtitle time point.
///
/// Values are never mutated: every arithmetic operation rebuilds all four
/// fields from the resulting millisecond total, so `to_milliseconds()` always
/// equals `hours * 3600000 + minutes * 60000 + seconds * 1000 + millis`.
///
/// # Equality
///
/// `==`, ordering and hashing compare that total, not the fields. A parsed
/// value keeps its fields as written, so two equal timestamps may format
/// differently:
///
/// ```
/// use subshift::Timestamp;
///
/// let written: Timestamp = "00:75:00,000".parse().unwrap();
/// let canonical: Timestamp = "01:15:00,000".parse().unwrap();
/// assert_eq!(written, canonical);
/// assert_ne!(written.format(), canonical.format());
/// assert_eq!(written.shift(0).format(), "01:15:00,000");
/// ```
///
/// Compare `format()` output when the exact text matters.
#[derive(Debug, Clone, Copy)]
pub struct Timestamp {
    hours: u64,
    minutes: u32,
    seconds: u32,
    millis: u32,
}

impl Timestamp {
    /// Parse a timestamp of the exact form `HH:MM:SS,mmm`
    pub fn parse(text: &str) -> Result<Self, ShiftError> {
        if !TIMESTAMP_REGEX.is_match(text) {
            error!("Invalid timestamp encountered: {}", text);
            return Err(ShiftError::InvalidTimestampFormat(text.to_string()));
        }

        // The pattern guarantees the separators and the digit counts
        let (clock, millis) = text
            .split_once(',')
            .ok_or_else(|| ShiftError::InvalidTimestampFormat(text.to_string()))?;
        let mut parts = clock.split(':');
        let mut next_field = || -> Result<u32, ShiftError> {
            parts
                .next()
                .and_then(|part| part.parse::<u32>().ok())
                .ok_or_else(|| ShiftError::InvalidTimestampFormat(text.to_string()))
        };

        let hours = next_field()?;
        let minutes = next_field()?;
        let seconds = next_field()?;
        let millis = millis
            .parse::<u32>()
            .map_err(|_| ShiftError::InvalidTimestampFormat(text.to_string()))?;

        // Fields are kept as written ("00:75:00,000" formats back unchanged)
        Ok(Self {
            hours: u64::from(hours),
            minutes,
            seconds,
            millis,
        })
    }

    /// Build a timestamp from a millisecond total.
    ///
    /// Negative totals are clamped to `00:00:00,000`.
    pub fn from_milliseconds(total: i64) -> Self {
        let mut remaining = total.max(0);

        let hours = remaining / MS_PER_HOUR;
        remaining %= MS_PER_HOUR;

        let minutes = remaining / MS_PER_MINUTE;
        remaining %= MS_PER_MINUTE;

        let seconds = remaining / MS_PER_SECOND;
        let millis = remaining % MS_PER_SECOND;

        Self {
            hours: hours as u64,
            minutes: minutes as u32,
            seconds: seconds as u32,
            millis: millis as u32,
        }
    }

    /// Total number of milliseconds since 00:00:00,000
    pub fn to_milliseconds(&self) -> i64 {
        self.hours as i64 * MS_PER_HOUR
            + i64::from(self.minutes) * MS_PER_MINUTE
            + i64::from(self.seconds) * MS_PER_SECOND
            + i64::from(self.millis)
    }

    /// Shift by a signed delta, clamping at zero
    pub fn shift(&self, delta_ms: i64) -> Self {
        Self::from_milliseconds(self.to_milliseconds().saturating_add(delta_ms))
    }

    /// Shift by a signed delta, or `None` if the result would be negative
    pub fn checked_shift(&self, delta_ms: i64) -> Option<Self> {
        let total = self.to_milliseconds().saturating_add(delta_ms);
        if total < 0 {
            None
        } else {
            Some(Self::from_milliseconds(total))
        }
    }

    /// Canonical `HH:MM:SS,mmm` text; hours wider than two digits are kept whole
    pub fn format(&self) -> String {
        self.to_string()
    }

    pub fn hours(&self) -> u64 {
        self.hours
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn millis(&self) -> u32 {
        self.millis
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02},{:03}",
            self.hours, self.minutes, self.seconds, self.millis
        )
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.to_milliseconds() == other.to_milliseconds()
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_milliseconds().cmp(&other.to_milliseconds())
    }
}

impl Hash for Timestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_milliseconds().hash(state);
    }
}

impl FromStr for Timestamp {
    type Err = ShiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
