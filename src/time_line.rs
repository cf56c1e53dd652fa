use once_cell::sync::Lazy;
use regex::Regex;
use log::warn;
use crate::errors::ShiftError;
use crate::timestamp::Timestamp;

// @module: Time line classification and shifting

/// Literal text joining the two timestamps of a time line
pub const TIME_LINE_SEPARATOR: &str = " --> ";

// @const: Whole-line "HH:MM:SS,mmm --> HH:MM:SS,mmm" pattern
static TIME_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3} --> [0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3}$").unwrap()
});

/// What to do when a shift moves a timestamp before zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativeTimePolicy {
    /// Pin the timestamp at 00:00:00,000
    #[default]
    Clamp,
    /// Fail the whole shift
    Reject,
}

/// Returns true if the line has exactly the form `hh:mm:ss,xxx --> hh:mm:ss,xxx`.
///
/// Leading or trailing whitespace, a different arrow, or a single timestamp
/// all make the line a content line.
pub fn is_time_line(line: &str) -> bool {
    TIME_LINE_REGEX.is_match(line)
}

/// A parsed time line: display interval of one caption
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeLine {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeLine {
    /// Parse a line already recognized by [`is_time_line`]
    pub fn parse(line: &str) -> Result<Self, ShiftError> {
        let (start, end) = line
            .split_once(TIME_LINE_SEPARATOR)
            .ok_or_else(|| ShiftError::InvalidTimestampFormat(line.to_string()))?;

        Ok(Self {
            start: Timestamp::parse(start)?,
            end: Timestamp::parse(end)?,
        })
    }

    /// Shift both ends by the same delta
    pub fn shift(&self, delta_ms: i64, policy: NegativeTimePolicy) -> Result<Self, ShiftError> {
        Ok(Self {
            start: shift_timestamp(&self.start, delta_ms, policy)?,
            end: shift_timestamp(&self.end, delta_ms, policy)?,
        })
    }

    /// Re-join both timestamps with the original separator
    pub fn format(&self) -> String {
        format!("{}{}{}", self.start, TIME_LINE_SEPARATOR, self.end)
    }
}

fn shift_timestamp(timestamp: &Timestamp, delta_ms: i64, policy: NegativeTimePolicy) -> Result<Timestamp, ShiftError> {
    match timestamp.checked_shift(delta_ms) {
        Some(shifted) => Ok(shifted),
        None => match policy {
            NegativeTimePolicy::Clamp => {
                warn!("Timestamp {} shifted by {} ms clamped to 00:00:00,000", timestamp, delta_ms);
                Ok(timestamp.shift(delta_ms))
            }
            NegativeTimePolicy::Reject => Err(ShiftError::NegativeTimestamp {
                timestamp: timestamp.to_string(),
                delta: delta_ms,
            }),
        },
    }
}

/// Returns the "time line" after applying the timeshift on both timestamps
pub fn shift_time_line(line: &str, delta_ms: i64, policy: NegativeTimePolicy) -> Result<String, ShiftError> {
    Ok(TimeLine::parse(line)?.shift(delta_ms, policy)?.format())
}
