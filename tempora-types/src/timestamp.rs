use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MICROS_PER_SECOND: i64 = 1_000_000;

/// A point in time with microsecond resolution, always in UTC.
///
/// Timestamps are stored as the number of microseconds since the Unix epoch,
/// which makes them cheap to copy, compare and subtract.
///
/// # Examples
///
/// ```
/// use tempora_types::Timestamp;
///
/// let t: Timestamp = "2000-01-01 08:00:00+00".parse().unwrap();
/// assert_eq!(t.to_string(), "2000-01-01 08:00:00+00");
///
/// let later = t.add_micros(1_500_000);
/// assert_eq!(later.to_string(), "2000-01-01 08:00:01.5+00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a timestamp from microseconds since the Unix epoch.
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Create a timestamp from whole seconds since the Unix epoch.
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs * MICROS_PER_SECOND)
    }

    /// Microseconds since the Unix epoch.
    pub const fn micros(self) -> i64 {
        self.0
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_micros())
    }

    /// Convert to a chrono datetime, or `None` when outside chrono's range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_micros(self.0)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Shift by a (possibly negative) number of microseconds, saturating at the
    /// representable range.
    pub const fn add_micros(self, delta: i64) -> Self {
        Self(self.0.saturating_add(delta))
    }

    /// Signed distance `self - other` in microseconds.
    pub const fn micros_since(self, other: Timestamp) -> i64 {
        self.0 - other.0
    }

    /// Timestamp at `fraction` of the way from `self` to `end`, rounded to the
    /// nearest microsecond.
    ///
    /// # Examples
    ///
    /// ```
    /// use tempora_types::Timestamp;
    ///
    /// let t1 = Timestamp::from_secs(0);
    /// let t2 = Timestamp::from_secs(10);
    /// assert_eq!(t1.interpolate(t2, 0.5), Timestamp::from_secs(5));
    /// ```
    pub fn interpolate(self, end: Timestamp, fraction: f64) -> Self {
        let span = (end.0 - self.0) as f64;
        Self(self.0 + (span * fraction).round() as i64)
    }

    /// Fraction of the way `self` lies between `start` and `end`.
    pub fn fraction_between(self, start: Timestamp, end: Timestamp) -> f64 {
        let span = end.0 - start.0;
        if span == 0 {
            return 0.0;
        }
        (self.0 - start.0) as f64 / span as f64
    }

    /// Parse the textual forms accepted by [`FromStr`].
    ///
    /// Accepted inputs are `YYYY-MM-DD HH:MM:SS[.ffffff][+HH[:MM]]`, the same
    /// with a `T` separator or a trailing `Z`, an offset-less datetime (read as
    /// UTC), and a bare date (midnight UTC).
    pub fn parse(input: &str) -> Result<Self, TimestampParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TimestampParseError::new(input, "empty timestamp"));
        }

        let mut normalized = trimmed.replacen('T', " ", 1);
        if normalized.ends_with('Z') || normalized.ends_with('z') {
            normalized.pop();
            normalized.push_str("+00");
        }

        if let Ok(dt) = DateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f%#z") {
            return Ok(Self::from_datetime(dt.with_timezone(&Utc)));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f") {
            return Ok(Self::from_datetime(naive.and_utc()));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M") {
            return Ok(Self::from_datetime(naive.and_utc()));
        }
        if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
            && let Some(midnight) = date.and_hms_opt(0, 0, 0)
        {
            return Ok(Self::from_datetime(midnight.and_utc()));
        }

        Err(TimestampParseError::new(input, "unrecognized timestamp format"))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(dt) = self.to_datetime() else {
            return write!(f, "{}us", self.0);
        };
        write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))?;
        let frac = self.0.rem_euclid(MICROS_PER_SECOND);
        if frac != 0 {
            let digits = format!("{:06}", frac);
            write!(f, ".{}", digits.trim_end_matches('0'))?;
        }
        f.write_str("+00")
    }
}

impl FromStr for Timestamp {
    type Err = TimestampParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

/// Error returned when a timestamp string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampParseError {
    input: String,
    reason: &'static str,
}

impl TimestampParseError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }

    /// The rejected input.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for TimestampParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid timestamp '{}': {}", self.input, self.reason)
    }
}

impl std::error::Error for TimestampParseError {}
