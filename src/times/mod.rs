//! Relative-time parsing
//!
//! The target site renders review ages as human-relative text
//! ("3 years ago", "a month ago"). This module converts such markers
//! into elapsed durations and absolute timestamps. The pagination
//! terminator keys off the parsed unit; review extraction keys off the
//! derived absolute time.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;

lazy_static! {
    static ref RELATIVE_AGE: Regex =
        Regex::new(r"(?i)\b(a|an|\d+)\s+(minute|hour|day|week|month|year)s?\b")
            .expect("relative-age pattern is valid");
}

/// Time unit of a relative age marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    fn from_word(word: &str) -> Option<TimeUnit> {
        match word.to_lowercase().as_str() {
            "minute" => Some(TimeUnit::Minute),
            "hour" => Some(TimeUnit::Hour),
            "day" => Some(TimeUnit::Day),
            "week" => Some(TimeUnit::Week),
            "month" => Some(TimeUnit::Month),
            "year" => Some(TimeUnit::Year),
            _ => None,
        }
    }

    /// Milliseconds in one unit. Months count as 30 days, years as 365.
    pub fn millis(&self) -> u64 {
        match self {
            TimeUnit::Minute => 60 * 1000,
            TimeUnit::Hour => 60 * 60 * 1000,
            TimeUnit::Day => 24 * 60 * 60 * 1000,
            TimeUnit::Week => 7 * 24 * 60 * 60 * 1000,
            TimeUnit::Month => 30 * 24 * 60 * 60 * 1000,
            TimeUnit::Year => 365 * 24 * 60 * 60 * 1000,
        }
    }
}

/// A parsed relative age: numeric magnitude plus unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeAge {
    pub magnitude: u64,
    pub unit: TimeUnit,
}

impl RelativeAge {
    /// Parses free text containing a relative age marker.
    ///
    /// Accepts a leading integer or the articles "a"/"an" for a
    /// magnitude of one, followed by a unit word (singular or plural),
    /// anywhere in the text. Returns `None` when no marker is present.
    ///
    /// # Examples
    ///
    /// ```
    /// use mapsweep::times::{RelativeAge, TimeUnit};
    ///
    /// let age = RelativeAge::parse("3 years ago").unwrap();
    /// assert_eq!(age.magnitude, 3);
    /// assert_eq!(age.unit, TimeUnit::Year);
    ///
    /// assert!(RelativeAge::parse("yesterday").is_none());
    /// ```
    pub fn parse(text: &str) -> Option<RelativeAge> {
        let caps = RELATIVE_AGE.captures(text)?;

        let magnitude_text = caps.get(1)?.as_str();
        let magnitude = if magnitude_text.eq_ignore_ascii_case("a")
            || magnitude_text.eq_ignore_ascii_case("an")
        {
            1
        } else {
            magnitude_text.parse().ok()?
        };

        let unit = TimeUnit::from_word(caps.get(2)?.as_str())?;

        Some(RelativeAge { magnitude, unit })
    }

    /// Elapsed time represented by this age
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.magnitude.saturating_mul(self.unit.millis()))
    }

    /// Absolute timestamp obtained by subtracting the elapsed time
    /// from the current wall clock. The result is stamped at call time
    /// and goes stale if recomputed later.
    pub fn before_now(&self) -> DateTime<Utc> {
        Utc::now() - ChronoDuration::milliseconds(self.elapsed().as_millis() as i64)
    }
}

/// Parses free text into an elapsed duration.
///
/// Returns `Duration::ZERO` when no relative age marker is found;
/// this never errors, so callers can feed it arbitrary rendered text.
pub fn parse_text_duration(text: &str) -> Duration {
    RelativeAge::parse(text)
        .map(|age| age.elapsed())
        .unwrap_or(Duration::ZERO)
}
