//! Daily forbidden hour window.
//!
//! A window is a recurring `[start, end)` hour interval. When `start > end` it
//! wraps past midnight, so `22-10` forbids 22:00 through 09:59.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Timelike};

use crate::error::StampError;

/// Hours of the day during which no generated timestamp may fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindowPolicy {
  forbidden_start_hour: u32,
  forbidden_end_hour: u32,
}

impl TimeWindowPolicy {
  /// Build a window, rejecting hours outside `[0, 24)` and windows that cover the whole day.
  pub fn new(forbidden_start_hour: u32, forbidden_end_hour: u32) -> Result<Self, StampError> {
    if forbidden_start_hour >= 24 || forbidden_end_hour >= 24 {
      return Err(StampError::invalid_policy(format!(
        "forbidden hours must be in 0..24, got {}-{}",
        forbidden_start_hour, forbidden_end_hour
      )));
    }
    // start == end takes the wrapping branch and forbids every hour
    if forbidden_start_hour == forbidden_end_hour {
      return Err(StampError::invalid_policy(format!(
        "forbidden window {}-{} covers the entire day",
        forbidden_start_hour, forbidden_end_hour
      )));
    }
    Ok(Self {
      forbidden_start_hour,
      forbidden_end_hour,
    })
  }

  pub fn forbidden_start_hour(&self) -> u32 {
    self.forbidden_start_hour
  }

  pub fn forbidden_end_hour(&self) -> u32 {
    self.forbidden_end_hour
  }

  /// Whether the window wraps past midnight.
  pub fn wraps_midnight(&self) -> bool {
    self.forbidden_start_hour >= self.forbidden_end_hour
  }

  /// Check a bare hour-of-day against the window.
  pub fn is_hour_allowed(&self, hour: u32) -> bool {
    let (start, end) = (self.forbidden_start_hour, self.forbidden_end_hour);
    if start < end {
      !(start <= hour && hour < end)
    } else {
      !(start <= hour || hour < end)
    }
  }

  /// Check a timestamp using its hour in the timestamp's own time zone.
  pub fn is_time_allowed<Tz: TimeZone>(&self, timestamp: &DateTime<Tz>) -> bool {
    self.is_hour_allowed(timestamp.hour())
  }

  /// Number of allowed hours per day.
  pub fn allowed_hours(&self) -> u32 {
    (0..24).filter(|h| self.is_hour_allowed(*h)).count() as u32
  }
}

impl fmt::Display for TimeWindowPolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:02}:00-{:02}:00", self.forbidden_start_hour, self.forbidden_end_hour)
  }
}

impl FromStr for TimeWindowPolicy {
  type Err = StampError;

  /// Parse `START-END`, e.g. `22-10`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (start, end) = s
      .split_once('-')
      .ok_or_else(|| StampError::invalid_policy(format!("expected START-END hours, got '{}'", s)))?;
    let parse = |part: &str| {
      part
        .trim()
        .parse::<u32>()
        .map_err(|_| StampError::invalid_policy(format!("invalid hour '{}' in '{}'", part.trim(), s)))
    };
    Self::new(parse(start)?, parse(end)?)
  }
}
