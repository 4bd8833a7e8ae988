//! Offset bounds used to derive the three timestamps from a base time.

use chrono::{DateTime, SubsecRound, TimeDelta, TimeZone};
use rand::Rng;

use crate::error::StampError;

/// Seconds in one day; day bounds are fractional and converted with this factor.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// A validated `[min, max]` offset in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetRange {
  min_seconds: f64,
  max_seconds: f64,
}

impl OffsetRange {
  /// Build a range from fractional day bounds.
  pub fn from_days(min_days: f64, max_days: f64) -> Result<Self, StampError> {
    if !min_days.is_finite() || !max_days.is_finite() {
      return Err(StampError::invalid_policy(format!(
        "day bounds must be finite, got {}..{}",
        min_days, max_days
      )));
    }
    if min_days < 0.0 {
      return Err(StampError::invalid_policy(format!("day bounds must be >= 0, got {}", min_days)));
    }
    if min_days > max_days {
      return Err(StampError::invalid_policy(format!(
        "minimum {} days exceeds maximum {} days",
        min_days, max_days
      )));
    }
    Ok(Self {
      min_seconds: min_days * SECONDS_PER_DAY,
      max_seconds: max_days * SECONDS_PER_DAY,
    })
  }

  pub fn min_seconds(&self) -> f64 {
    self.min_seconds
  }

  pub fn max_seconds(&self) -> f64 {
    self.max_seconds
  }

  /// Draw a uniform offset and truncate it toward zero to whole seconds.
  pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
    if self.min_seconds == self.max_seconds {
      return self.min_seconds as i64;
    }
    rng.gen_range(self.min_seconds..=self.max_seconds) as i64
  }
}

/// Base time plus the creation, write and access offset bounds.
#[derive(Debug, Clone)]
pub struct OffsetPolicy<Tz: TimeZone> {
  base_time: DateTime<Tz>,
  creation_max_days: f64,
  write_min_days: f64,
  write_max_days: f64,
  access_min_days: f64,
  access_max_days: f64,
  creation: OffsetRange,
  write: OffsetRange,
  access: OffsetRange,
}

impl<Tz: TimeZone> OffsetPolicy<Tz> {
  /// Validate all bounds eagerly.
  ///
  /// `base_time` is truncated to whole seconds. The latest reachable timestamp
  /// (base plus every maximum) must be representable.
  pub fn new(
    base_time: DateTime<Tz>,
    creation_max_days: f64,
    write_min_days: f64,
    write_max_days: f64,
    access_min_days: f64,
    access_max_days: f64,
  ) -> Result<Self, StampError> {
    let creation = OffsetRange::from_days(0.0, creation_max_days)?;
    let write = OffsetRange::from_days(write_min_days, write_max_days)?;
    let access = OffsetRange::from_days(access_min_days, access_max_days)?;
    let base_time = base_time.trunc_subsecs(0);

    let latest = creation.max_seconds() + write.max_seconds() + access.max_seconds();
    let reachable = TimeDelta::try_seconds(latest as i64).and_then(|d| base_time.clone().checked_add_signed(d));
    if reachable.is_none() {
      return Err(StampError::invalid_policy(format!(
        "offsets of up to {} days from the base time leave the representable range",
        latest / SECONDS_PER_DAY
      )));
    }

    Ok(Self {
      base_time,
      creation_max_days,
      write_min_days,
      write_max_days,
      access_min_days,
      access_max_days,
      creation,
      write,
      access,
    })
  }

  pub fn base_time(&self) -> &DateTime<Tz> {
    &self.base_time
  }

  pub fn creation_max_days(&self) -> f64 {
    self.creation_max_days
  }

  pub fn write_days(&self) -> (f64, f64) {
    (self.write_min_days, self.write_max_days)
  }

  pub fn access_days(&self) -> (f64, f64) {
    (self.access_min_days, self.access_max_days)
  }

  /// Offset of the creation time from the base time.
  pub fn creation_range(&self) -> OffsetRange {
    self.creation
  }

  /// Offset of the last-write time from the creation time.
  pub fn write_range(&self) -> OffsetRange {
    self.write
  }

  /// Offset of the last-access time from the last-write time.
  pub fn access_range(&self) -> OffsetRange {
    self.access
  }
}
