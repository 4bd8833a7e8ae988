//! Timestamp triple generation by rejection sampling, and batch application.
//!
//! Each of the three timestamps is drawn from its offset range and redrawn
//! until its local hour falls outside the forbidden window. The redraw loop is
//! capped by `max_attempts`; exceeding it yields
//! [`StampError::UnreachableTimeWindow`] instead of spinning forever when the
//! reachable offsets all land inside the window.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{
  apply::{self, AppliedFile, CreationTimeMode},
  error::{FileFailure, StampError, TimestampField},
  policy::{OffsetPolicy, OffsetRange},
  window::TimeWindowPolicy,
};

/// Default cap on redraws per timestamp.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10_000;

/// Creation, last-write and last-access times for one file.
///
/// Always `creation_time <= last_write_time <= last_access_time`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTimeTriple<Tz: TimeZone> {
  pub creation_time: DateTime<Tz>,
  pub last_write_time: DateTime<Tz>,
  pub last_access_time: DateTime<Tz>,
}

impl<Tz: TimeZone> FileTimeTriple<Tz> {
  /// The same instants viewed in another time zone.
  pub fn with_timezone<Tz2: TimeZone>(&self, tz: &Tz2) -> FileTimeTriple<Tz2> {
    FileTimeTriple {
      creation_time: self.creation_time.with_timezone(tz),
      last_write_time: self.last_write_time.with_timezone(tz),
      last_access_time: self.last_access_time.with_timezone(tz),
    }
  }

  pub fn fixed_offset(&self) -> FileTimeTriple<FixedOffset> {
    FileTimeTriple {
      creation_time: self.creation_time.fixed_offset(),
      last_write_time: self.last_write_time.fixed_offset(),
      last_access_time: self.last_access_time.fixed_offset(),
    }
  }

  pub fn get(&self, field: TimestampField) -> &DateTime<Tz> {
    match field {
      TimestampField::Creation => &self.creation_time,
      TimestampField::LastWrite => &self.last_write_time,
      TimestampField::LastAccess => &self.last_access_time,
    }
  }
}

/// Failure policy for directory runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
  /// Attempt every file, then report all failures together
  #[default]
  Continue,
  /// Stop at the first failing file
  Abort,
}

/// How triples are written to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
  pub creation_mode: CreationTimeMode,
  pub on_error: OnError,
}

/// Files stamped by a directory run.
#[derive(Debug)]
pub struct DirectoryReport<Tz: TimeZone> {
  pub applied: Vec<(AppliedFile, FileTimeTriple<Tz>)>,
  /// Entries that are not regular files (subdirectories and the like)
  pub skipped: Vec<PathBuf>,
}

/// Generates timestamp triples and applies them to files.
pub struct TimestampGenerator<Tz: TimeZone, R = StdRng> {
  offsets: OffsetPolicy<Tz>,
  window: TimeWindowPolicy,
  max_attempts: u32,
  options: ApplyOptions,
  rng: R,
}

impl<Tz: TimeZone> TimestampGenerator<Tz, StdRng> {
  /// Generator seeded from OS entropy.
  pub fn new(offsets: OffsetPolicy<Tz>, window: TimeWindowPolicy) -> Self {
    Self::with_rng(offsets, window, StdRng::from_entropy())
  }

  /// Reproducible generator.
  pub fn seeded(offsets: OffsetPolicy<Tz>, window: TimeWindowPolicy, seed: u64) -> Self {
    Self::with_rng(offsets, window, StdRng::seed_from_u64(seed))
  }
}

impl<Tz: TimeZone, R: Rng> TimestampGenerator<Tz, R> {
  pub fn with_rng(offsets: OffsetPolicy<Tz>, window: TimeWindowPolicy, rng: R) -> Self {
    Self {
      offsets,
      window,
      max_attempts: DEFAULT_MAX_ATTEMPTS,
      options: ApplyOptions::default(),
      rng,
    }
  }

  /// Set the redraw cap. Values below 1 are raised to 1.
  pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
    self.max_attempts = max_attempts.max(1);
    self
  }

  pub fn with_apply_options(mut self, options: ApplyOptions) -> Self {
    self.options = options;
    self
  }

  pub fn offsets(&self) -> &OffsetPolicy<Tz> {
    &self.offsets
  }

  pub fn window(&self) -> &TimeWindowPolicy {
    &self.window
  }

  pub fn max_attempts(&self) -> u32 {
    self.max_attempts
  }

  pub fn is_time_allowed(&self, timestamp: &DateTime<Tz>) -> bool {
    self.window.is_time_allowed(timestamp)
  }

  /// Draw a fresh triple.
  pub fn generate_triple(&mut self) -> Result<FileTimeTriple<Tz>, StampError> {
    let base = self.offsets.base_time().clone();
    let creation_time = self.draw_allowed(&base, self.offsets.creation_range(), TimestampField::Creation)?;
    let last_write_time = self.draw_allowed(&creation_time, self.offsets.write_range(), TimestampField::LastWrite)?;
    let last_access_time =
      self.draw_allowed(&last_write_time, self.offsets.access_range(), TimestampField::LastAccess)?;

    Ok(FileTimeTriple {
      creation_time,
      last_write_time,
      last_access_time,
    })
  }

  /// Draw `count` triples without touching any file.
  pub fn preview(&mut self, count: usize) -> Result<Vec<FileTimeTriple<Tz>>, StampError> {
    (0..count).map(|_| self.generate_triple()).collect()
  }

  /// Write an already generated triple to `path`.
  pub fn apply_to_file(&self, path: &Path, triple: &FileTimeTriple<Tz>) -> Result<AppliedFile, StampError> {
    apply::apply_to_file(path, triple, self.options.creation_mode)
  }

  /// Generate a fresh triple and write it to `path`.
  pub fn stamp_file(&mut self, path: &Path) -> Result<(AppliedFile, FileTimeTriple<Tz>), StampError> {
    let triple = self.generate_triple()?;
    let applied = self.apply_to_file(path, &triple)?;
    Ok((applied, triple))
  }

  /// Stamp every regular file directly inside `dir`. Subdirectories are not entered.
  ///
  /// Entries are visited in file-name order. Per-file failures follow
  /// [`ApplyOptions::on_error`].
  pub fn apply_to_directory(&mut self, dir: &Path) -> Result<DirectoryReport<Tz>, StampError> {
    let (files, skipped) = list_directory(dir)?;
    let total = files.len();
    let mut applied = Vec::with_capacity(total);
    let mut failures = Vec::new();

    for path in files {
      match self.stamp_file(&path) {
        Ok(stamped) => applied.push(stamped),
        Err(e) if self.options.on_error == OnError::Abort => return Err(e),
        Err(e) => {
          warn!(path = %path.display(), error = %e, "Failed to stamp file, continuing");
          failures.push(FileFailure { path, error: e });
        }
      }
    }

    debug!(
      dir = %dir.display(),
      applied = applied.len(),
      skipped = skipped.len(),
      failed = failures.len(),
      "Directory run complete"
    );

    if failures.is_empty() {
      Ok(DirectoryReport { applied, skipped })
    } else {
      Err(StampError::Batch {
        total,
        applied: applied.into_iter().map(|(file, _)| file).collect(),
        failures,
      })
    }
  }

  /// Draw a triple for every regular file in `dir` without writing anything.
  pub fn plan_directory(&mut self, dir: &Path) -> Result<Vec<(PathBuf, FileTimeTriple<Tz>)>, StampError> {
    let (files, _) = list_directory(dir)?;
    files
      .into_iter()
      .map(|path| self.generate_triple().map(|triple| (path, triple)))
      .collect()
  }

  fn draw_allowed(
    &mut self,
    anchor: &DateTime<Tz>,
    range: OffsetRange,
    field: TimestampField,
  ) -> Result<DateTime<Tz>, StampError> {
    for attempt in 1..=self.max_attempts {
      let offset = range.draw(&mut self.rng);
      let candidate = TimeDelta::try_seconds(offset)
        .and_then(|d| anchor.clone().checked_add_signed(d))
        .ok_or_else(|| StampError::invalid_policy(format!("{} offset of {}s is out of range", field, offset)))?;

      if self.window.is_time_allowed(&candidate) {
        trace!(%field, attempt, offset, "Accepted candidate");
        return Ok(candidate);
      }
    }

    Err(StampError::UnreachableTimeWindow {
      field,
      attempts: self.max_attempts,
    })
  }
}

/// Direct entries of `dir`, sorted, split into regular files and everything else.
fn list_directory(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>), StampError> {
  let mut entries = std::fs::read_dir(dir)
    .and_then(|rd| rd.map(|e| e.map(|e| e.path())).collect::<Result<Vec<_>, _>>())
    .map_err(|e| StampError::file_access(dir, e))?;
  entries.sort();

  // is_file follows symlinks
  let (files, skipped): (Vec<_>, Vec<_>) = entries.into_iter().partition(|p| p.is_file());
  for path in &skipped {
    trace!(path = %path.display(), "Skipping non-file entry");
  }
  Ok((files, skipped))
}
