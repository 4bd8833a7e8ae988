//! Common test utilities for filestamp integration tests

use chrono::{FixedOffset, TimeZone};
use filestamp_core::{OffsetPolicy, TimeWindowPolicy, TimestampGenerator};
use std::path::Path;

/// UTC+8, fixed so hour checks do not depend on the host time zone
#[allow(dead_code)]
pub fn zone() -> FixedOffset {
  FixedOffset::east_opt(8 * 3600).expect("valid offset")
}

/// Generator for the reference scenario: 2024-04-07 10:09:45, 5 / 3.7-7.2 / 2-4.8, window 22-10
#[allow(dead_code)]
pub fn scenario_generator(seed: u64) -> TimestampGenerator<FixedOffset> {
  let base = zone()
    .with_ymd_and_hms(2024, 4, 7, 10, 9, 45)
    .single()
    .expect("valid base time");
  let offsets = OffsetPolicy::new(base, 5.0, 3.7, 7.2, 2.0, 4.8).expect("valid offsets");
  let window = TimeWindowPolicy::new(22, 10).expect("valid window");
  TimestampGenerator::seeded(offsets, window, seed)
}

/// Write a small file, creating parent directories
#[allow(dead_code)]
pub fn write_file(path: &Path, content: &str) {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).expect("create parent dirs");
  }
  std::fs::write(path, content).expect("write file");
}

/// Modification time in unix seconds
#[allow(dead_code)]
pub fn mtime(path: &Path) -> i64 {
  let meta = std::fs::metadata(path).expect("read metadata");
  filetime::FileTime::from_last_modification_time(&meta).unix_seconds()
}

/// Access time in unix seconds
#[allow(dead_code)]
pub fn atime(path: &Path) -> i64 {
  let meta = std::fs::metadata(path).expect("read metadata");
  filetime::FileTime::from_last_access_time(&meta).unix_seconds()
}
