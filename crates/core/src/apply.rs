//! Writing a generated triple to a file's metadata.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{FixedOffset, TimeZone};
#[cfg(not(windows))]
use filetime::FileTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::StampError, generator::FileTimeTriple};

/// What to do when the platform cannot set a file's creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CreationTimeMode {
  /// Write last-write and last-access, report the creation time as skipped
  #[default]
  BestEffort,
  /// Fail with `FileAccess` instead
  Require,
}

/// Outcome of stamping one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedFile {
  pub path: PathBuf,
  pub creation_applied: bool,
  /// The triple as written, in the offset it was generated in
  pub times: FileTimeTriple<FixedOffset>,
}

/// Whether this platform can set a file's creation time at all.
pub const fn creation_time_supported() -> bool {
  cfg!(any(windows, target_os = "macos"))
}

/// Set `path`'s timestamps without opening its contents for reading or writing.
pub fn apply_to_file<Tz: TimeZone>(
  path: &Path,
  triple: &FileTimeTriple<Tz>,
  creation_mode: CreationTimeMode,
) -> Result<AppliedFile, StampError> {
  if !creation_time_supported() && creation_mode == CreationTimeMode::Require {
    return Err(StampError::file_access(
      path,
      io::Error::new(io::ErrorKind::Unsupported, "creation time cannot be set on this platform"),
    ));
  }

  let created = SystemTime::from(triple.creation_time.clone());
  let modified = SystemTime::from(triple.last_write_time.clone());
  let accessed = SystemTime::from(triple.last_access_time.clone());

  let creation_applied = write_times(path, created, modified, accessed, creation_mode)?;
  debug!(path = %path.display(), creation_applied, "Timestamps applied");

  Ok(AppliedFile {
    path: path.to_path_buf(),
    creation_applied,
    times: triple.fixed_offset(),
  })
}

// FILE_WRITE_ATTRIBUTES grants no access to the contents
#[cfg(windows)]
fn write_times(
  path: &Path,
  created: SystemTime,
  modified: SystemTime,
  accessed: SystemTime,
  _mode: CreationTimeMode,
) -> Result<bool, StampError> {
  use std::fs::{FileTimes, OpenOptions};
  use std::os::windows::fs::{FileTimesExt, OpenOptionsExt};
  use windows_sys::Win32::Storage::FileSystem::{
    FILE_SHARE_DELETE, FILE_SHARE_READ, FILE_SHARE_WRITE, FILE_WRITE_ATTRIBUTES,
  };

  let file = OpenOptions::new()
    .access_mode(FILE_WRITE_ATTRIBUTES)
    .share_mode(FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE)
    .open(path)
    .map_err(|e| StampError::file_access(path, e))?;

  let times = FileTimes::new()
    .set_created(created)
    .set_modified(modified)
    .set_accessed(accessed);
  file.set_times(times).map_err(|e| StampError::file_access(path, e))?;
  Ok(true)
}

// utimensat by path only needs ownership of the file, not read or write permission
#[cfg(not(windows))]
fn write_times(
  path: &Path,
  created: SystemTime,
  modified: SystemTime,
  accessed: SystemTime,
  mode: CreationTimeMode,
) -> Result<bool, StampError> {
  let creation_applied = set_creation_time(path, created, mode)?;
  filetime::set_file_times(
    path,
    FileTime::from_system_time(accessed),
    FileTime::from_system_time(modified),
  )
  .map_err(|e| StampError::file_access(path, e))?;
  Ok(creation_applied)
}

// setattrlist needs a descriptor; a file the owner cannot read keeps its birth time
#[cfg(target_os = "macos")]
fn set_creation_time(path: &Path, created: SystemTime, mode: CreationTimeMode) -> Result<bool, StampError> {
  use std::fs::{File, FileTimes};
  use std::os::macos::fs::FileTimesExt;

  let result = File::open(path).and_then(|file| file.set_times(FileTimes::new().set_created(created)));
  match result {
    Ok(()) => Ok(true),
    Err(e) if mode == CreationTimeMode::Require => Err(StampError::file_access(path, e)),
    Err(e) => {
      debug!(path = %path.display(), error = %e, "Creation time left unchanged");
      Ok(false)
    }
  }
}

#[cfg(not(any(windows, target_os = "macos")))]
fn set_creation_time(_path: &Path, _created: SystemTime, _mode: CreationTimeMode) -> Result<bool, StampError> {
  Ok(false)
}
