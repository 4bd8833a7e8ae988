//! Error types for timestamp generation and application.

use std::fmt;
use std::path::PathBuf;

use crate::apply::AppliedFile;

/// Which of the three file timestamps an operation concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampField {
  Creation,
  LastWrite,
  LastAccess,
}

impl fmt::Display for TimestampField {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      TimestampField::Creation => "creation",
      TimestampField::LastWrite => "last-write",
      TimestampField::LastAccess => "last-access",
    };
    f.write_str(name)
  }
}

/// A file that could not be stamped during a directory run.
#[derive(Debug)]
pub struct FileFailure {
  pub path: PathBuf,
  pub error: StampError,
}

/// Errors produced while building policies, generating triples or writing metadata.
#[derive(Debug, thiserror::Error)]
pub enum StampError {
  /// A policy bound is malformed. Raised at construction, never during generation.
  #[error("Invalid policy: {0}")]
  InvalidPolicy(String),
  /// The file could not be opened or the OS rejected the metadata update.
  #[error("Cannot update timestamps of {}: {source}", .path.display())]
  FileAccess {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  /// Rejection sampling hit its attempt cap without leaving the forbidden window.
  #[error("No allowed {field} time found after {attempts} attempts")]
  UnreachableTimeWindow { field: TimestampField, attempts: u32 },
  /// One or more files in a directory run failed; the rest were still processed.
  #[error("{} of {total} files failed ({} stamped): {}", .failures.len(), .applied.len(), list_paths(.failures))]
  Batch {
    total: usize,
    applied: Vec<AppliedFile>,
    failures: Vec<FileFailure>,
  },
}

impl StampError {
  /// Create an invalid-policy error.
  pub fn invalid_policy(msg: impl Into<String>) -> Self {
    Self::InvalidPolicy(msg.into())
  }

  /// Create a file-access error for `path`.
  pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::FileAccess {
      path: path.into(),
      source,
    }
  }
}

fn list_paths(failures: &[FileFailure]) -> String {
  failures
    .iter()
    .map(|f| f.path.display().to_string())
    .collect::<Vec<_>>()
    .join(", ")
}
