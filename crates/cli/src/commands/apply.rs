//! Stamp files and directories

use crate::format::{TripleRecord, format_record};
use anyhow::{Context, Result, bail};
use chrono::Local;
use filestamp_core::{Config, StampError, TimestampGenerator};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// A path that could not be stamped, with the reason
struct Failure {
  path: PathBuf,
  reason: String,
}

/// Stamp each path; directories are stamped one level deep
pub fn cmd_apply(config: &Config, paths: &[PathBuf], dry_run: bool, json: bool) -> Result<()> {
  let mut generator = config.build_generator(&Local).context("Invalid timestamp policy")?;

  info!(
    base_time = %generator.offsets().base_time(),
    forbidden = %generator.window(),
    dry_run,
    "Stamping {} path(s)",
    paths.len()
  );

  let mut records = Vec::new();
  let mut failures = Vec::new();

  for path in paths {
    if path.is_dir() {
      stamp_directory(&mut generator, path, dry_run, &mut records, &mut failures);
    } else {
      match stamp_single(&mut generator, path, dry_run) {
        Ok(record) => records.push(record),
        Err(e) => failures.push(Failure {
          path: path.clone(),
          reason: e.to_string(),
        }),
      }
    }
  }

  if json {
    println!("{}", serde_json::to_string_pretty(&records)?);
  } else {
    for record in &records {
      println!("{}", format_record(record));
    }
  }

  for failure in &failures {
    error!(path = %failure.path.display(), "{}", failure.reason);
  }

  if !failures.is_empty() {
    bail!(
      "{} path(s) failed, {} stamped{}",
      failures.len(),
      records.len(),
      if dry_run { " (dry run)" } else { "" }
    );
  }

  if !json {
    let verb = if dry_run { "Planned" } else { "Stamped" };
    println!("\n{} {} file(s)", verb, records.len());
  }
  Ok(())
}

fn stamp_single(
  generator: &mut TimestampGenerator<Local>,
  path: &Path,
  dry_run: bool,
) -> Result<TripleRecord, StampError> {
  if dry_run {
    if !path.is_file() {
      return Err(StampError::file_access(
        path,
        std::io::Error::new(std::io::ErrorKind::NotFound, "not a regular file"),
      ));
    }
    let triple = generator.generate_triple()?;
    return Ok(TripleRecord::new(Some(path), &triple, false, true));
  }

  let (applied, triple) = generator.stamp_file(path)?;
  Ok(TripleRecord::new(Some(path), &triple, applied.creation_applied, false))
}

fn stamp_directory(
  generator: &mut TimestampGenerator<Local>,
  dir: &Path,
  dry_run: bool,
  records: &mut Vec<TripleRecord>,
  failures: &mut Vec<Failure>,
) {
  if dry_run {
    match generator.plan_directory(dir) {
      Ok(plan) => records.extend(
        plan
          .iter()
          .map(|(path, triple)| TripleRecord::new(Some(path.as_path()), triple, false, true)),
      ),
      Err(e) => failures.push(Failure {
        path: dir.to_path_buf(),
        reason: e.to_string(),
      }),
    }
    return;
  }

  match generator.apply_to_directory(dir) {
    Ok(report) => {
      info!(
        dir = %dir.display(),
        stamped = report.applied.len(),
        skipped = report.skipped.len(),
        "Directory stamped"
      );
      records.extend(
        report
          .applied
          .iter()
          .map(|(applied, triple)| TripleRecord::new(Some(applied.path.as_path()), triple, applied.creation_applied, false)),
      );
    }
    Err(StampError::Batch {
      applied,
      failures: failed,
      ..
    }) => {
      records.extend(applied.iter().map(|file| {
        TripleRecord::new(
          Some(file.path.as_path()),
          &file.times.with_timezone(&Local),
          file.creation_applied,
          false,
        )
      }));
      failures.extend(failed.into_iter().map(|f| Failure {
        path: f.path,
        reason: f.error.to_string(),
      }));
    }
    Err(e) => failures.push(Failure {
      path: dir.to_path_buf(),
      reason: e.to_string(),
    }),
  }
}
