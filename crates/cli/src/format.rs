//! Output formatting for stamped and previewed triples.

use chrono::{DateTime, Local};
use filestamp_core::FileTimeTriple;
use serde::Serialize;
use std::path::Path;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";

/// One line of output, also the JSON record shape
#[derive(Debug, Serialize)]
pub struct TripleRecord {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub path: Option<String>,
  pub created: DateTime<Local>,
  pub modified: DateTime<Local>,
  pub accessed: DateTime<Local>,
  /// False when the platform could not set the creation time
  pub creation_applied: bool,
  pub dry_run: bool,
}

impl TripleRecord {
  pub fn new(path: Option<&Path>, triple: &FileTimeTriple<Local>, creation_applied: bool, dry_run: bool) -> Self {
    Self {
      path: path.map(|p| p.display().to_string()),
      created: triple.creation_time,
      modified: triple.last_write_time,
      accessed: triple.last_access_time,
      creation_applied,
      dry_run,
    }
  }
}

/// Render a record as an indented text block
pub fn format_record(record: &TripleRecord) -> String {
  let mut out = String::new();
  if let Some(path) = &record.path {
    out.push_str(path);
    if record.dry_run {
      out.push_str("  (dry run)");
    }
    out.push('\n');
  }

  let created = if record.creation_applied || record.dry_run {
    record.created.format(TIME_FORMAT).to_string()
  } else {
    format!("{} (not set on this platform)", record.created.format(TIME_FORMAT))
  };
  out.push_str(&format!("  created:  {}\n", created));
  out.push_str(&format!("  modified: {}\n", record.modified.format(TIME_FORMAT)));
  out.push_str(&format!("  accessed: {}", record.accessed.format(TIME_FORMAT)));
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn triple() -> FileTimeTriple<Local> {
    let at = |d, h| Local.with_ymd_and_hms(2024, 4, d, h, 0, 0).earliest().unwrap();
    FileTimeTriple {
      creation_time: at(8, 11),
      last_write_time: at(12, 14),
      last_access_time: at(15, 19),
    }
  }

  #[test]
  fn test_format_applied_record() {
    let record = TripleRecord::new(Some(Path::new("a.txt")), &triple(), true, false);
    let text = format_record(&record);
    assert!(text.starts_with("a.txt\n"));
    assert!(text.contains("  created:  2024-04-08 11:00:00"));
    assert!(text.contains("  modified: 2024-04-12 14:00:00"));
    assert!(text.contains("  accessed: 2024-04-15 19:00:00"));
    assert!(!text.contains("not set"));
  }

  #[test]
  fn test_format_marks_skipped_creation() {
    let record = TripleRecord::new(Some(Path::new("a.txt")), &triple(), false, false);
    assert!(format_record(&record).contains("(not set on this platform)"));
  }

  #[test]
  fn test_format_preview_without_path() {
    let record = TripleRecord::new(None, &triple(), false, true);
    let text = format_record(&record);
    assert!(text.starts_with("  created:"));
    assert!(!text.contains("not set"));
  }

  #[test]
  fn test_json_shape() {
    let record = TripleRecord::new(Some(Path::new("a.txt")), &triple(), true, true);
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["path"], "a.txt");
    assert_eq!(value["dry_run"], true);
    assert!(value["modified"].as_str().unwrap().starts_with("2024-04-12T14:00:00"));

    let preview = serde_json::to_value(TripleRecord::new(None, &triple(), false, true)).unwrap();
    assert!(preview.get("path").is_none());
  }
}
