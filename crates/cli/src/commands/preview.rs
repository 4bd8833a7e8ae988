//! Preview generated triples without touching files

use crate::format::{TripleRecord, format_record};
use anyhow::{Context, Result};
use chrono::Local;
use filestamp_core::Config;
use tracing::debug;

/// Print `count` generated triples
pub fn cmd_preview(config: &Config, count: usize, json: bool) -> Result<()> {
  let mut generator = config.build_generator(&Local).context("Invalid timestamp policy")?;
  let triples = generator.preview(count).context("Failed to generate timestamps")?;
  debug!(count = triples.len(), "Generated preview");

  let records: Vec<_> = triples
    .iter()
    .map(|triple| TripleRecord::new(None, triple, false, true))
    .collect();

  if json {
    println!("{}", serde_json::to_string_pretty(&records)?);
    return Ok(());
  }

  println!("Base time:  {}", generator.offsets().base_time().format("%Y-%m-%d %H:%M:%S %:z"));
  println!("Forbidden:  {}", generator.window());
  println!();
  for (i, record) in records.iter().enumerate() {
    println!("#{}", i + 1);
    println!("{}", format_record(record));
  }
  Ok(())
}
