//! Logging setup for the CLI

use filestamp_core::config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Log file name inside the data directory
const LOG_FILE_NAME: &str = "filestamp.log";

/// Config level text to a filter; `off` disables logging, unknown names mean `info`
fn level_filter(level: &str) -> LevelFilter {
  level.trim().parse().unwrap_or(LevelFilter::INFO)
}

/// Initialize logging with config-driven settings.
///
/// Console mode logs to stderr so stdout stays clean for `--json` output.
/// File mode logs to a rolling file in the data directory (no ANSI), which
/// keeps a record of every stamped file across runs.
///
/// Returns the guard that must be kept alive for the duration of the program
pub fn init_cli_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
  let level = level_filter(&config.level);

  // Build env filter (allows RUST_LOG override)
  let env_filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  if !config.file {
    init_console(env_filter);
    return None;
  }

  let dir = filestamp_core::dirs::default_data_dir();
  if std::fs::create_dir_all(&dir).is_err() {
    // Fall back to console-only logging
    init_console(env_filter);
    return None;
  }

  let file_appender = match config.rotation.as_str() {
    "hourly" => tracing_appender::rolling::hourly(&dir, LOG_FILE_NAME),
    "never" => tracing_appender::rolling::never(&dir, LOG_FILE_NAME),
    _ => tracing_appender::rolling::daily(&dir, LOG_FILE_NAME),
  };

  let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(true)
    .with_ansi(false)
    .with_writer(file_writer)
    .init();

  Some(guard)
}

fn init_console(env_filter: EnvFilter) {
  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}
