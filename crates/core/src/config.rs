//! Configuration for filestamp with per-directory overrides.
//!
//! Config priority: project-relative (.filestamp.toml) > user (~/.config/filestamp/config.toml) > defaults

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  apply::CreationTimeMode,
  error::StampError,
  generator::{ApplyOptions, DEFAULT_MAX_ATTEMPTS, OnError, TimestampGenerator},
  policy::OffsetPolicy,
  window::TimeWindowPolicy,
};

/// File name of the project-level config
pub const PROJECT_CONFIG_FILE: &str = ".filestamp.toml";

/// Local time formats accepted for `base_time`, besides RFC 3339
const LOCAL_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Failed to read config {}: {source}", .path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("Failed to parse config {}: {source}", .path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
  #[error(transparent)]
  Policy(#[from] StampError),
}

// ============================================================================
// Offsets
// ============================================================================

/// Offset bounds, in fractional days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetsConfig {
  /// Base time; local "YYYY-MM-DD HH:MM:SS" or RFC 3339. Unset means now.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub base_time: Option<String>,

  /// Creation time is base + [0, creation_max_days] (default: 5)
  pub creation_max_days: f64,

  /// Last-write time is creation + [write_min_days, write_max_days] (default: 3.7..7.2)
  pub write_min_days: f64,
  pub write_max_days: f64,

  /// Last-access time is last-write + [access_min_days, access_max_days] (default: 2..4.8)
  pub access_min_days: f64,
  pub access_max_days: f64,
}

impl Default for OffsetsConfig {
  fn default() -> Self {
    Self {
      base_time: None,
      creation_max_days: 5.0,
      write_min_days: 3.7,
      write_max_days: 7.2,
      access_min_days: 2.0,
      access_max_days: 4.8,
    }
  }
}

// ============================================================================
// Window
// ============================================================================

/// Forbidden daily hour window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
  /// First forbidden hour, 0-23 (default: 22)
  pub forbidden_start_hour: u32,

  /// First allowed hour after the window, 0-23 (default: 10)
  pub forbidden_end_hour: u32,
}

impl Default for WindowConfig {
  fn default() -> Self {
    Self {
      forbidden_start_hour: 22,
      forbidden_end_hour: 10,
    }
  }
}

// ============================================================================
// Generator / Apply / Logging
// ============================================================================

/// Random generation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
  /// Redraws allowed per timestamp before giving up (default: 10000)
  pub max_attempts: u32,

  /// Fixed seed for reproducible runs. Unset draws from OS entropy.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
  fn default() -> Self {
    Self {
      max_attempts: DEFAULT_MAX_ATTEMPTS,
      seed: None,
    }
  }
}

/// Filesystem application settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyConfig {
  /// Directory runs: "continue" past failed files, or "abort" on the first (default: continue)
  pub on_error: OnError,

  /// Fail instead of skipping creation time where the platform cannot set it (default: false)
  pub require_creation_time: bool,
}

impl ApplyConfig {
  pub fn options(&self) -> ApplyOptions {
    ApplyOptions {
      creation_mode: if self.require_creation_time {
        CreationTimeMode::Require
      } else {
        CreationTimeMode::BestEffort
      },
      on_error: self.on_error,
    }
  }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  /// Log level: error, warn, info, debug, trace (default: info)
  pub level: String,

  /// Write logs to a file in the data directory instead of the console (default: false)
  pub file: bool,

  /// Log file rotation: daily, hourly, never (default: daily)
  pub rotation: String,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      file: false,
      rotation: "daily".to_string(),
    }
  }
}

// ============================================================================
// Main Configuration
// ============================================================================

/// filestamp configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  pub offsets: OffsetsConfig,
  pub window: WindowConfig,
  pub generator: GeneratorConfig,
  pub apply: ApplyConfig,
  pub logging: LoggingConfig,
}

impl Config {
  /// Load config for a directory, with fallback to user config, then defaults.
  ///
  /// Only absent files fall through; one that exists but cannot be read or
  /// parsed is an error.
  pub fn load_for_dir(dir: &Path) -> Result<Self, ConfigError> {
    let project_config = Self::project_config_path(dir);
    if project_config.exists() {
      return Self::load_from(&project_config);
    }

    if let Some(user_config_path) = Self::user_config_path()
      && user_config_path.exists()
    {
      return Self::load_from(&user_config_path);
    }

    Ok(Self::default())
  }

  /// Load an explicit config file, reporting read and parse failures
  pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Get the user-level config path
  pub fn user_config_path() -> Option<PathBuf> {
    Some(crate::dirs::default_config_dir().join("config.toml"))
  }

  /// Get the project-relative config path
  pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(PROJECT_CONFIG_FILE)
  }

  pub fn window_policy(&self) -> Result<TimeWindowPolicy, StampError> {
    TimeWindowPolicy::new(self.window.forbidden_start_hour, self.window.forbidden_end_hour)
  }

  /// Build the offset policy, resolving `base_time` in `tz` (now when unset)
  pub fn offset_policy<Tz: TimeZone>(&self, tz: &Tz) -> Result<OffsetPolicy<Tz>, StampError> {
    let base_time = match &self.offsets.base_time {
      Some(text) => parse_base_time(text, tz)?,
      None => Utc::now().with_timezone(tz),
    };
    let o = &self.offsets;
    OffsetPolicy::new(
      base_time,
      o.creation_max_days,
      o.write_min_days,
      o.write_max_days,
      o.access_min_days,
      o.access_max_days,
    )
  }

  /// Build a generator with every setting applied
  pub fn build_generator<Tz: TimeZone>(&self, tz: &Tz) -> Result<TimestampGenerator<Tz>, StampError> {
    let offsets = self.offset_policy(tz)?;
    let window = self.window_policy()?;
    let generator = match self.generator.seed {
      Some(seed) => TimestampGenerator::seeded(offsets, window, seed),
      None => TimestampGenerator::new(offsets, window),
    };
    Ok(
      generator
        .with_max_attempts(self.generator.max_attempts)
        .with_apply_options(self.apply.options()),
    )
  }

  /// Generate a default config file as a string
  pub fn generate_template() -> String {
    let defaults = Self::default();
    format!(
      r#"# filestamp configuration
# Place in {project_file} (per directory) or ~/.config/filestamp/config.toml (user)

# ============================================================================
# Offsets (fractional days)
# ============================================================================

[offsets]
# Base time all offsets start from. Local "YYYY-MM-DD HH:MM:SS" or RFC 3339.
# Leave unset to use the current time.
# base_time = "2024-04-07 10:09:45"

# creation      = base       + [0, creation_max_days]
# last write    = creation   + [write_min_days, write_max_days]
# last access   = last write + [access_min_days, access_max_days]
creation_max_days = {creation_max_days}
write_min_days = {write_min_days}
write_max_days = {write_max_days}
access_min_days = {access_min_days}
access_max_days = {access_max_days}

# ============================================================================
# Forbidden Window
# ============================================================================

[window]
# No timestamp may fall in [start, end) local time. start > end wraps midnight,
# so 22 / 10 forbids 22:00 through 09:59.
forbidden_start_hour = {start}
forbidden_end_hour = {end}

# ============================================================================
# Generator
# ============================================================================

[generator]
# Redraws per timestamp before reporting the window as unreachable
max_attempts = {max_attempts}

# Fixed seed for reproducible runs (uncomment to use):
# seed = 42

# ============================================================================
# Apply
# ============================================================================

[apply]
# Directory runs: "continue" stamps every file and reports failures at the end,
# "abort" stops at the first failing file
on_error = "continue"

# Creation time can only be set on Windows and macOS. When true, other
# platforms fail instead of writing only last-write and last-access times.
require_creation_time = false

# ============================================================================
# Logging
# ============================================================================

[logging]
# error, warn, info, debug, trace (RUST_LOG overrides)
level = "info"

# Write logs to a rolling file in the data directory instead of the console
file = false

# daily, hourly, never
rotation = "daily"
"#,
      project_file = PROJECT_CONFIG_FILE,
      creation_max_days = fmt_days(defaults.offsets.creation_max_days),
      write_min_days = fmt_days(defaults.offsets.write_min_days),
      write_max_days = fmt_days(defaults.offsets.write_max_days),
      access_min_days = fmt_days(defaults.offsets.access_min_days),
      access_max_days = fmt_days(defaults.offsets.access_max_days),
      start = defaults.window.forbidden_start_hour,
      end = defaults.window.forbidden_end_hour,
      max_attempts = defaults.generator.max_attempts,
    )
  }
}

// keep a decimal point so TOML reads the value back as a float
fn fmt_days(days: f64) -> String {
  if days.fract() == 0.0 {
    format!("{:.1}", days)
  } else {
    days.to_string()
  }
}

/// Parse a base time in `tz`.
///
/// Naive local forms are resolved in `tz`; ambiguous or skipped local times
/// (DST transitions) are rejected rather than guessed.
pub fn parse_base_time<Tz: TimeZone>(text: &str, tz: &Tz) -> Result<DateTime<Tz>, StampError> {
  let text = text.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
    return Ok(dt.with_timezone(tz));
  }

  for format in LOCAL_TIME_FORMATS {
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
      return tz.from_local_datetime(&naive).single().ok_or_else(|| {
        StampError::invalid_policy(format!("base time '{}' is ambiguous or does not exist locally", text))
      });
    }
  }

  Err(StampError::invalid_policy(format!(
    "unrecognized base time '{}', expected YYYY-MM-DD HH:MM:SS or RFC 3339",
    text
  )))
}

#[cfg(test)]
mod tests {
  use chrono::FixedOffset;
  use pretty_assertions::assert_eq;
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_defaults_match_reference_scenario() {
    let config = Config::default();
    assert_eq!(config.offsets.creation_max_days, 5.0);
    assert_eq!(config.offsets.write_min_days, 3.7);
    assert_eq!(config.offsets.write_max_days, 7.2);
    assert_eq!(config.offsets.access_min_days, 2.0);
    assert_eq!(config.offsets.access_max_days, 4.8);
    assert_eq!(config.window.forbidden_start_hour, 22);
    assert_eq!(config.window.forbidden_end_hour, 10);
    assert_eq!(config.generator.max_attempts, DEFAULT_MAX_ATTEMPTS);
    assert_eq!(config.apply.on_error, OnError::Continue);
    assert!(!config.apply.require_creation_time);
    assert_eq!(config.logging.level, "info");
  }

  #[test]
  fn test_load_project_config() {
    let temp = TempDir::new().unwrap();
    let content = r#"
[window]
forbidden_start_hour = 1
forbidden_end_hour = 5

[apply]
on_error = "abort"
"#;
    std::fs::write(temp.path().join(PROJECT_CONFIG_FILE), content).unwrap();

    let config = Config::load_for_dir(temp.path()).unwrap();
    assert_eq!(config.window.forbidden_start_hour, 1);
    assert_eq!(config.window.forbidden_end_hour, 5);
    assert_eq!(config.apply.on_error, OnError::Abort);
    // untouched sections keep defaults
    assert_eq!(config.offsets, OffsetsConfig::default());
  }

  #[test]
  fn test_malformed_project_config_is_error() {
    let temp = TempDir::new().unwrap();
    let content = r#"
[window]
forbidden_start_hour = 1
forbidden_end_hour = 5

[apply]
on_error = "stop"
"#;
    let path = temp.path().join(PROJECT_CONFIG_FILE);
    std::fs::write(&path, content).unwrap();

    match Config::load_for_dir(temp.path()) {
      Err(ConfigError::Parse { path: reported, .. }) => assert_eq!(reported, path),
      other => panic!("expected parse error, got {:?}", other.map(|c| c.window)),
    }
  }

  #[test]
  fn test_load_from_reports_parse_errors() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.toml");
    std::fs::write(&path, "[window]\nforbidden_start_hour = \"late\"\n").unwrap();
    assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse { .. })));
    assert!(matches!(
      Config::load_from(&temp.path().join("missing.toml")),
      Err(ConfigError::Read { .. })
    ));
  }

  #[test]
  fn test_template_roundtrip() {
    let template = Config::generate_template();
    assert!(template.contains("[offsets]"));
    assert!(template.contains("[window]"));
    assert!(template.contains("[generator]"));
    assert!(template.contains("[apply]"));
    assert!(template.contains("[logging]"));

    let parsed: Config = toml::from_str(&template).unwrap();
    assert_eq!(parsed, Config::default());
  }

  #[test]
  fn test_toml_roundtrip() {
    let config = Config {
      offsets: OffsetsConfig {
        base_time: Some("2024-04-07 10:09:45".to_string()),
        creation_max_days: 1.5,
        ..Default::default()
      },
      generator: GeneratorConfig {
        max_attempts: 50,
        seed: Some(7),
      },
      apply: ApplyConfig {
        on_error: OnError::Abort,
        require_creation_time: true,
      },
      ..Default::default()
    };

    let toml_str = toml::to_string_pretty(&config).unwrap();
    let parsed: Config = toml::from_str(&toml_str).unwrap();
    assert_eq!(parsed, config);
  }

  #[test]
  fn test_parse_base_time_formats() {
    let tz = FixedOffset::east_opt(8 * 3600).unwrap();
    let expected = tz.with_ymd_and_hms(2024, 4, 7, 10, 9, 45).unwrap();
    assert_eq!(parse_base_time("2024-04-07 10:09:45", &tz).unwrap(), expected);
    assert_eq!(parse_base_time("2024-04-07T10:09:45", &tz).unwrap(), expected);
    assert_eq!(parse_base_time("2024-04-07T02:09:45Z", &tz).unwrap(), expected);
    assert!(parse_base_time("yesterday", &tz).is_err());
  }

  #[test]
  fn test_build_generator_from_config() {
    let config = Config {
      offsets: OffsetsConfig {
        base_time: Some("2024-04-07 10:09:45".to_string()),
        ..Default::default()
      },
      generator: GeneratorConfig {
        max_attempts: 123,
        seed: Some(99),
      },
      ..Default::default()
    };
    let tz = FixedOffset::east_opt(0).unwrap();
    let mut a = config.build_generator(&tz).unwrap();
    let mut b = config.build_generator(&tz).unwrap();
    assert_eq!(a.max_attempts(), 123);
    assert_eq!(a.generate_triple().unwrap(), b.generate_triple().unwrap());
  }

  #[test]
  fn test_invalid_window_rejected() {
    let config = Config {
      window: WindowConfig {
        forbidden_start_hour: 25,
        forbidden_end_hour: 3,
      },
      ..Default::default()
    };
    assert!(matches!(
      config.build_generator(&Utc),
      Err(StampError::InvalidPolicy(_))
    ));
  }
}
