//! Configuration loading and the `config` subcommands

use crate::PolicyArgs;
use anyhow::{Context, Result, bail};
use filestamp_core::{Config, TimeWindowPolicy};
use std::path::{Path, PathBuf};

fn current_dir() -> PathBuf {
  std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Load the effective config and apply command-line overrides on top
pub fn load_config(policy: &PolicyArgs) -> Result<Config> {
  let mut config = match &policy.config {
    Some(path) => Config::load_from(path).with_context(|| format!("Failed to load config {}", path.display()))?,
    None => Config::load_for_dir(&current_dir()).context("Failed to load config")?,
  };
  apply_overrides(&mut config, policy)?;
  Ok(config)
}

fn apply_overrides(config: &mut Config, policy: &PolicyArgs) -> Result<()> {
  let offsets = &mut config.offsets;
  if let Some(base_time) = &policy.base_time {
    offsets.base_time = Some(base_time.clone());
  }
  if let Some(days) = policy.creation_max_days {
    offsets.creation_max_days = days;
  }
  if let Some(days) = policy.write_min_days {
    offsets.write_min_days = days;
  }
  if let Some(days) = policy.write_max_days {
    offsets.write_max_days = days;
  }
  if let Some(days) = policy.access_min_days {
    offsets.access_min_days = days;
  }
  if let Some(days) = policy.access_max_days {
    offsets.access_max_days = days;
  }

  if let Some(text) = &policy.forbidden {
    let window: TimeWindowPolicy = text.parse().context("Invalid --forbidden window")?;
    config.window.forbidden_start_hour = window.forbidden_start_hour();
    config.window.forbidden_end_hour = window.forbidden_end_hour();
  }

  if let Some(seed) = policy.seed {
    config.generator.seed = Some(seed);
  }
  if let Some(max_attempts) = policy.max_attempts {
    config.generator.max_attempts = max_attempts;
  }
  Ok(())
}

/// Show current effective configuration
pub fn cmd_config_show(explicit: Option<&Path>) -> Result<()> {
  let cwd = current_dir();

  let config = if let Some(path) = explicit {
    println!("Using config: {:?}", path);
    Config::load_from(path).with_context(|| format!("Failed to load config {}", path.display()))?
  } else {
    let project_config = Config::project_config_path(&cwd);
    let user_config = Config::user_config_path();

    println!("Effective configuration for: {:?}", cwd);
    println!();

    if project_config.exists() {
      println!("Using project config: {:?}", project_config);
    } else if let Some(ref user_path) = user_config
      && user_path.exists()
    {
      println!("Using user config: {:?}", user_path);
    } else {
      println!("Using default configuration (no config file found)");
    }
    Config::load_for_dir(&cwd).context("Failed to load config")?
  };
  println!();

  let toml_str = toml::to_string_pretty(&config)?;
  println!("{}", toml_str);

  Ok(())
}

/// Initialize project configuration file
pub fn cmd_config_init(force: bool) -> Result<()> {
  let config_path = Config::project_config_path(&current_dir());

  if config_path.exists() && !force {
    bail!(
      "Config already exists at {}. Use --force to overwrite.",
      config_path.display()
    );
  }

  std::fs::write(&config_path, Config::generate_template())
    .with_context(|| format!("Failed to write {}", config_path.display()))?;

  println!("Created config: {}", config_path.display());
  println!("\nEdit this file to change offsets, the forbidden window, or apply behavior.");
  Ok(())
}

/// Print the config search locations
pub fn cmd_config_path() -> Result<()> {
  let cwd = current_dir();
  let project_config = Config::project_config_path(&cwd);
  let mark = |p: &Path| if p.exists() { "" } else { " (not found)" };

  println!("Project: {}{}", project_config.display(), mark(&project_config));
  if let Some(user_config) = Config::user_config_path() {
    println!("User:    {}{}", user_config.display(), mark(&user_config));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use filestamp_core::OnError;
  use tempfile::TempDir;

  #[test]
  fn test_overrides_replace_config_values() {
    let mut config = Config::default();
    let policy = PolicyArgs {
      base_time: Some("2024-04-07 10:09:45".to_string()),
      creation_max_days: Some(1.0),
      access_max_days: Some(9.5),
      forbidden: Some("1-5".to_string()),
      seed: Some(3),
      max_attempts: Some(40),
      ..Default::default()
    };
    apply_overrides(&mut config, &policy).unwrap();

    assert_eq!(config.offsets.base_time.as_deref(), Some("2024-04-07 10:09:45"));
    assert_eq!(config.offsets.creation_max_days, 1.0);
    assert_eq!(config.offsets.write_min_days, 3.7);
    assert_eq!(config.offsets.access_max_days, 9.5);
    assert_eq!(config.window.forbidden_start_hour, 1);
    assert_eq!(config.window.forbidden_end_hour, 5);
    assert_eq!(config.generator.seed, Some(3));
    assert_eq!(config.generator.max_attempts, 40);
  }

  #[test]
  fn test_bad_forbidden_window_rejected() {
    let mut config = Config::default();
    let policy = PolicyArgs {
      forbidden: Some("8-8".to_string()),
      ..Default::default()
    };
    assert!(apply_overrides(&mut config, &policy).is_err());
  }

  #[test]
  fn test_explicit_config_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("stamp.toml");
    std::fs::write(&path, "[apply]\non_error = \"abort\"\n").unwrap();

    let policy = PolicyArgs {
      config: Some(path),
      ..Default::default()
    };
    let config = load_config(&policy).unwrap();
    assert_eq!(config.apply.on_error, OnError::Abort);
  }

  #[test]
  fn test_missing_explicit_config_is_error() {
    let temp = TempDir::new().unwrap();
    let policy = PolicyArgs {
      config: Some(temp.path().join("nope.toml")),
      ..Default::default()
    };
    assert!(load_config(&policy).is_err());
  }

  #[test]
  fn test_malformed_explicit_config_is_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("stamp.toml");
    std::fs::write(&path, "[window]\nforbidden_start_hour = 1\n[apply]\non_error = \"stop\"\n").unwrap();

    let policy = PolicyArgs {
      config: Some(path),
      ..Default::default()
    };
    let err = load_config(&policy).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse config"));
  }
}
