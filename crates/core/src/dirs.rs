//! Where filestamp keeps its user config and log files.
//!
//! Each location is `$FILESTAMP_*_DIR` when set, else `$XDG_*_HOME/filestamp`,
//! else the platform directory from the `dirs` crate joined with `filestamp`.

use std::ffi::OsString;
use std::path::PathBuf;

const APP_DIR: &str = "filestamp";

/// Data directory, used for rolling log files.
pub fn default_data_dir() -> PathBuf {
  resolve(
    env_path("FILESTAMP_DATA_DIR"),
    env_path("XDG_DATA_HOME"),
    dirs::data_local_dir(),
  )
}

/// Directory holding the user-level `config.toml`.
pub fn default_config_dir() -> PathBuf {
  resolve(
    env_path("FILESTAMP_CONFIG_DIR"),
    env_path("XDG_CONFIG_HOME"),
    dirs::config_dir(),
  )
}

// empty values count as unset, as XDG requires
fn env_path(var: &str) -> Option<OsString> {
  std::env::var_os(var).filter(|v| !v.is_empty())
}

fn resolve(explicit: Option<OsString>, xdg_home: Option<OsString>, platform: Option<PathBuf>) -> PathBuf {
  if let Some(dir) = explicit {
    return PathBuf::from(dir);
  }
  xdg_home
    .map(PathBuf::from)
    .or(platform)
    .unwrap_or_else(|| PathBuf::from("."))
    .join(APP_DIR)
}
