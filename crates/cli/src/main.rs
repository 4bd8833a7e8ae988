//! filestamp CLI - randomized file timestamps that avoid a daily hour window

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use filestamp_core::Config;
use std::path::PathBuf;

mod commands;
mod format;
mod logging;

use commands::{cmd_apply, cmd_config_init, cmd_config_path, cmd_config_show, cmd_preview, load_config};
use logging::init_cli_logging;

#[derive(Parser)]
#[command(name = "filestamp")]
#[command(about = "Randomize file creation, modification and access times within allowed hours")]
#[command(after_help = "\
QUICK START:
  filestamp config init                    # Write .filestamp.toml with defaults
  filestamp preview                        # Show a few generated triples
  filestamp apply report.docx              # Stamp one file
  filestamp apply ./outbox                 # Stamp every file in a directory

COMMON WORKFLOWS:
  filestamp apply ./outbox --dry-run       # See what would be written
  filestamp apply a.txt --forbidden 22-10 --base-time \"2024-04-07 10:09:45\"")]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

/// Policy overrides shared by commands that generate timestamps.
///
/// Anything not given here comes from the loaded config file.
#[derive(Args, Debug, Clone, Default)]
pub struct PolicyArgs {
  /// Config file (default: ./.filestamp.toml, then the user config)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,
  /// Base time, local "YYYY-MM-DD HH:MM:SS" or RFC 3339 (default: now)
  #[arg(long, value_name = "TIME")]
  pub base_time: Option<String>,
  /// Creation time is base + [0, DAYS]
  #[arg(long, value_name = "DAYS")]
  pub creation_max_days: Option<f64>,
  /// Minimum days from creation to last write
  #[arg(long, value_name = "DAYS")]
  pub write_min_days: Option<f64>,
  /// Maximum days from creation to last write
  #[arg(long, value_name = "DAYS")]
  pub write_max_days: Option<f64>,
  /// Minimum days from last write to last access
  #[arg(long, value_name = "DAYS")]
  pub access_min_days: Option<f64>,
  /// Maximum days from last write to last access
  #[arg(long, value_name = "DAYS")]
  pub access_max_days: Option<f64>,
  /// Forbidden hour window, START-END in local time (e.g. 22-10 wraps midnight)
  #[arg(long, value_name = "START-END")]
  pub forbidden: Option<String>,
  /// Seed for reproducible output
  #[arg(long)]
  pub seed: Option<u64>,
  /// Redraws per timestamp before giving up
  #[arg(long)]
  pub max_attempts: Option<u32>,
}

/// Subcommands for `filestamp config`
#[derive(Subcommand)]
pub enum ConfigCommand {
  /// Show current effective configuration
  #[command(long_about = "Show the current effective configuration.\n\n\
    Displays which config file is being used and its contents as TOML.")]
  Show {
    /// Config file to show instead of the discovered one
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
  },
  /// Initialize a config file (.filestamp.toml) in the current directory
  Init {
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
  },
  /// Print the project and user config locations
  Path,
}

#[derive(Subcommand)]
enum Commands {
  /// Stamp files, or every regular file directly inside a directory
  #[command(after_help = "\
NOTES:
  Directories are not searched recursively; subdirectories are skipped.
  Creation time is only settable on Windows and macOS. Elsewhere it is skipped
  unless --require-creation-time turns that into an error.
  By default a failing file does not stop the run; all failures are reported
  at the end. Use --abort-on-error to stop at the first one.")]
  Apply {
    /// Files or directories to stamp
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// Generate and print timestamps without writing them
    #[arg(long)]
    dry_run: bool,
    /// Stop a directory run at the first failing file
    #[arg(long)]
    abort_on_error: bool,
    /// Fail where the creation time cannot be set
    #[arg(long)]
    require_creation_time: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
    #[command(flatten)]
    policy: PolicyArgs,
  },
  /// Print generated timestamp triples without touching any file
  Preview {
    /// Number of triples to generate
    #[arg(short = 'n', long, default_value = "5")]
    count: usize,
    /// Output as JSON
    #[arg(long)]
    json: bool,
    #[command(flatten)]
    policy: PolicyArgs,
  },
  /// Manage configuration
  #[command(after_help = "\
CONFIG LOCATIONS:
  Project: ./.filestamp.toml
  User:    ~/.config/filestamp/config.toml")]
  Config {
    #[command(subcommand)]
    command: ConfigCommand,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  // config subcommands must work even when the discovered file is broken
  let mut config = match &cli.command {
    Commands::Apply { policy, .. } | Commands::Preview { policy, .. } => load_config(policy)?,
    Commands::Config { .. } => Config::default(),
  };

  // Keep the guard alive until exit so buffered file logs are flushed
  let _guard = init_cli_logging(&config.logging);

  match cli.command {
    Commands::Apply {
      paths,
      dry_run,
      abort_on_error,
      require_creation_time,
      json,
      policy: _,
    } => {
      if abort_on_error {
        config.apply.on_error = filestamp_core::OnError::Abort;
      }
      if require_creation_time {
        config.apply.require_creation_time = true;
      }
      cmd_apply(&config, &paths, dry_run, json)
    }
    Commands::Preview { count, json, policy: _ } => cmd_preview(&config, count, json),
    Commands::Config { command } => match command {
      ConfigCommand::Show { config: path } => cmd_config_show(path.as_deref()),
      ConfigCommand::Init { force } => cmd_config_init(force),
      ConfigCommand::Path => cmd_config_path(),
    },
  }
}
