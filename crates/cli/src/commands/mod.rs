//! CLI command implementations

mod apply;
mod config;
mod preview;

pub use apply::cmd_apply;
pub use config::{cmd_config_init, cmd_config_path, cmd_config_show, load_config};
pub use preview::cmd_preview;
