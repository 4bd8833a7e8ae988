//! Randomized, window-constrained file timestamps.
//!
//! A [`TimestampGenerator`] draws a creation / last-write / last-access triple
//! from an [`OffsetPolicy`], keeps every timestamp outside a daily
//! [`TimeWindowPolicy`], and writes the result to file metadata.

mod apply;
mod error;
mod generator;
mod policy;
mod window;

pub mod config;
pub mod dirs;

pub use apply::{AppliedFile, CreationTimeMode, apply_to_file, creation_time_supported};
pub use config::{Config, ConfigError};
pub use error::{FileFailure, StampError, TimestampField};
pub use generator::{
  ApplyOptions, DEFAULT_MAX_ATTEMPTS, DirectoryReport, FileTimeTriple, OnError, TimestampGenerator,
};
pub use policy::{OffsetPolicy, OffsetRange, SECONDS_PER_DAY};
pub use window::TimeWindowPolicy;
