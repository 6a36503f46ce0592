//! KDL configuration parsing for stack teardown.
//!
//! This crate handles parsing of:
//! - The purge configuration file (teardown.kdl)
//! - Named parameters consulted by the purge workflow

pub mod error;
pub mod purge;

pub use error::{ConfigError, ConfigResult};
pub use purge::{PurgeConfig, SUPPRESS_CONFIRMATION, load_config, parse_config};
