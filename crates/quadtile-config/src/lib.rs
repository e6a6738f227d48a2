//! Configuration for quadtile layers.
//!
//! Settings persist to disk as `config.ron`, can be overridden from the
//! command line and reloaded at runtime. Missing sections and fields fall
//! back to defaults, unknown ones are ignored.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, ManagerConfig, TreeConfig, default_config_dir};
pub use error::ConfigError;
