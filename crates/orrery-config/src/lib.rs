//! Configuration for the orrery.
//!
//! Settings persist to disk as `config.ron` in the platform config directory
//! and can be overridden per run from the command line. Only presentation
//! settings live here: window size, asset locations, and logging. The scene
//! itself is fixed.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{AssetConfig, CONFIG_FILE_NAME, Config, DebugConfig, WindowConfig};
pub use error::ConfigError;
