//! Per-user directories for configuration and logs.

use std::io;
use std::path::{Path, PathBuf};

use orrery_config::{Config, ConfigError};

/// Errors that can occur while resolving or creating the directories.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The OS did not provide a configuration directory.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A directory could not be created.
    #[error("platform I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Directories the orrery reads from and writes to.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// Holds `orrery.log` in debug builds.
    pub log_dir: PathBuf,
}

impl PlatformDirs {
    /// Resolve without touching the disk. `config_override` replaces the
    /// platform config directory (`--config` on the command line).
    pub fn resolve(config_override: Option<&Path>) -> Result<Self, PlatformError> {
        let config_dir = match config_override {
            Some(dir) => dir.to_path_buf(),
            None => Config::default_dir()?,
        };
        Ok(Self::with_root(config_dir))
    }

    /// Lay the directories out under `config_dir`.
    pub fn with_root(config_dir: PathBuf) -> Self {
        let log_dir = config_dir.join("logs");
        Self {
            config_dir,
            log_dir,
        }
    }

    /// Create both directories on disk.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}
