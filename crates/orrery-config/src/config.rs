//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the persisted configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub assets: AssetConfig,
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial width in logical pixels.
    pub width: u32,
    /// Initial height in logical pixels.
    pub height: u32,
    pub title: String,
}

/// Where shaders and images are read from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Asset root; relative paths resolve against the working directory.
    pub root: PathBuf,
    /// Image used for all six skybox faces.
    pub sky_image: String,
    pub earth_image: String,
    pub sun_image: String,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter used when `RUST_LOG` is unset (e.g. "debug", "info,wgpu=warn").
    /// Empty selects the built-in filter, which quiets wgpu and naga.
    pub log_level: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Orrery".to_string(),
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            sky_image: "sky.jpg".to_string(),
            earth_image: "earth.jpg".to_string(),
            sun_image: "sun.jpg".to_string(),
        }
    }
}

impl AssetConfig {
    /// Directory holding `planet.wgsl` and `skybox.wgsl`.
    pub fn shader_dir(&self) -> PathBuf {
        self.root.join("shaders")
    }

    /// Path of an image under `<root>/textures`.
    pub fn texture_path(&self, file_name: &str) -> PathBuf {
        self.root.join("textures").join(file_name)
    }

    pub fn sky_path(&self) -> PathBuf {
        self.texture_path(&self.sky_image)
    }

    pub fn earth_path(&self) -> PathBuf {
        self.texture_path(&self.earth_image)
    }

    pub fn sun_path(&self) -> PathBuf {
        self.texture_path(&self.sun_image)
    }
}

// --- Load / Save ---

impl Config {
    /// Platform default config directory (`<config_dir>/orrery`).
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("orrery"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Like [`load_or_create`](Self::load_or_create), but any failure yields
    /// the defaults. The failure is handed back so it can be reported once
    /// logging is up.
    pub fn load_or_default(config_dir: &Path) -> (Self, Option<ConfigError>) {
        match Self::load_or_create(config_dir) {
            Ok(config) => (config, None),
            Err(err) => (Config::default(), Some(err)),
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE_NAME), serialized)
            .map_err(ConfigError::WriteError)?;
        Ok(())
    }
}
