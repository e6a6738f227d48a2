//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use quadtile_coords::{CoordSystemKind, DisplayKind};
use quadtile_geom::TileGeomSettings;
use quadtile_quadtree::QuadNode;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Manager-wide geometry options: pole caps and skirts.
pub use quadtile_geom::ManagerOptions as ManagerConfig;

/// Top-level configuration of one tile layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Per-tile geometry settings.
    pub geometry: TileGeomSettings,
    /// Manager options.
    pub manager: ManagerConfig,
    /// Quad tree layout.
    pub tree: TreeConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Quad tree layout and display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TreeConfig {
    /// Shallowest level tiles are loaded at.
    pub min_level: u8,
    /// Deepest level tiles are loaded at.
    pub max_level: u8,
    /// Coordinate system the tree is laid out in.
    pub coord_system: CoordSystemKind,
    /// Globe or flat map display.
    pub display: DisplayKind,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            min_level: 0,
            max_level: 6,
            coord_system: CoordSystemKind::default(),
            display: DisplayKind::default(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for quadtile, if the platform has one.
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("quadtile"))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

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

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Reject values a layer cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.geometry
            .validate()
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let tree = &self.tree;
        if tree.min_level > tree.max_level || tree.max_level > QuadNode::MAX_LEVEL {
            return Err(ConfigError::InvalidValue(format!(
                "level range {}..={} must be ordered and at most {}",
                tree.min_level,
                tree.max_level,
                QuadNode::MAX_LEVEL
            )));
        }

        let factor = self.manager.skirt_factor;
        if !factor.is_finite() || factor < 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "skirt factor must be a non-negative number, got {factor}"
            )));
        }
        Ok(())
    }
}
