//! Configuration loading and database path resolution

use crate::stage_model::{StageOverride, StageTable};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the database location
pub const DATABASE_ENV_VAR: &str = "HIREPATH_DATABASE";

const DEFAULT_LINK_OPACITY: f64 = 0.4;
const DEFAULT_CREATED_COLOR: &str = "#94a3b8";

/// Top-level configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Database file; see [`resolve_database_path`] for precedence
    pub database_path: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub graph: GraphConfig,
    /// Per-status overrides applied on top of the builtin stage table;
    /// omitted fields keep their builtin values
    pub stages: Vec<StageOverride>,
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Flow graph rendering section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Opacity of link colors relative to their source node, in (0, 1]
    pub link_opacity: f64,
    /// `#rrggbb` color of the CREATED intake node
    pub created_color: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            link_opacity: DEFAULT_LINK_OPACITY,
            created_color: DEFAULT_CREATED_COLOR.to_string(),
        }
    }
}

impl FlowConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid configuration: {}", e)))
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults when no file exists
    ///
    /// `explicit` wins over the platform config locations. A file that
    /// exists but does not parse is still an error.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match find_config_file() {
                Some(path) => path,
                None => {
                    warn!("No configuration file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            warn!("Configuration file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::load(&path)
    }

    /// Builtin stage table with this file's overrides applied
    pub fn stage_table(&self) -> StageTable {
        StageTable::default().with_overrides(self.stages.iter().cloned())
    }
}

/// Database path resolution, highest priority first:
/// 1. Explicit argument
/// 2. `HIREPATH_DATABASE` environment variable
/// 3. `database_path` from the configuration file
/// 4. OS-dependent default data directory
pub fn resolve_database_path(explicit: Option<&Path>, config: &FlowConfig) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.database_path {
        return path.clone();
    }

    default_database_path()
}

/// User config first, then system-wide (Linux only)
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("hirepath").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/hirepath/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default database path
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("hirepath"))
        .unwrap_or_else(|| PathBuf::from("./hirepath_data"))
        .join("hirepath.db")
}
