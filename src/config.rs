//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/wbscmp/wbscmp.toml`
//! 3. Local config: `<project_dir>/.wbscmp.toml`
//! 4. Environment variables: `WBSCMP_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Comparison tree rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TreeConfig {
    /// Levels shown below the roots' level (2 = level-1 rows expanded)
    pub depth: usize,
    /// Keep branches where no proposal carries value
    pub show_empty: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            depth: 2,
            show_empty: false,
        }
    }
}

/// Money formatting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    pub currency_symbol: String,
    /// Fraction digits in the comparison tree
    pub tree_decimals: usize,
    /// Fraction digits in detail and sheet views
    pub detail_decimals: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "R$".into(),
            tree_decimals: 0,
            detail_decimals: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreeConfig {
    pub depth: Option<usize>,
    pub show_empty: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplayConfig {
    pub currency_symbol: Option<String>,
    pub tree_decimals: Option<usize>,
    pub detail_decimals: Option<usize>,
}

/// Raw settings for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub snapshot: Option<PathBuf>,
    pub tree: RawTreeConfig,
    pub display: RawDisplayConfig,
}

impl TreeConfig {
    fn merge(&self, overlay: &RawTreeConfig) -> Self {
        Self {
            depth: overlay.depth.unwrap_or(self.depth),
            show_empty: overlay.show_empty.unwrap_or(self.show_empty),
        }
    }
}

impl DisplayConfig {
    fn merge(&self, overlay: &RawDisplayConfig) -> Self {
        Self {
            currency_symbol: overlay
                .currency_symbol
                .clone()
                .unwrap_or_else(|| self.currency_symbol.clone()),
            tree_decimals: overlay.tree_decimals.unwrap_or(self.tree_decimals),
            detail_decimals: overlay.detail_decimals.unwrap_or(self.detail_decimals),
        }
    }
}

/// Unified configuration for wbscmp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Snapshot file with WBS, proposals, items and linkages
    pub snapshot: PathBuf,
    pub tree: TreeConfig,
    pub display: DisplayConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snapshot: default_snapshot_path(),
            tree: TreeConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

/// Default snapshot location (`$XDG_DATA_HOME/wbscmp/snapshot.json`).
fn default_snapshot_path() -> PathBuf {
    ProjectDirs::from("", "", "wbscmp")
        .map(|dirs| dirs.data_dir().join("snapshot.json"))
        .unwrap_or_else(|| PathBuf::from("snapshot.json"))
}

/// Get the XDG config directory for wbscmp.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "wbscmp").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("wbscmp.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".wbscmp.toml")
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Expand `path` and resolve it against `dir` when still relative.
fn anchor_to(dir: &Path, path: &Path) -> PathBuf {
    let expanded = PathBuf::from(expand_env_vars(path.to_string_lossy().as_ref()));
    if expanded.is_relative() {
        dir.join(expanded)
    } else {
        expanded
    }
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in the snapshot path.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.snapshot.to_string_lossy().as_ref());
        self.snapshot = PathBuf::from(expanded);
    }

    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            snapshot: overlay
                .snapshot
                .clone()
                .unwrap_or_else(|| self.snapshot.clone()),
            tree: self.tree.merge(&overlay.tree),
            display: self.display.merge(&overlay.display),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a local `.wbscmp.toml`
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let mut raw = load_raw_settings(&local_path)?;
                raw.snapshot = raw.snapshot.map(|path| anchor_to(dir, &path));
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply WBSCMP_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("WBSCMP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("snapshot") {
            settings.snapshot = PathBuf::from(val);
        }
        if let Ok(val) = config.get_int("tree.depth") {
            settings.tree.depth = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("tree.depth must be non-negative, got {val}"),
            })?;
        }
        if let Ok(val) = config.get_bool("tree.show_empty") {
            settings.tree.show_empty = val;
        }
        if let Ok(val) = config.get_string("display.currency_symbol") {
            settings.display.currency_symbol = val;
        }
        if let Ok(val) = config.get_int("display.tree_decimals") {
            settings.display.tree_decimals = usize::try_from(val).unwrap_or(0);
        }
        if let Ok(val) = config.get_int("display.detail_decimals") {
            settings.display.detail_decimals = usize::try_from(val).unwrap_or(0);
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# wbscmp configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/wbscmp/wbscmp.toml
#   Local:  <project>/.wbscmp.toml
#   Env:    WBSCMP_* environment variables (WBSCMP_TREE__DEPTH=3)

# Snapshot file with WBS, proposals, items and linkages
# snapshot = "~/.local/share/wbscmp/snapshot.json"

[tree]
# Levels shown in the comparison tree
# depth = 2

# Keep branches without any value
# show_empty = false

[display]
# currency_symbol = "R$"
# tree_decimals = 0
# detail_decimals = 2
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
