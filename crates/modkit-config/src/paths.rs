//! Config file discovery
//!
//! Candidates are checked in a fixed order and the first existing file wins.
//! Every `app.config.*` file is the dynamic config; the legacy `app.json` is
//! the static config. Both are reported when both exist.

use crate::errors::ConfigError;
use modkit_core::RunContext;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Dynamic candidates, data variants before script variants
pub const DYNAMIC_CONFIG_CANDIDATES: [&str; 8] = [
    "app.config.json",
    "app.config.toml",
    "app.config.yaml",
    "app.config.yml",
    "app.config.ts",
    "app.config.js",
    "app.config.mjs",
    "app.config.cjs",
];

pub const STATIC_CONFIG_FILE: &str = "app.json";

/// How a config file is turned into a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFileKind {
    Json,
    Toml,
    Yaml,
    Script,
}

impl ConfigFileKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => ConfigFileKind::Toml,
            Some("yaml" | "yml") => ConfigFileKind::Yaml,
            Some("ts" | "js" | "mjs" | "cjs" | "mts" | "cts") => ConfigFileKind::Script,
            _ => ConfigFileKind::Json,
        }
    }

    pub fn is_script(self) -> bool {
        self == ConfigFileKind::Script
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFilePaths {
    pub static_config_path: Option<PathBuf>,
    pub dynamic_config_path: Option<PathBuf>,
}

/// Locate the config files for `project_root`
///
/// A custom path registered in the run context replaces discovery entirely.
/// Script files become the dynamic config, data files the static one.
pub fn get_config_file_paths(project_root: &Path, ctx: &RunContext) -> Result<ConfigFilePaths, ConfigError> {
    if let Some(custom) = ctx.config_paths.get(project_root) {
        let custom = if custom.is_absolute() {
            custom
        } else {
            project_root.join(custom)
        };
        if !custom.is_file() {
            return Err(ConfigError::ModuleNotFound {
                what: "custom config file",
                path: custom,
            });
        }
        debug!("Using custom config path {}", custom.display());
        return Ok(if ConfigFileKind::from_path(&custom).is_script() {
            ConfigFilePaths {
                static_config_path: None,
                dynamic_config_path: Some(custom),
            }
        } else {
            ConfigFilePaths {
                static_config_path: Some(custom),
                dynamic_config_path: None,
            }
        });
    }

    Ok(ConfigFilePaths {
        static_config_path: find_static_config_path(project_root),
        dynamic_config_path: find_dynamic_config_path(project_root),
    })
}

pub fn find_dynamic_config_path(project_root: &Path) -> Option<PathBuf> {
    DYNAMIC_CONFIG_CANDIDATES
        .iter()
        .map(|name| project_root.join(name))
        .find(|path| path.is_file())
}

pub fn find_static_config_path(project_root: &Path) -> Option<PathBuf> {
    let path = project_root.join(STATIC_CONFIG_FILE);
    path.is_file().then_some(path)
}
