use crate::errors::ConfigError;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// The subset of `package.json` the resolver reads defaults from
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(skip)]
    pub path: PathBuf,
}

impl PackageJson {
    /// Read `{project_root}/package.json`; the file is required
    pub fn read(project_root: &Path) -> Result<Self, ConfigError> {
        let path = project_root.join("package.json");
        if !path.is_file() {
            return Err(ConfigError::ModuleNotFound {
                what: "package.json",
                path,
            });
        }

        let content = fs::read_to_string(&path)?;
        let value: Value =
            serde_json::from_str(&content).map_err(|err| ConfigError::InvalidFormat {
                path: path.clone(),
                message: err.to_string(),
            })?;
        if !value.is_object() {
            return Err(ConfigError::NotObject { path });
        }

        let mut package: PackageJson =
            serde_json::from_value(value).map_err(|err| ConfigError::InvalidFormat {
                path: path.clone(),
                message: err.to_string(),
            })?;
        package.path = path;
        Ok(package)
    }
}
