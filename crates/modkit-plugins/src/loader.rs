//! Turning a resolved module into a callable config plugin
//!
//! modkit does not execute plugin modules itself. Embedders implement
//! [`PluginLoader`], or register native plugins in a [`PluginCatalog`] keyed by
//! the module file or the package that ships them.

use crate::resolution::ResolvedModule;
use ahash::AHashMap;
use modkit_core::ConfigPlugin;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

pub trait PluginLoader: Send + Sync {
    /// The plugin exported by `module`, `None` when it exports no plugin
    fn load(&self, module: &ResolvedModule) -> Option<ConfigPlugin>;
}

/// In-process registry of plugins by module path and by package name
#[derive(Debug, Default, Clone)]
pub struct PluginCatalog {
    by_path: AHashMap<PathBuf, ConfigPlugin>,
    by_package: AHashMap<String, ConfigPlugin>,
}

impl PluginCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the plugin exported by a module file
    pub fn register_path(&mut self, path: &Path, plugin: ConfigPlugin) {
        self.by_path.insert(canonical(path), plugin);
    }

    /// Register the plugin exported by a package, whatever file resolution lands on
    pub fn register_package(&mut self, package_name: impl Into<String>, plugin: ConfigPlugin) {
        self.by_package.insert(package_name.into(), plugin);
    }

    pub fn with_package(mut self, package_name: impl Into<String>, plugin: ConfigPlugin) -> Self {
        self.register_package(package_name, plugin);
        self
    }

    pub fn with_path(mut self, path: &Path, plugin: ConfigPlugin) -> Self {
        self.register_path(path, plugin);
        self
    }

    pub fn len(&self) -> usize {
        self.by_path.len() + self.by_package.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty() && self.by_package.is_empty()
    }
}

impl PluginLoader for PluginCatalog {
    fn load(&self, module: &ResolvedModule) -> Option<ConfigPlugin> {
        if let Some(plugin) = self.by_path.get(&canonical(&module.path)) {
            trace!("Catalog hit by path for {}", module.request);
            return Some(plugin.clone());
        }
        let by_package = module
            .package_name
            .as_deref()
            .and_then(|name| self.by_package.get(name));
        if by_package.is_some() {
            trace!("Catalog hit by package for {}", module.request);
        }
        by_package.cloned()
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modkit_core::AppConfig;
    use tempfile::TempDir;

    fn plugin(name: &str) -> ConfigPlugin {
        ConfigPlugin::new(name, |config: AppConfig, _| Ok(config))
    }

    fn module(path: PathBuf, package_name: Option<&str>) -> ResolvedModule {
        ResolvedModule {
            request: "test".to_string(),
            path,
            package_root: None,
            package_name: package_name.map(str::to_string),
            via_plugin_entry: false,
        }
    }

    #[test]
    fn test_path_match_wins_over_package() {
        let Ok(tmp) = TempDir::new() else {
            return;
        };
        let file = tmp.path().join("app.plugin.js");
        let _ = fs::write(&file, "");

        let catalog = PluginCatalog::new()
            .with_path(&file, plugin("by-path"))
            .with_package("pkg", plugin("by-package"));

        let loaded = catalog.load(&module(file, Some("pkg")));
        assert!(loaded.is_some_and(|p| p.name() == "by-path"));
    }

    #[test]
    fn test_package_match_and_miss() {
        let catalog = PluginCatalog::new().with_package("pkg", plugin("by-package"));
        let hit = catalog.load(&module(PathBuf::from("/nowhere/index.js"), Some("pkg")));
        assert!(hit.is_some_and(|p| p.name() == "by-package"));

        let miss = catalog.load(&module(PathBuf::from("/nowhere/index.js"), Some("other")));
        assert!(miss.is_none());
        assert_eq!(catalog.len(), 1);
    }
}
