//! Explicitly owned run state shared by the config resolver and the compiler

use crate::warnings::WarningAggregator;
use ahash::AHashMap;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Project root to custom config file overrides
#[derive(Debug, Default)]
pub struct CustomConfigPaths {
    paths: RwLock<AHashMap<PathBuf, PathBuf>>,
}

impl CustomConfigPaths {
    pub fn set(&self, project_root: &Path, config_path: Option<&Path>) {
        let mut paths = self.paths.write();
        match config_path {
            Some(path) => {
                paths.insert(project_root.to_path_buf(), path.to_path_buf());
            }
            None => {
                paths.remove(project_root);
            }
        }
    }

    pub fn get(&self, project_root: &Path) -> Option<PathBuf> {
        self.paths.read().get(project_root).cloned()
    }

    pub fn clear(&self) {
        self.paths.write().clear();
    }
}

/// State that lives for one resolve + compile run
///
/// Created by the caller and passed by reference to `get_config` and
/// `compile_mods`; nothing in modkit keeps process-wide mutable state.
#[derive(Debug, Default)]
pub struct RunContext {
    /// Shared with every `ModRequest` of a compilation
    pub warnings: Arc<WarningAggregator>,
    pub config_paths: CustomConfigPaths,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run; config path overrides survive, warnings do not
    pub fn begin_run(&self) {
        self.warnings.begin_run();
    }
}
