//! `get_config`: discovery, evaluation, defaults and static plugins

use crate::defaults::{apply_defaults, unwrap_wrapped_config, ResolvedPaths};
use crate::errors::ConfigError;
use crate::evaluate::{evaluate_config_file, read_data_file, ConfigContext, NodeEvaluator, ScriptEvaluator};
use crate::package_json::PackageJson;
use crate::paths::get_config_file_paths;
use crate::public::strip_private_fields;
use modkit_core::{AppConfig, RunContext};
use modkit_plugins::{apply_static_plugins, PluginCatalog, PluginLoader};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct GetConfigOptions {
    /// Return the config before the `plugins` list is applied
    pub skip_plugins: bool,
    /// Strip private fields, see [`crate::get_public_config`]
    pub is_public_config: bool,
}

/// A resolved config plus the files it was read from
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config: AppConfig,
    pub static_config_path: Option<PathBuf>,
    pub dynamic_config_path: Option<PathBuf>,
    pub package_json_path: PathBuf,
}

/// Resolves project configs with a pluggable script evaluator and plugin loader
pub struct ConfigResolver {
    evaluator: Box<dyn ScriptEvaluator>,
    loader: Box<dyn PluginLoader>,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        ConfigResolver::new(NodeEvaluator::new(), PluginCatalog::new())
    }
}

impl ConfigResolver {
    pub fn new(evaluator: impl ScriptEvaluator + 'static, loader: impl PluginLoader + 'static) -> Self {
        ConfigResolver {
            evaluator: Box::new(evaluator),
            loader: Box::new(loader),
        }
    }

    pub fn with_evaluator(mut self, evaluator: impl ScriptEvaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    pub fn with_loader(mut self, loader: impl PluginLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn loader(&self) -> &dyn PluginLoader {
        self.loader.as_ref()
    }

    pub fn get_config(
        &self,
        project_root: &Path,
        options: GetConfigOptions,
        ctx: &RunContext,
    ) -> Result<ProjectConfig, ConfigError> {
        let package = PackageJson::read(project_root)?;
        let paths = get_config_file_paths(project_root, ctx)?;
        let resolved_paths = ResolvedPaths {
            project_root: project_root.to_path_buf(),
            static_config_path: paths.static_config_path.clone(),
            dynamic_config_path: paths.dynamic_config_path.clone(),
            package_json_path: package.path.clone(),
        };

        let static_config = match &paths.static_config_path {
            Some(path) => {
                debug!("Reading static config {}", path.display());
                config_object(path, read_data_file(path)?)?
            }
            None => Map::new(),
        };

        let declared = match &paths.dynamic_config_path {
            Some(path) => {
                let request = ConfigContext {
                    project_root: project_root.to_path_buf(),
                    static_config_path: paths.static_config_path.clone(),
                    package_json_path: package.path.clone(),
                    config: Value::Object(apply_defaults(
                        static_config.clone(),
                        &package,
                        &resolved_paths,
                    )),
                };
                let value = evaluate_config_file(path, self.evaluator.as_ref(), &request)?;
                config_object(path, value)?
            }
            None => static_config,
        };

        let mut config = AppConfig::from_fields(apply_defaults(declared, &package, &resolved_paths));
        if !options.skip_plugins {
            config = apply_static_plugins(config, project_root, self.loader.as_ref())?;
        }
        if options.is_public_config {
            config = strip_private_fields(&config);
        }

        info!(
            "Resolved config for {} from {}",
            config.name().unwrap_or("<unnamed>"),
            paths
                .dynamic_config_path
                .as_deref()
                .or(paths.static_config_path.as_deref())
                .map_or_else(|| "package.json".to_string(), |p| p.display().to_string())
        );

        Ok(ProjectConfig {
            config,
            static_config_path: paths.static_config_path,
            dynamic_config_path: paths.dynamic_config_path,
            package_json_path: package.path,
        })
    }

    /// Fully resolved config with private fields removed
    pub fn get_public_config(&self, project_root: &Path, ctx: &RunContext) -> Result<AppConfig, ConfigError> {
        let options = GetConfigOptions {
            skip_plugins: false,
            is_public_config: true,
        };
        Ok(self.get_config(project_root, options, ctx)?.config)
    }
}

/// Object check plus the one-level legacy unwrap
fn config_object(path: &Path, value: Value) -> Result<Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(unwrap_wrapped_config(map)),
        _ => Err(ConfigError::NotObject {
            path: path.to_path_buf(),
        }),
    }
}
