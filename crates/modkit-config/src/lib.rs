//! Config resolution for modkit
//!
//! Locates the app config (`app.config.*` or the legacy `app.json`), evaluates
//! it, merges package metadata defaults and applies the declared static
//! plugins.

pub mod defaults;
pub mod errors;
pub mod evaluate;
pub mod modify;
pub mod package_json;
pub mod paths;
pub mod public;
pub mod resolver;

pub use errors::ConfigError;
pub use evaluate::{
    ConfigContext, ConfigFunction, DynamicExport, Evaluated, FnEvaluator, NodeEvaluator,
    ScriptEvaluator,
};
pub use modify::{modify_config, ModifyConfigResult};
pub use paths::{get_config_file_paths, ConfigFilePaths};
pub use resolver::{ConfigResolver, GetConfigOptions, ProjectConfig};

use modkit_core::{AppConfig, RunContext};
use std::path::Path;

/// Resolve the config with the default evaluator and an empty plugin catalog
pub fn get_config(
    project_root: &Path,
    options: GetConfigOptions,
    ctx: &RunContext,
) -> Result<ProjectConfig, ConfigError> {
    ConfigResolver::default().get_config(project_root, options, ctx)
}

/// Fully resolved config with `_internal`, hooks and signing fields removed
pub fn get_public_config(project_root: &Path, ctx: &RunContext) -> Result<AppConfig, ConfigError> {
    ConfigResolver::default().get_public_config(project_root, ctx)
}
