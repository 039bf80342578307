//! Turning config files into JSON values
//!
//! Data files (JSON, TOML, YAML) are parsed in-process. Script files go through
//! a [`ScriptEvaluator`], which reports up front whether the module exported a
//! value or a function of the request context.

mod code_frame;
mod node;

pub use code_frame::code_frame;
pub use node::NodeEvaluator;

use crate::errors::ConfigError;
use crate::paths::ConfigFileKind;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Request context handed to a config function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigContext {
    pub project_root: PathBuf,
    pub static_config_path: Option<PathBuf>,
    pub package_json_path: PathBuf,
    /// Static config with defaults applied
    pub config: Value,
}

/// Result of calling a config function
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluated {
    Ready(Value),
    /// The function returned a promise or other deferred value
    Pending,
}

pub trait ConfigFunction: Send + Sync {
    fn call(&self, ctx: &ConfigContext) -> Result<Evaluated, ConfigError>;
}

/// What a config script exports, decided once at load time
pub enum DynamicExport {
    Value(Value),
    Function(Box<dyn ConfigFunction>),
}

pub trait ScriptEvaluator: Send + Sync {
    fn load(&self, path: &Path) -> Result<DynamicExport, ConfigError>;
}

/// Parse a JSON, TOML or YAML config file
pub fn read_data_file(path: &Path) -> Result<Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    let invalid = |message: String| ConfigError::InvalidFormat {
        path: path.to_path_buf(),
        message,
    };

    match ConfigFileKind::from_path(path) {
        ConfigFileKind::Toml => toml::from_str(&content).map_err(|e| invalid(e.to_string())),
        ConfigFileKind::Yaml => serde_yaml::from_str(&content).map_err(|e| invalid(e.to_string())),
        ConfigFileKind::Json | ConfigFileKind::Script => {
            serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))
        }
    }
}

/// Evaluate a dynamic config file to a value
///
/// Function exports are called with `ctx`; a deferred result is rejected.
pub fn evaluate_config_file(
    path: &Path,
    evaluator: &dyn ScriptEvaluator,
    ctx: &ConfigContext,
) -> Result<Value, ConfigError> {
    if !ConfigFileKind::from_path(path).is_script() {
        return read_data_file(path);
    }

    debug!("Evaluating config script {}", path.display());
    match evaluator.load(path)? {
        DynamicExport::Value(value) => Ok(value),
        DynamicExport::Function(function) => match function.call(ctx)? {
            Evaluated::Ready(value) => Ok(value),
            Evaluated::Pending => Err(ConfigError::InvalidConfig(format!(
                "Config file {} cannot return a Promise; the exported function must resolve synchronously",
                path.display()
            ))),
        },
    }
}

type ContextFn = dyn Fn(&ConfigContext) -> Evaluated + Send + Sync;

#[derive(Clone)]
enum RegisteredExport {
    Value(Value),
    Function(Arc<ContextFn>),
}

struct ClosureFunction(Arc<ContextFn>);

impl ConfigFunction for ClosureFunction {
    fn call(&self, ctx: &ConfigContext) -> Result<Evaluated, ConfigError> {
        Ok((self.0)(ctx))
    }
}

/// In-process evaluator serving exports registered per file path
#[derive(Clone, Default)]
pub struct FnEvaluator {
    exports: AHashMap<PathBuf, RegisteredExport>,
}

impl FnEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, path: impl Into<PathBuf>, value: Value) -> Self {
        self.exports
            .insert(path.into(), RegisteredExport::Value(value));
        self
    }

    pub fn with_function<F>(mut self, path: impl Into<PathBuf>, function: F) -> Self
    where
        F: Fn(&ConfigContext) -> Evaluated + Send + Sync + 'static,
    {
        self.exports
            .insert(path.into(), RegisteredExport::Function(Arc::new(function)));
        self
    }
}

impl ScriptEvaluator for FnEvaluator {
    fn load(&self, path: &Path) -> Result<DynamicExport, ConfigError> {
        match self.exports.get(path) {
            Some(RegisteredExport::Value(value)) => Ok(DynamicExport::Value(value.clone())),
            Some(RegisteredExport::Function(function)) => Ok(DynamicExport::Function(Box::new(
                ClosureFunction(Arc::clone(function)),
            ))),
            None => Err(ConfigError::ModuleNotFound {
                what: "config module",
                path: path.to_path_buf(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn context(root: &Path) -> ConfigContext {
        ConfigContext {
            project_root: root.to_path_buf(),
            static_config_path: None,
            package_json_path: root.join("package.json"),
            config: json!({"name": "from-static"}),
        }
    }

    #[test]
    fn test_data_variants_parse_in_process() {
        let Ok(tmp) = TempDir::new() else {
            return;
        };
        let toml_path = tmp.path().join("app.config.toml");
        let yaml_path = tmp.path().join("app.config.yaml");
        let _ = fs::write(&toml_path, "name = \"toml\"\n[ios]\nbundleIdentifier = \"a.b\"\n");
        let _ = fs::write(&yaml_path, "name: yaml\nplatforms: [ios]\n");

        let evaluator = FnEvaluator::new();
        let ctx = context(tmp.path());
        let toml_value = evaluate_config_file(&toml_path, &evaluator, &ctx);
        assert!(toml_value.is_ok_and(|v| v == json!({"name": "toml", "ios": {"bundleIdentifier": "a.b"}})));
        let yaml_value = evaluate_config_file(&yaml_path, &evaluator, &ctx);
        assert!(yaml_value.is_ok_and(|v| v == json!({"name": "yaml", "platforms": ["ios"]})));
    }

    #[test]
    fn test_function_export_receives_context() {
        let path = PathBuf::from("/app/app.config.js");
        let evaluator = FnEvaluator::new().with_function(&path, |ctx| {
            let name = ctx.config.get("name").cloned().unwrap_or(Value::Null);
            Evaluated::Ready(json!({"name": name, "dynamic": true}))
        });

        let value = evaluate_config_file(&path, &evaluator, &context(Path::new("/app")));
        assert!(value.is_ok_and(|v| v == json!({"name": "from-static", "dynamic": true})));
    }

    #[test]
    fn test_pending_result_is_invalid_config() {
        let path = PathBuf::from("/app/app.config.ts");
        let evaluator = FnEvaluator::new().with_function(&path, |_| Evaluated::Pending);

        let result = evaluate_config_file(&path, &evaluator, &context(Path::new("/app")));
        assert!(result.is_err_and(|e| e.code() == "INVALID_CONFIG" && e.to_string().contains("Promise")));
    }

    #[test]
    fn test_invalid_data_file_is_invalid_format() {
        let Ok(tmp) = TempDir::new() else {
            return;
        };
        let path = tmp.path().join("app.config.json");
        let _ = fs::write(&path, "{ nope");
        let result = evaluate_config_file(&path, &FnEvaluator::new(), &context(tmp.path()));
        assert!(result.is_err_and(|e| e.code() == "INVALID_FORMAT"));
    }
}
