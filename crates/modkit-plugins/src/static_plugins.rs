//! Declarative plugin lists
//!
//! The `plugins` field of a config holds names, `[name, props]` pairs or
//! `{ "resolve": name, "props": ... }` objects. Each is normalized to a
//! [`StaticPluginRef`], resolved to a [`ConfigPlugin`] and composed in order.

use crate::loader::PluginLoader;
use crate::resolution::ModuleResolver;
use modkit_core::{with_plugin, AppConfig, ConfigPlugin, PluginEntry, PluginError};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

pub const PLUGINS_KEY: &str = "plugins";

/// What a static plugin reference points at
#[derive(Debug, Clone)]
pub enum PluginSource {
    Name(String),
    Plugin(ConfigPlugin),
}

/// A plugin reference normalized to the `(source, props)` pair form
#[derive(Debug, Clone)]
pub struct StaticPluginRef {
    pub source: PluginSource,
    pub props: Value,
}

impl StaticPluginRef {
    pub fn named(name: impl Into<String>) -> Self {
        StaticPluginRef {
            source: PluginSource::Name(name.into()),
            props: Value::Null,
        }
    }

    pub fn with_props(mut self, props: Value) -> Self {
        self.props = props;
        self
    }

    /// Parse one element of a declarative `plugins` list
    pub fn parse(value: &Value) -> Result<Self, PluginError> {
        match value {
            Value::String(name) => Ok(Self::named(name.as_str())),
            Value::Array(items) if (1..=2).contains(&items.len()) => match &items[0] {
                Value::String(name) => Ok(Self::named(name.as_str())
                    .with_props(items.get(1).cloned().unwrap_or(Value::Null))),
                other => Err(invalid_entry(other)),
            },
            Value::Object(map) => match map.get("resolve") {
                Some(Value::String(name)) => Ok(Self::named(name.as_str())
                    .with_props(map.get("props").cloned().unwrap_or(Value::Null))),
                _ => Err(invalid_entry(value)),
            },
            other => Err(invalid_entry(other)),
        }
    }

    /// Human-readable name used in logs and errors
    pub fn display_name(&self) -> &str {
        match &self.source {
            PluginSource::Name(name) => name,
            PluginSource::Plugin(plugin) => plugin.name(),
        }
    }
}

impl From<ConfigPlugin> for StaticPluginRef {
    fn from(plugin: ConfigPlugin) -> Self {
        StaticPluginRef {
            source: PluginSource::Plugin(plugin),
            props: Value::Null,
        }
    }
}

impl From<(ConfigPlugin, Value)> for StaticPluginRef {
    fn from((plugin, props): (ConfigPlugin, Value)) -> Self {
        StaticPluginRef {
            source: PluginSource::Plugin(plugin),
            props,
        }
    }
}

fn invalid_entry(value: &Value) -> PluginError {
    PluginError::InvalidType(format!(
        "expected a plugin name, a [name, props] pair or {{ resolve, props }}, got {}",
        value
    ))
}

/// Resolve a plugin source to a callable plugin; callables pass through unchanged
pub fn resolve_config_plugin(
    project_root: &Path,
    source: &PluginSource,
    loader: &dyn PluginLoader,
) -> Result<ConfigPlugin, PluginError> {
    let name = match source {
        PluginSource::Plugin(plugin) => return Ok(plugin.clone()),
        PluginSource::Name(name) => name,
    };

    let module = ModuleResolver::new()
        .resolve_plugin_module(project_root, name)
        .map_err(|reason| PluginError::NotFound {
            request: name.clone(),
            project_root: project_root.to_path_buf(),
            reason,
        })?;

    loader
        .load(&module)
        .ok_or_else(|| PluginError::InvalidImport {
            request: name.clone(),
            path: module.path.clone(),
        })
}

pub struct StaticPluginOptions<'a> {
    pub plugin: StaticPluginRef,
    /// Applied when `plugin` cannot be resolved at all
    pub fallback: Option<StaticPluginRef>,
    pub project_root: &'a Path,
}

/// Resolve and apply one static plugin, falling back when it is not installed
pub fn with_static_plugin(
    config: AppConfig,
    options: StaticPluginOptions<'_>,
    loader: &dyn PluginLoader,
) -> Result<AppConfig, PluginError> {
    let StaticPluginOptions {
        plugin,
        fallback,
        project_root,
    } = options;

    match resolve_config_plugin(project_root, &plugin.source, loader) {
        Ok(resolved) => with_plugin(config, PluginEntry::new(resolved, plugin.props)),
        Err(err @ PluginError::NotFound { .. }) => {
            let Some(fallback) = fallback else {
                return Err(err);
            };
            warn!(
                "Plugin {} could not be resolved, applying fallback {}",
                plugin.display_name(),
                fallback.display_name()
            );
            let props = if fallback.props.is_null() {
                plugin.props
            } else {
                fallback.props
            };
            let resolved = resolve_config_plugin(project_root, &fallback.source, loader)?;
            with_plugin(config, PluginEntry::new(resolved, props))
        }
        Err(err) => Err(err),
    }
}

/// Compose every entry of the config's `plugins` field, in order
pub fn apply_static_plugins(
    config: AppConfig,
    project_root: &Path,
    loader: &dyn PluginLoader,
) -> Result<AppConfig, PluginError> {
    let refs = match config.get(PLUGINS_KEY) {
        None | Some(Value::Null) => return Ok(config),
        Some(Value::Array(items)) => items
            .iter()
            .map(StaticPluginRef::parse)
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(PluginError::InvalidType(format!(
                "`plugins` must be an array, got {}",
                other
            )))
        }
    };

    debug!("Applying {} static plugins", refs.len());
    with_static_plugins(config, project_root, refs, loader)
}

/// Compose an explicit list of static plugin references, in order
pub fn with_static_plugins<I>(
    config: AppConfig,
    project_root: &Path,
    plugins: I,
    loader: &dyn PluginLoader,
) -> Result<AppConfig, PluginError>
where
    I: IntoIterator<Item = StaticPluginRef>,
{
    plugins.into_iter().try_fold(config, |config, plugin| {
        with_static_plugin(
            config,
            StaticPluginOptions {
                plugin,
                fallback: None,
                project_root,
            },
            loader,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::PluginCatalog;
    use crate::resolution::PLUGIN_ENTRY_FILE;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn appending(name: &'static str) -> ConfigPlugin {
        ConfigPlugin::new(name, move |mut config, props| {
            let mut items = config
                .get("applied")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            items.push(json!(name));
            if !props.is_null() {
                items.push(props.clone());
            }
            config.set("applied", items);
            Ok(config)
        })
    }

    fn install_package(root: &Path, name: &str) {
        let pkg = root.join("node_modules").join(name);
        let _ = fs::create_dir_all(&pkg);
        let _ = fs::write(pkg.join("package.json"), format!(r#"{{"name": "{}"}}"#, name));
        let _ = fs::write(pkg.join(PLUGIN_ENTRY_FILE), "");
    }

    #[test]
    fn test_parse_accepts_every_declarative_shape() {
        let bare = StaticPluginRef::parse(&json!("my-plugin"));
        assert!(bare.is_ok_and(|r| r.display_name() == "my-plugin" && r.props.is_null()));

        let pair = StaticPluginRef::parse(&json!(["my-plugin", {"foo": 1}]));
        assert!(pair.is_ok_and(|r| r.props == json!({"foo": 1})));

        let object = StaticPluginRef::parse(&json!({"resolve": "my-plugin", "props": [1]}));
        assert!(object.is_ok_and(|r| r.display_name() == "my-plugin" && r.props == json!([1])));
    }

    #[test]
    fn test_parse_rejects_invalid_entries() {
        for value in [json!(42), json!([]), json!(["a", {}, 3]), json!([1]), json!({"props": {}})] {
            let result = StaticPluginRef::parse(&value);
            assert!(result.is_err_and(|e| e.code() == "INVALID_PLUGIN_TYPE"));
        }
    }

    #[test]
    fn test_apply_static_plugins_in_order() {
        let Ok(tmp) = TempDir::new() else {
            return;
        };
        install_package(tmp.path(), "plugin-a");
        install_package(tmp.path(), "plugin-b");
        let catalog = PluginCatalog::new()
            .with_package("plugin-a", appending("a"))
            .with_package("plugin-b", appending("b"));

        let config = AppConfig::new().with_field("plugins", json!(["plugin-a", ["plugin-b", 7]]));
        let result = apply_static_plugins(config, tmp.path(), &catalog);
        assert!(result.is_ok_and(|c| c.get("applied") == Some(&json!(["a", "b", 7]))));
    }

    #[test]
    fn test_missing_plugin_is_not_found() {
        let Ok(tmp) = TempDir::new() else {
            return;
        };
        let config = AppConfig::new().with_field("plugins", json!(["ghost"]));
        let result = apply_static_plugins(config, tmp.path(), &PluginCatalog::new());
        assert!(result.is_err_and(|e| e.code() == "PLUGIN_NOT_FOUND" && e.to_string().contains("ghost")));
    }

    #[test]
    fn test_resolved_module_without_export_is_invalid_import() {
        let Ok(tmp) = TempDir::new() else {
            return;
        };
        install_package(tmp.path(), "no-export");
        let config = AppConfig::new().with_field("plugins", json!(["no-export"]));
        let result = apply_static_plugins(config, tmp.path(), &PluginCatalog::new());
        assert!(result.is_err_and(|e| e.code() == "INVALID_PLUGIN_IMPORT"));
    }

    #[test]
    fn test_fallback_applied_when_plugin_missing() {
        let Ok(tmp) = TempDir::new() else {
            return;
        };
        let options = StaticPluginOptions {
            plugin: StaticPluginRef::named("not-installed").with_props(json!("props")),
            fallback: Some(StaticPluginRef::from(appending("fallback"))),
            project_root: tmp.path(),
        };
        let result = with_static_plugin(AppConfig::new(), options, &PluginCatalog::new());
        assert!(result.is_ok_and(|c| c.get("applied") == Some(&json!(["fallback", "props"]))));
    }

    #[test]
    fn test_callable_passes_through_unchanged() {
        let source = PluginSource::Plugin(appending("inline"));
        let resolved = resolve_config_plugin(Path::new("/nowhere"), &source, &PluginCatalog::new());
        assert!(resolved.is_ok_and(|p| p.name() == "inline"));
    }

    #[test]
    fn test_non_array_plugins_field_rejected() {
        let config = AppConfig::new().with_field("plugins", json!("single"));
        let result = apply_static_plugins(config, Path::new("/nowhere"), &PluginCatalog::new());
        assert!(result.is_err_and(|e| e.code() == "INVALID_PLUGIN_TYPE"));
    }
}
