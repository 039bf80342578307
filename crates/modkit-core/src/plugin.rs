//! Config plugins and the left-to-right plugin composer

use crate::config::AppConfig;
use crate::errors::PluginError;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

type PluginFn = dyn Fn(AppConfig, &Value) -> Result<AppConfig, PluginError> + Send + Sync;

/// A named `(config, props) -> config` transformation
///
/// Plugins may register mods as a side effect; they must not perform any
/// artifact I/O themselves.
#[derive(Clone)]
pub struct ConfigPlugin {
    name: Arc<str>,
    func: Arc<PluginFn>,
}

impl ConfigPlugin {
    pub fn new<F>(name: impl AsRef<str>, func: F) -> Self
    where
        F: Fn(AppConfig, &Value) -> Result<AppConfig, PluginError> + Send + Sync + 'static,
    {
        ConfigPlugin {
            name: Arc::from(name.as_ref()),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same function under another name
    pub fn renamed(&self, name: impl AsRef<str>) -> Self {
        ConfigPlugin {
            name: Arc::from(name.as_ref()),
            func: Arc::clone(&self.func),
        }
    }

    pub fn apply(&self, config: AppConfig, props: &Value) -> Result<AppConfig, PluginError> {
        (self.func)(config, props)
    }
}

impl fmt::Debug for ConfigPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigPlugin({})", self.name)
    }
}

/// A plugin paired with its props; bare plugins get `Value::Null`
#[derive(Debug, Clone)]
pub struct PluginEntry {
    pub plugin: ConfigPlugin,
    pub props: Value,
}

impl PluginEntry {
    pub fn new(plugin: ConfigPlugin, props: Value) -> Self {
        PluginEntry { plugin, props }
    }
}

impl From<ConfigPlugin> for PluginEntry {
    fn from(plugin: ConfigPlugin) -> Self {
        PluginEntry::new(plugin, Value::Null)
    }
}

impl From<(ConfigPlugin, Value)> for PluginEntry {
    fn from((plugin, props): (ConfigPlugin, Value)) -> Self {
        PluginEntry::new(plugin, props)
    }
}

/// Apply one plugin
pub fn with_plugin(
    config: AppConfig,
    entry: impl Into<PluginEntry>,
) -> Result<AppConfig, PluginError> {
    let entry = entry.into();
    debug!("Applying config plugin: {}", entry.plugin.name());
    entry.plugin.apply(config, &entry.props)
}

/// Reduce the plugins over the config, left to right
///
/// The config seen by plugin `n + 1` is exactly the output of plugin `n`. The
/// first failing plugin aborts the whole composition.
pub fn with_plugins<I>(config: AppConfig, plugins: I) -> Result<AppConfig, PluginError>
where
    I: IntoIterator,
    I::Item: Into<PluginEntry>,
{
    plugins
        .into_iter()
        .try_fold(config, |config, entry| with_plugin(config, entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn append(config: &mut AppConfig, value: Value) {
        if let Some(Value::Array(items)) = config.fields_mut().get_mut("extra") {
            items.push(value);
        }
    }

    fn p1() -> ConfigPlugin {
        ConfigPlugin::new("p1", |mut config, _props| {
            append(&mut config, json!("a"));
            Ok(config)
        })
    }

    fn p2() -> ConfigPlugin {
        ConfigPlugin::new("p2", |mut config, props| {
            append(&mut config, json!("b"));
            append(&mut config, props.get("foo").cloned().unwrap_or(Value::Null));
            Ok(config)
        })
    }

    #[test]
    fn test_plugins_applied_in_given_order_with_props() {
        let config = AppConfig::new().with_field("extra", json!([]));
        let plugins = vec![
            PluginEntry::from(p1()),
            PluginEntry::from((p2(), json!({"foo": 1}))),
        ];

        let result = with_plugins(config, plugins);
        assert!(result.is_ok_and(|c| c.get("extra") == Some(&json!(["a", "b", 1]))));
    }

    #[test]
    fn test_second_plugin_sees_first_plugin_output() {
        let first = ConfigPlugin::new("first", |config, _| Ok(config.with_field("name", "from-first")));
        let second = ConfigPlugin::new("second", |config, _| {
            let seen = config.name().unwrap_or_default().to_string();
            Ok(config.with_field("seen", seen))
        });

        let result = with_plugins(AppConfig::new(), [first, second]);
        assert!(result.is_ok_and(|c| c.get_str("seen") == Some("from-first")));
    }

    #[test]
    fn test_failing_plugin_aborts_composition() {
        let failing = ConfigPlugin::new("failing", |_config, _| Err(PluginError::failed("failing", "boom")));
        let never = ConfigPlugin::new("never", |config, _| Ok(config.with_field("ran", true)));

        let result = with_plugins(AppConfig::new(), [failing, never]);
        assert!(matches!(result, Err(PluginError::Failed { ref plugin, .. }) if plugin == "failing"));
    }

    #[test]
    fn test_renamed_plugin_shares_function() {
        let plugin = p1().renamed("alias");
        assert_eq!(plugin.name(), "alias");
        let config = AppConfig::new().with_field("extra", json!([]));
        let result = with_plugin(config, plugin);
        assert!(result.is_ok_and(|c| c.get("extra") == Some(&json!(["a"]))));
    }
}
