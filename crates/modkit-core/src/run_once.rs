//! Run-once plugins
//!
//! A plugin can be listed by the user and also applied as a built-in. The
//! history under `_internal.pluginHistory` makes the second application a no-op.

use crate::config::AppConfig;
use crate::errors::PluginError;
use crate::plugin::ConfigPlugin;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

pub const PLUGIN_HISTORY_KEY: &str = "pluginHistory";
const UNVERSIONED: &str = "UNVERSIONED";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginHistoryItem {
    pub name: String,
    pub version: String,
}

pub fn get_history_item(config: &AppConfig, name: &str) -> Option<PluginHistoryItem> {
    let item = config.internal()?.get(PLUGIN_HISTORY_KEY)?.get(name)?;
    serde_json::from_value(item.clone()).ok()
}

pub fn add_history_item(mut config: AppConfig, item: PluginHistoryItem) -> AppConfig {
    config.update_internal(|internal| {
        let history = internal
            .entry(PLUGIN_HISTORY_KEY.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !history.is_object() {
            *history = Value::Object(Map::new());
        }
        if let Value::Object(history) = history {
            let name = item.name.clone();
            if let Ok(value) = serde_json::to_value(item) {
                history.insert(name, value);
            }
        }
    });
    config
}

/// Apply `apply` unless a plugin called `name` already ran on this config
pub fn with_run_once<F>(
    config: AppConfig,
    name: &str,
    version: Option<&str>,
    apply: F,
) -> Result<AppConfig, PluginError>
where
    F: FnOnce(AppConfig) -> Result<AppConfig, PluginError>,
{
    if let Some(existing) = get_history_item(&config, name) {
        debug!(
            "Skipping plugin {} (already applied at version {})",
            name, existing.version
        );
        return Ok(config);
    }

    let config = add_history_item(
        config,
        PluginHistoryItem {
            name: name.to_string(),
            version: version.unwrap_or(UNVERSIONED).to_string(),
        },
    );
    apply(config)
}

/// Wrap a plugin so it is applied at most once per config
pub fn create_run_once_plugin(plugin: ConfigPlugin, name: &str, version: Option<&str>) -> ConfigPlugin {
    let history_name = name.to_string();
    let version = version.map(str::to_string);
    ConfigPlugin::new(name, move |config, props| {
        with_run_once(config, &history_name, version.as_deref(), |config| {
            plugin.apply(config, props)
        })
    })
}
