//! Writing config edits back to disk
//!
//! Only a JSON static config can be edited in place. Anything evaluated at
//! build time (scripts and the other `app.config.*` variants) gets a warning
//! describing the edit instead.

use crate::defaults::WRAPPER_KEY;
use crate::errors::ConfigError;
use crate::evaluate::read_data_file;
use crate::paths::{get_config_file_paths, ConfigFileKind, STATIC_CONFIG_FILE};
use modkit_core::{AppConfig, RunContext, INTERNAL_KEY};
use serde_json::{Map, Value};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Keys that never get written back
const NON_PERSISTED_KEYS: [&str; 2] = ["mods", INTERNAL_KEY];

#[derive(Debug, Clone)]
pub enum ModifyConfigResult {
    /// The static file was updated; `config` is its new unwrapped content
    Success { path: PathBuf, config: AppConfig },
    /// Nothing was written; the message tells the user what to change by hand
    Warn { message: String },
}

pub fn modify_config(
    project_root: &Path,
    modifications: &Map<String, Value>,
    ctx: &RunContext,
) -> Result<ModifyConfigResult, ConfigError> {
    let modifications: Map<String, Value> = modifications
        .iter()
        .filter(|(key, _)| !NON_PERSISTED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let paths = get_config_file_paths(project_root, ctx)?;
    if let Some(dynamic) = paths.dynamic_config_path {
        return Ok(ModifyConfigResult::Warn {
            message: manual_edit_message(&dynamic, &modifications),
        });
    }

    let path = paths
        .static_config_path
        .unwrap_or_else(|| project_root.join(STATIC_CONFIG_FILE));
    if ConfigFileKind::from_path(&path) != ConfigFileKind::Json {
        return Ok(ModifyConfigResult::Warn {
            message: manual_edit_message(&path, &modifications),
        });
    }

    let mut document = if path.is_file() {
        match read_data_file(&path)? {
            Value::Object(map) => map,
            _ => return Err(ConfigError::NotObject { path }),
        }
    } else {
        let mut empty = Map::new();
        empty.insert(WRAPPER_KEY.to_string(), Value::Object(Map::new()));
        empty
    };

    let fields = match document.get_mut(WRAPPER_KEY) {
        Some(Value::Object(inner)) => merge_top_level(inner, modifications),
        _ => merge_top_level(&mut document, modifications),
    };
    let config = AppConfig::from_fields(fields);

    let mut content = serde_json::to_string_pretty(&document).map_err(|err| {
        ConfigError::InvalidConfig(format!("Cannot serialize {}: {}", path.display(), err))
    })?;
    content.push('\n');
    write_atomic(&path, &content)?;
    info!("Updated {}", path.display());

    Ok(ModifyConfigResult::Success { path, config })
}

/// Write to `<name>.tmp` beside the config, then rename over it
fn write_atomic(path: &Path, content: &str) -> Result<(), ConfigError> {
    let temp_path = path.with_extension("json.tmp");
    {
        let file = fs::File::create(&temp_path)?;
        let mut writer = BufWriter::with_capacity(64 * 1024, file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
    }
    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Shallow merge; returns the merged object
fn merge_top_level(target: &mut Map<String, Value>, modifications: Map<String, Value>) -> Map<String, Value> {
    for (key, value) in modifications {
        target.insert(key, value);
    }
    target.clone()
}

fn manual_edit_message(path: &Path, modifications: &Map<String, Value>) -> String {
    let rendered = serde_json::to_string_pretty(modifications).unwrap_or_default();
    format!(
        "Cannot automatically write to {}. Add the following to your config manually:\n{}",
        path.display(),
        rendered
    )
}
