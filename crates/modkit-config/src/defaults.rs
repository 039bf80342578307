//! Field-by-field default merging
//!
//! Every merge function takes the declared config and returns a new one. A
//! value already declared in the config always wins over the computed default.

use crate::package_json::PackageJson;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

/// Legacy top-level key wrapping the real config
pub const WRAPPER_KEY: &str = "expo";

/// Default platform list when the config declares none
pub const DEFAULT_PLATFORMS: [&str; 2] = ["ios", "android"];

/// Paths recorded under `_internal`
#[derive(Debug, Clone, Default)]
pub struct ResolvedPaths {
    pub project_root: PathBuf,
    pub static_config_path: Option<PathBuf>,
    pub dynamic_config_path: Option<PathBuf>,
    pub package_json_path: PathBuf,
}

/// Unwrap exactly one level of the legacy wrapper key
///
/// `{ "expo": { ... } }` becomes the inner object. A nested `expo` key inside
/// that object is left alone.
pub fn unwrap_wrapped_config(mut config: Map<String, Value>) -> Map<String, Value> {
    match config.remove(WRAPPER_KEY) {
        Some(Value::Object(inner)) => inner,
        Some(other) => {
            config.insert(WRAPPER_KEY.to_string(), other);
            config
        }
        None => config,
    }
}

/// Lowercase, dash-separated identifier derived from a display name
///
/// Accented Latin letters are folded to ASCII; other non-ASCII characters
/// separate words.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.trim().to_lowercase().chars() {
        let mut buf = [0u8; 4];
        let text = if ch.is_ascii_alphanumeric() || ch == '_' || ch == '~' {
            &*ch.encode_utf8(&mut buf)
        } else if let Some(folded) = fold_latin(ch) {
            folded
        } else {
            pending_dash = true;
            continue;
        };
        if pending_dash && !slug.is_empty() {
            slug.push('-');
        }
        pending_dash = false;
        slug.push_str(text);
    }
    slug
}

/// ASCII spelling of a lowercase accented Latin letter
fn fold_latin(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'ß' => "ss",
        'ţ' | 'ť' | 'ŧ' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(folded)
}

fn declared_str<'a>(config: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    config
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

pub fn merge_name(mut config: Map<String, Value>, package: &PackageJson) -> Map<String, Value> {
    if declared_str(&config, "name").is_none() {
        if let Some(name) = &package.name {
            config.insert("name".to_string(), json!(name));
        }
    }
    config
}

pub fn merge_slug(mut config: Map<String, Value>) -> Map<String, Value> {
    if declared_str(&config, "slug").is_none() {
        if let Some(slug) = declared_str(&config, "name").map(slugify) {
            config.insert("slug".to_string(), json!(slug));
        }
    }
    config
}

pub fn merge_version(mut config: Map<String, Value>, package: &PackageJson) -> Map<String, Value> {
    if declared_str(&config, "version").is_none() {
        if let Some(version) = &package.version {
            config.insert("version".to_string(), json!(version));
        }
    }
    config
}

pub fn merge_description(mut config: Map<String, Value>, package: &PackageJson) -> Map<String, Value> {
    if declared_str(&config, "description").is_none() {
        if let Some(description) = &package.description {
            config.insert("description".to_string(), json!(description));
        }
    }
    config
}

pub fn merge_platforms(mut config: Map<String, Value>) -> Map<String, Value> {
    if !config.get("platforms").is_some_and(Value::is_array) {
        config.insert("platforms".to_string(), json!(DEFAULT_PLATFORMS));
    }
    config
}

fn path_value(path: Option<&Path>) -> Value {
    path.map_or(Value::Null, |p| json!(p.to_string_lossy()))
}

/// Record resolver bookkeeping, keeping any other `_internal` keys
pub fn merge_internal(mut config: Map<String, Value>, paths: &ResolvedPaths) -> Map<String, Value> {
    let mut internal = match config.remove(modkit_core::INTERNAL_KEY) {
        Some(Value::Object(existing)) => existing,
        _ => Map::new(),
    };
    internal.insert(
        "projectRoot".to_string(),
        path_value(Some(&paths.project_root)),
    );
    internal.insert(
        "staticConfigPath".to_string(),
        path_value(paths.static_config_path.as_deref()),
    );
    internal.insert(
        "dynamicConfigPath".to_string(),
        path_value(paths.dynamic_config_path.as_deref()),
    );
    internal.insert(
        "packageJsonPath".to_string(),
        path_value(Some(&paths.package_json_path)),
    );
    config.insert(modkit_core::INTERNAL_KEY.to_string(), Value::Object(internal));
    config
}

/// Apply every default in a fixed order
pub fn apply_defaults(
    config: Map<String, Value>,
    package: &PackageJson,
    paths: &ResolvedPaths,
) -> Map<String, Value> {
    let config = merge_name(config, package);
    let config = merge_slug(config);
    let config = merge_version(config, package);
    let config = merge_description(config, package);
    let config = merge_platforms(config);
    merge_internal(config, paths)
}
