//! The resolved application config threaded through plugins and mods
//!
//! An `AppConfig` is an open, insertion-ordered JSON object plus the mod
//! registry. The registry lives outside the serializable fields, so mods can
//! never leak into a file that is written back to disk.

use crate::mods::ModRegistry;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Key of the scratch object used for resolver bookkeeping and plugin history
pub const INTERNAL_KEY: &str = "_internal";

/// Application config: arbitrary keyed fields plus the mod registry
#[derive(Clone, Default)]
pub struct AppConfig {
    fields: Map<String, Value>,
    /// `None` models a config object without a `mods` field at all
    mods: Option<ModRegistry>,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        AppConfig { fields, mods: None }
    }

    /// Build a config from a JSON value; only objects are valid configs
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self::from_fields(fields)),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// Serializable view of the config (mods are never included)
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Walk nested objects, e.g. `["android", "package"]`
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.fields.get(*first)?;
        for segment in rest {
            current = current.as_object()?.get(*segment)?;
        }
        Some(current)
    }

    pub fn get_path_str(&self, path: &[&str]) -> Option<&str> {
        self.get_path(path).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    pub fn slug(&self) -> Option<&str> {
        self.get_str("slug")
    }

    pub fn version(&self) -> Option<&str> {
        self.get_str("version")
    }

    pub fn mods(&self) -> Option<&ModRegistry> {
        self.mods.as_ref()
    }

    /// Registry for mutation, created on first use
    pub fn mods_mut(&mut self) -> &mut ModRegistry {
        self.mods.get_or_insert_with(ModRegistry::default)
    }

    pub fn has_mods(&self) -> bool {
        self.mods.is_some()
    }

    pub fn set_mods(&mut self, mods: Option<ModRegistry>) {
        self.mods = mods;
    }

    pub fn take_mods(&mut self) -> Option<ModRegistry> {
        self.mods.take()
    }

    /// Copy of the config with the registry detached
    pub fn without_mods(&self) -> Self {
        Self::from_fields(self.fields.clone())
    }

    pub fn internal(&self) -> Option<&Map<String, Value>> {
        self.fields.get(INTERNAL_KEY).and_then(Value::as_object)
    }

    /// Edit the `_internal` object in place; a non-object value there starts over empty
    pub fn update_internal<R, F>(&mut self, update: F) -> R
    where
        F: FnOnce(&mut Map<String, Value>) -> R,
    {
        let mut internal = match self.fields.get_mut(INTERNAL_KEY).map(Value::take) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let result = update(&mut internal);
        self.fields
            .insert(INTERNAL_KEY.to_string(), Value::Object(internal));
        result
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("fields", &self.fields)
            .field("mods", &self.mods)
            .finish()
    }
}

impl Serialize for AppConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AppConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(AppConfig::from_fields)
    }
}
