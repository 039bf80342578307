//! Plugin resolution for modkit
//!
//! Resolves declarative plugin references (names, `[name, props]` pairs,
//! `{ resolve, props }` objects or callables) into config plugins and composes
//! them onto a config.

pub mod loader;
pub mod resolution;
pub mod static_plugins;

pub use loader::{PluginCatalog, PluginLoader};
pub use resolution::{
    find_package_boundary, is_direct_file_reference, ModuleResolution, ModuleResolver,
    ResolvedModule, PLUGIN_ENTRY_FILE,
};
pub use static_plugins::{
    apply_static_plugins, resolve_config_plugin, with_static_plugin, with_static_plugins,
    PluginSource, StaticPluginOptions, StaticPluginRef,
};
