//! modkit core
//!
//! Shared primitives for the modkit plugin/mod composition engine:
//! the resolved application config, the per-`(platform, mod)` chain registry,
//! the config plugin composer and the explicitly owned run context that carries
//! warnings and config path overrides between the resolver and the compiler.

pub mod config;
pub mod context;
pub mod errors;
pub mod mods;
pub mod platform;
pub mod plugin;
pub mod run_once;
pub mod warnings;

pub use config::{AppConfig, INTERNAL_KEY};
pub use context::{CustomConfigPaths, RunContext};
pub use errors::{ArtifactOperation, ModError, PluginError};
pub use mods::{
    register_mod, register_named_mod, register_provider, with_extended_mod, with_mod, ModAction, ModChain,
    ModContext, ModEntry, ModRegistry, ModRequest, ModResults,
};
pub use platform::{Platform, UnknownPlatform};
pub use plugin::{with_plugin, with_plugins, ConfigPlugin, PluginEntry};
pub use run_once::{create_run_once_plugin, with_run_once, PluginHistoryItem};
pub use warnings::{Warning, WarningAggregator};
