//! Native project modification for modkit
//!
//! Format adapters read and write artifacts, base providers wrap every
//! registered mod chain with the read/write pair for its artifact, and
//! [`compile_mods`] runs the chains one key at a time.

pub mod adapters;
pub mod builtins;
pub mod compiler;
pub mod errors;
pub mod kinds;
pub mod paths;
pub mod providers;
pub mod with_mods;

pub use adapters::{
    AdapterSet, ErasedAdapter, FormatAdapter, JsonAdapter, Language, PropertiesAdapter,
    PropertiesItem, SourceFile, SourceFileAdapter,
};
pub use builtins::{builtin_plugins, with_builtin_plugins};
pub use compiler::{compile_mods, CompileOptions};
pub use errors::AdapterError;
pub use kinds::{ArtifactKind, ArtifactPolicy};
pub use providers::{install_base_providers, InstallOptions, PairedResults};
pub use with_mods::{
    with_app_build_gradle, with_app_delegate, with_artifact, with_dangerous_mod,
    with_finalized_mod, with_gradle_properties, with_main_activity, with_main_application,
    with_podfile_properties, with_project_build_gradle, with_settings_gradle,
};
