//! Centralized error types for the mod engine
//!
//! `PluginError` covers config plugin resolution and execution, `ModError`
//! covers everything that can go wrong while a mod chain runs. Both expose a
//! stable short code through `code()` so callers can branch without matching
//! on message text.

use crate::platform::Platform;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving or applying config plugins
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Failed to resolve plugin for module \"{request}\" relative to \"{}\": {reason}", .project_root.display())]
    NotFound {
        request: String,
        project_root: PathBuf,
        reason: String,
    },

    #[error("Plugin \"{request}\" resolved to {} but it does not export a config plugin", .path.display())]
    InvalidImport { request: String, path: PathBuf },

    #[error("Invalid plugin entry: {0}")]
    InvalidType(String),

    #[error("Plugin \"{plugin}\" failed: {message}")]
    Failed { plugin: String, message: String },
}

impl PluginError {
    pub fn code(&self) -> &'static str {
        match self {
            PluginError::NotFound { .. } => "PLUGIN_NOT_FOUND",
            PluginError::InvalidImport { .. } => "INVALID_PLUGIN_IMPORT",
            PluginError::InvalidType(_) => "INVALID_PLUGIN_TYPE",
            PluginError::Failed { .. } => "PLUGIN_FAILED",
        }
    }

    /// Convenience constructor used by plugin bodies
    pub fn failed(plugin: impl Into<String>, message: impl fmt::Display) -> Self {
        PluginError::Failed {
            plugin: plugin.into(),
            message: message.to_string(),
        }
    }
}

/// Which half of a provider's read/write pair failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactOperation {
    Read,
    Write,
}

impl fmt::Display for ArtifactOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactOperation::Read => f.write_str("read"),
            ArtifactOperation::Write => f.write_str("write"),
        }
    }
}

/// Errors raised while a mod chain executes
#[derive(Error, Debug)]
pub enum ModError {
    #[error("Mod `mods.{platform}.{mod_name}` evaluated to an object that is not a valid project config: the returned config has no `mods`")]
    InvalidModResult { platform: Platform, mod_name: String },

    #[error("Mod `mods.{platform}.{mod_name}` has no modResults (expected {expected})")]
    MissingModResults {
        platform: Platform,
        mod_name: String,
        expected: &'static str,
    },

    #[error("Mod `mods.{platform}.{mod_name}` expected modResults of type {expected} but got {found}")]
    ResultsTypeMismatch {
        platform: Platform,
        mod_name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Initial base modifier for \"{platform}.{mod_name}\" is not a provider and therefore will not provide modResults to child mods")]
    MissingProvider { platform: Platform, mod_name: String },

    #[error("Failed to {operation} {} for `mods.{platform}.{mod_name}`: {message}", .path.display())]
    Artifact {
        platform: Platform,
        mod_name: String,
        operation: ArtifactOperation,
        path: PathBuf,
        message: String,
    },

    #[error("Mod `mods.{platform}.{mod_name}` failed: {message}")]
    Action {
        platform: Platform,
        mod_name: String,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ModError {
    pub fn code(&self) -> &'static str {
        match self {
            ModError::InvalidModResult { .. } => "INVALID_MOD",
            ModError::MissingModResults { .. } | ModError::ResultsTypeMismatch { .. } => {
                "INVALID_MOD_RESULTS"
            }
            ModError::MissingProvider { .. } => "MISSING_PROVIDER",
            ModError::Artifact { .. } => "ARTIFACT_IO",
            ModError::Action { .. } => "MOD_FAILED",
            ModError::Io(_) => "IO",
        }
    }

    /// The `(platform, mod)` key the error was raised for, when known
    pub fn key(&self) -> Option<(Platform, &str)> {
        match self {
            ModError::InvalidModResult { platform, mod_name }
            | ModError::MissingModResults {
                platform, mod_name, ..
            }
            | ModError::ResultsTypeMismatch {
                platform, mod_name, ..
            }
            | ModError::MissingProvider { platform, mod_name }
            | ModError::Artifact {
                platform, mod_name, ..
            }
            | ModError::Action {
                platform, mod_name, ..
            } => Some((*platform, mod_name.as_str())),
            ModError::Io(_) => None,
        }
    }
}
