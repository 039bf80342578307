//! Errors surfaced by CLI commands

use modkit_config::ConfigError;
use modkit_core::{ModError, PluginError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Project root {} is not a directory", .0.display())]
    ProjectRoot(PathBuf),

    #[error("[{}] {}", .0.code(), .0)]
    Config(#[from] ConfigError),

    #[error("[{}] {}", .0.code(), .0)]
    Plugin(#[from] PluginError),

    #[error("[{}] {}", .0.code(), .0)]
    Mod(#[from] ModError),
}
