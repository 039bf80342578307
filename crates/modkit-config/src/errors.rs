use modkit_core::PluginError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating, evaluating or defaulting the app config
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot find {what} at {}", .path.display())]
    ModuleNotFound { what: &'static str, path: PathBuf },

    #[error("Config at {} must evaluate to an object", .path.display())]
    NotObject { path: PathBuf },

    #[error("Failed to parse {}: {message}", .path.display())]
    InvalidFormat { path: PathBuf, message: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Error evaluating {}: {message}{}", .path.display(), frame_suffix(.code_frame))]
    Evaluation {
        path: PathBuf,
        message: String,
        code_frame: Option<String>,
    },

    #[error("No script evaluator available: {0}")]
    EvaluatorUnavailable(String),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn frame_suffix(code_frame: &Option<String>) -> String {
    code_frame
        .as_deref()
        .map(|frame| format!("\n\n{}", frame))
        .unwrap_or_default()
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::ModuleNotFound { .. } => "MODULE_NOT_FOUND",
            ConfigError::NotObject { .. } => "NOT_OBJECT",
            ConfigError::InvalidFormat { .. } => "INVALID_FORMAT",
            ConfigError::InvalidConfig(_) => "INVALID_CONFIG",
            ConfigError::Evaluation { .. } => "EVALUATION_ERROR",
            ConfigError::EvaluatorUnavailable(_) => "EVALUATOR_UNAVAILABLE",
            ConfigError::Plugin(err) => err.code(),
            ConfigError::Io(_) => "IO",
        }
    }
}
