use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by format adapters while reading or writing an artifact
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Failed to serialize {}: {message}", .path.display())]
    Serialize { path: PathBuf, message: String },

    #[error("Adapter expected a document of type {expected} but modResults holds {found}")]
    DocumentType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Cannot locate artifact: {0}")]
    Unresolved(String),
}

impl AdapterError {
    pub fn code(&self) -> &'static str {
        match self {
            AdapterError::Io(_) => "IO",
            AdapterError::Parse { .. } => "PARSE",
            AdapterError::Serialize { .. } => "SERIALIZE",
            AdapterError::DocumentType { .. } => "INVALID_MOD_RESULTS",
            AdapterError::Unresolved(_) => "ARTIFACT_NOT_FOUND",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_error_display() {
        let err = AdapterError::Parse {
            path: PathBuf::from("gradle.properties"),
            message: "bad line".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to parse gradle.properties: bad line");
        assert_eq!(err.code(), "PARSE");
    }
}
