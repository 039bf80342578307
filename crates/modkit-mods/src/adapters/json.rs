use super::{write_atomic, FormatAdapter};
use crate::errors::AdapterError;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// JSON object files such as `Podfile.properties.json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAdapter;

impl FormatAdapter for JsonAdapter {
    type Document = Map<String, Value>;

    fn read(&self, path: &Path) -> Result<Self::Document, AdapterError> {
        let content = fs::read_to_string(path)?;
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(AdapterError::Parse {
                path: path.to_path_buf(),
                message: "expected a JSON object".to_string(),
            }),
            Err(err) => Err(AdapterError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            }),
        }
    }

    fn write(&self, path: &Path, document: &Self::Document) -> Result<(), AdapterError> {
        let mut content =
            serde_json::to_string_pretty(document).map_err(|err| AdapterError::Serialize {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        content.push('\n');
        write_atomic(path, content.as_bytes())
    }

    fn empty(&self) -> Option<Self::Document> {
        Some(Map::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rejects_non_object() {
        let Ok(tmp) = TempDir::new() else {
            return;
        };
        let path = tmp.path().join("list.json");
        let _ = fs::write(&path, "[]");
        assert!(JsonAdapter.read(&path).is_err_and(|e| e.code() == "PARSE"));
    }

    #[test]
    fn test_rewrite_is_stable() {
        let Ok(tmp) = TempDir::new() else {
            return;
        };
        let path = tmp.path().join("Podfile.properties.json");
        let _ = fs::write(&path, "{\n  \"b\": \"1\",\n  \"a\": \"2\"\n}\n");

        let Ok(document) = JsonAdapter.read(&path) else {
            assert!(false, "fixture should parse");
            return;
        };
        assert!(JsonAdapter.write(&path, &document).is_ok());
        assert_eq!(
            fs::read_to_string(&path).ok().as_deref(),
            Some("{\n  \"b\": \"1\",\n  \"a\": \"2\"\n}\n")
        );
    }
}
