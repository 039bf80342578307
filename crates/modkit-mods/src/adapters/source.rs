use super::{write_atomic, FormatAdapter};
use crate::errors::AdapterError;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Groovy,
    Kotlin,
    Java,
    Swift,
    ObjC,
    ObjCpp,
    Ruby,
    Unknown,
}

impl Language {
    pub fn from_path(path: &Path) -> Self {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if file_name == "Podfile" {
            return Language::Ruby;
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("gradle") => Language::Groovy,
            Some("kt" | "kts") => Language::Kotlin,
            Some("java") => Language::Java,
            Some("swift") => Language::Swift,
            Some("m") => Language::ObjC,
            Some("mm") => Language::ObjCpp,
            Some("rb") => Language::Ruby,
            _ => Language::Unknown,
        }
    }
}

/// Raw text of a build script or native source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub language: Language,
    pub contents: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SourceFileAdapter;

impl FormatAdapter for SourceFileAdapter {
    type Document = SourceFile;

    fn read(&self, path: &Path) -> Result<Self::Document, AdapterError> {
        Ok(SourceFile {
            path: path.to_path_buf(),
            language: Language::from_path(path),
            contents: fs::read_to_string(path)?,
        })
    }

    fn write(&self, path: &Path, document: &Self::Document) -> Result<(), AdapterError> {
        if path.is_file() && fs::read_to_string(path).is_ok_and(|c| c == document.contents) {
            return Ok(());
        }
        write_atomic(path, document.contents.as_bytes())
    }
}
