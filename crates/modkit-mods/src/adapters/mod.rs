//! Format adapter boundary
//!
//! An adapter turns one artifact file into an in-memory document and back.
//! Providers only see the type-erased [`ErasedAdapter`]; the typed
//! [`FormatAdapter`] is what embedders implement for their own codecs.

pub mod json;
pub mod properties;
pub mod source;

pub use json::JsonAdapter;
pub use properties::{
    get_property, parse_properties, properties_to_string, remove_property, set_property,
    PropertiesAdapter, PropertiesItem,
};
pub use source::{Language, SourceFile, SourceFileAdapter};

use crate::errors::AdapterError;
use crate::kinds::ArtifactKind;
use ahash::AHashMap;
use modkit_core::ModResults;
use std::any::{type_name, Any};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// Reads and writes one artifact format
pub trait FormatAdapter: Send + Sync + 'static {
    type Document: Any + Send;

    fn read(&self, path: &Path) -> Result<Self::Document, AdapterError>;

    fn write(&self, path: &Path, document: &Self::Document) -> Result<(), AdapterError>;

    /// Starting document for an optional artifact that does not exist yet
    fn empty(&self) -> Option<Self::Document> {
        None
    }
}

/// Object-safe view of a [`FormatAdapter`] that speaks [`ModResults`]
pub trait ErasedAdapter: Send + Sync {
    fn read(&self, path: &Path) -> Result<ModResults, AdapterError>;

    fn write(&self, path: &Path, results: &ModResults) -> Result<(), AdapterError>;

    fn empty(&self) -> Option<ModResults>;

    fn document_type(&self) -> &'static str;
}

struct Erased<A>(A);

impl<A: FormatAdapter> ErasedAdapter for Erased<A> {
    fn read(&self, path: &Path) -> Result<ModResults, AdapterError> {
        self.0.read(path).map(ModResults::new)
    }

    fn write(&self, path: &Path, results: &ModResults) -> Result<(), AdapterError> {
        let document =
            results
                .downcast_ref::<A::Document>()
                .ok_or_else(|| AdapterError::DocumentType {
                    expected: type_name::<A::Document>(),
                    found: results.type_name(),
                })?;
        self.0.write(path, document)
    }

    fn empty(&self) -> Option<ModResults> {
        self.0.empty().map(ModResults::new)
    }

    fn document_type(&self) -> &'static str {
        type_name::<A::Document>()
    }
}

pub fn erase<A: FormatAdapter>(adapter: A) -> Arc<dyn ErasedAdapter> {
    Arc::new(Erased(adapter))
}

/// Adapter lookup by artifact kind
#[derive(Clone, Default)]
pub struct AdapterSet {
    adapters: AHashMap<ArtifactKind, Arc<dyn ErasedAdapter>>,
}

impl AdapterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapters for the text, properties and JSON artifacts modkit understands itself
    ///
    /// XML resources, property lists and the Xcode project graph need an
    /// external codec registered through [`AdapterSet::with_adapter`].
    pub fn builtin() -> Self {
        AdapterSet::new()
            .with_adapter(ArtifactKind::AndroidGradleProperties, PropertiesAdapter)
            .with_adapter(ArtifactKind::AndroidAppBuildGradle, SourceFileAdapter)
            .with_adapter(ArtifactKind::AndroidProjectBuildGradle, SourceFileAdapter)
            .with_adapter(ArtifactKind::AndroidSettingsGradle, SourceFileAdapter)
            .with_adapter(ArtifactKind::AndroidMainActivity, SourceFileAdapter)
            .with_adapter(ArtifactKind::AndroidMainApplication, SourceFileAdapter)
            .with_adapter(ArtifactKind::IosPodfileProperties, JsonAdapter)
            .with_adapter(ArtifactKind::IosAppDelegate, SourceFileAdapter)
    }

    pub fn with_adapter<A: FormatAdapter>(mut self, kind: ArtifactKind, adapter: A) -> Self {
        self.insert(kind, erase(adapter));
        self
    }

    pub fn insert(&mut self, kind: ArtifactKind, adapter: Arc<dyn ErasedAdapter>) {
        self.adapters.insert(kind, adapter);
    }

    pub fn get(&self, kind: ArtifactKind) -> Option<&Arc<dyn ErasedAdapter>> {
        self.adapters.get(&kind)
    }

    pub fn contains(&self, kind: ArtifactKind) -> bool {
        self.adapters.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for AdapterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<String> = self.adapters.keys().map(ToString::to_string).collect();
        kinds.sort();
        f.debug_struct("AdapterSet").field("kinds", &kinds).finish()
    }
}

/// Write to a sibling temp file, then rename over the target
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), AdapterError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);
    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::with_capacity(64 * 1024, file);
        writer.write_all(content)?;
        writer.flush()?;
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}
