//! Provider for a key backed by two independent artifacts
//!
//! The halves never reference each other, so both reads and both writes run
//! concurrently with `rayon::join`. Each half keeps its own policy and its own
//! warning tag.

use super::{read_artifact, settle_read, settle_write, validate_shape, LoadedArtifact};
use crate::adapters::ErasedAdapter;
use crate::errors::AdapterError;
use crate::kinds::ArtifactKind;
use modkit_core::{ModAction, ModContext, ModError, ModRequest, ModResults};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// modResults handed to a paired chain; a half is `None` when it could not be loaded
#[derive(Debug, Default)]
pub struct PairedResults {
    pub first: Option<ModResults>,
    pub second: Option<ModResults>,
}

impl PairedResults {
    pub fn first_mut<T: std::any::Any>(&mut self) -> Option<&mut T> {
        self.first.as_mut().and_then(ModResults::downcast_mut)
    }

    pub fn second_mut<T: std::any::Any>(&mut self) -> Option<&mut T> {
        self.second.as_mut().and_then(ModResults::downcast_mut)
    }
}

type Half = (ArtifactKind, Arc<dyn ErasedAdapter>);

pub struct PairedProvider {
    kind: ArtifactKind,
    first: Half,
    second: Half,
}

impl PairedProvider {
    pub fn new(kind: ArtifactKind, first: Half, second: Half) -> Self {
        PairedProvider {
            kind,
            first,
            second,
        }
    }
}

impl ModAction for PairedProvider {
    fn run(&self, mut ctx: ModContext) -> Result<ModContext, ModError> {
        let request = &ctx.mod_request;
        let (first, second) = {
            let root = &request.platform_project_root;
            let name = request.project_name.as_deref();
            let (a, b) = (&self.first, &self.second);
            rayon::join(
                || read_artifact(a.0, a.1.as_ref(), root, name),
                || read_artifact(b.0, b.1.as_ref(), root, name),
            )
        };
        let first = settle_read(self.first.0, self.first.1.as_ref(), request, first)?;
        let second = settle_read(self.second.0, self.second.1.as_ref(), request, second)?;
        if first.is_none() && second.is_none() {
            debug!("Skipping {}: neither half could be loaded", self.kind);
            return Ok(ctx);
        }

        let (first_path, first_results) = split(first);
        let (second_path, second_results) = split(second);
        ctx.mod_results = Some(ModResults::new(PairedResults {
            first: first_results,
            second: second_results,
        }));

        let mut ctx = ctx.forward()?;
        validate_shape(self.kind, &ctx.config)?;
        let paired = match ctx.take_results().map(ModResults::into_inner::<PairedResults>) {
            Some(Ok(paired)) => paired,
            Some(Err(results)) => {
                return Err(ModError::ResultsTypeMismatch {
                    platform: self.kind.platform(),
                    mod_name: self.kind.mod_name().to_string(),
                    expected: std::any::type_name::<PairedResults>(),
                    found: results.type_name(),
                })
            }
            None => {
                return Err(ModError::MissingModResults {
                    platform: self.kind.platform(),
                    mod_name: self.kind.mod_name().to_string(),
                    expected: std::any::type_name::<PairedResults>(),
                })
            }
        };

        if ctx.mod_request.introspect {
            debug!("Introspecting {}, not writing", self.kind);
            ctx.mod_results = Some(ModResults::new(paired));
            return Ok(ctx);
        }

        let PairedResults { first, second } = paired;
        let (first_outcome, second_outcome) = rayon::join(
            || write_half(&self.first, first_path, first),
            || write_half(&self.second, second_path, second),
        );
        settle_half(self.first.0, &ctx.mod_request, first_outcome)?;
        settle_half(self.second.0, &ctx.mod_request, second_outcome)?;
        Ok(ctx)
    }
}

fn split(loaded: Option<LoadedArtifact>) -> (Option<PathBuf>, Option<ModResults>) {
    match loaded {
        Some(LoadedArtifact { path, results }) => (path, Some(results)),
        None => (None, None),
    }
}

/// `None` when the half has nothing to write
fn write_half(
    half: &Half,
    path: Option<PathBuf>,
    results: Option<ModResults>,
) -> Option<(PathBuf, Result<(), AdapterError>)> {
    let (path, results) = (path?, results?);
    let outcome = half.1.write(&path, &results);
    Some((path, outcome))
}

fn settle_half(
    kind: ArtifactKind,
    request: &ModRequest,
    written: Option<(PathBuf, Result<(), AdapterError>)>,
) -> Result<(), ModError> {
    match written {
        Some((path, outcome)) => settle_write(kind, request, &path, outcome),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{erase, SourceFile, SourceFileAdapter};
    use modkit_core::{register_mod, register_provider, AppConfig, Platform};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn theme_provider() -> Arc<dyn ModAction> {
        Arc::new(PairedProvider::new(
            ArtifactKind::AndroidTheme,
            (ArtifactKind::AndroidColors, erase(SourceFileAdapter)),
            (ArtifactKind::AndroidStyles, erase(SourceFileAdapter)),
        ))
    }

    fn run(config: AppConfig, root: &Path) -> Result<ModContext, ModError> {
        let config = register_provider(config, Platform::Android, "theme", "base", theme_provider());
        let Some(chain) = config.mods().and_then(|m| m.get(Platform::Android, "theme")).cloned() else {
            return Ok(ModContext::new(config, ModRequest::new(root, Platform::Android, "theme")));
        };
        chain.invoke(ModContext::new(config, ModRequest::new(root, Platform::Android, "theme")))
    }

    fn mark_both(config: AppConfig) -> AppConfig {
        register_mod(config, Platform::Android, "theme", |mut ctx| {
            if let Ok(paired) = ctx.results_mut::<PairedResults>() {
                if let Some(colors) = paired.first_mut::<SourceFile>() {
                    colors.contents.push_str("<!-- colors -->\n");
                }
                if let Some(styles) = paired.second_mut::<SourceFile>() {
                    styles.contents.push_str("<!-- styles -->\n");
                }
            }
            ctx.forward()
        })
    }

    #[test]
    fn test_both_halves_written() {
        let Ok(tmp) = TempDir::new() else {
            return;
        };
        let values = tmp.path().join("android/app/src/main/res/values");
        let _ = fs::create_dir_all(&values);
        let _ = fs::write(values.join("colors.xml"), "<resources/>\n");
        let _ = fs::write(values.join("styles.xml"), "<resources/>\n");

        assert!(run(mark_both(AppConfig::new()), tmp.path()).is_ok());
        assert_eq!(
            fs::read_to_string(values.join("colors.xml")).ok().as_deref(),
            Some("<resources/>\n<!-- colors -->\n")
        );
        assert_eq!(
            fs::read_to_string(values.join("styles.xml")).ok().as_deref(),
            Some("<resources/>\n<!-- styles -->\n")
        );
    }

    #[test]
    fn test_missing_half_warns_and_other_half_proceeds() {
        let Ok(tmp) = TempDir::new() else {
            return;
        };
        let values = tmp.path().join("android/app/src/main/res/values");
        let _ = fs::create_dir_all(&values);
        let _ = fs::write(values.join("styles.xml"), "<resources/>\n");

        let Ok(ctx) = run(mark_both(AppConfig::new()), tmp.path()) else {
            assert!(false, "optional halves never abort");
            return;
        };
        let warnings = ctx.mod_request.warnings.warnings(Platform::Android);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].tag, "android.colors");
        assert_eq!(
            fs::read_to_string(values.join("styles.xml")).ok().as_deref(),
            Some("<resources/>\n<!-- styles -->\n")
        );
        assert!(!values.join("colors.xml").exists());
    }
}
