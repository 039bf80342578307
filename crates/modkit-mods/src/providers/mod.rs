//! Base mod providers
//!
//! A provider is the link that owns an artifact: it reads the file, hands the
//! document to the rest of the chain, checks what comes back and writes the
//! result. Providers are installed after every plugin has registered, which
//! makes them the head of the chain.

mod base;
mod paired;

pub use base::{BaseModProvider, NoArtifactProvider};
pub use paired::{PairedProvider, PairedResults};

use crate::adapters::{AdapterSet, ErasedAdapter};
use crate::errors::AdapterError;
use crate::kinds::{ArtifactKind, ArtifactPolicy};
use crate::paths::resolve_artifact_path;
use modkit_core::{register_provider, AppConfig, ArtifactOperation, ModAction, ModError, ModRequest, ModResults, Platform};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Which keys get a provider
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub platforms: Vec<Platform>,
    /// Only install providers for keys some plugin registered
    pub skip_empty_mods: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        InstallOptions {
            platforms: Platform::ALL.to_vec(),
            skip_empty_mods: true,
        }
    }
}

/// Register the base provider for every applicable key, outermost
///
/// Keys whose chain already starts with a provider are left alone, so a
/// config can be compiled more than once.
pub fn install_base_providers(mut config: AppConfig, adapters: &AdapterSet, options: &InstallOptions) -> AppConfig {
    for &platform in &options.platforms {
        for kind in ArtifactKind::for_platform(platform) {
            let chain = config.mods().and_then(|mods| mods.get(platform, kind.mod_name()));
            if chain.is_some_and(|c| c.is_provider()) {
                continue;
            }
            let registered = chain.is_some();
            if !registered && (options.skip_empty_mods || kind.pair().is_some()) {
                continue;
            }

            let Some(provider) = provider_for(kind, adapters) else {
                debug!("No format adapter for {}, leaving it without a provider", kind);
                continue;
            };
            config = register_provider(config, platform, kind.mod_name(), format!("base:{kind}"), provider);
        }
    }
    config
}

fn provider_for(kind: ArtifactKind, adapters: &AdapterSet) -> Option<Arc<dyn ModAction>> {
    if !kind.owns_artifact() {
        return Some(Arc::new(NoArtifactProvider));
    }
    if let Some((first, second)) = kind.pair() {
        let provider = PairedProvider::new(
            kind,
            (first, Arc::clone(adapters.get(first)?)),
            (second, Arc::clone(adapters.get(second)?)),
        );
        return Some(Arc::new(provider));
    }
    let adapter = adapters.get(kind)?;
    Some(Arc::new(BaseModProvider::new(kind, Arc::clone(adapter))))
}

/// Resolve the path and read the document, without applying any policy
fn read_artifact(
    kind: ArtifactKind,
    adapter: &dyn ErasedAdapter,
    platform_root: &Path,
    project_name: Option<&str>,
) -> Result<(PathBuf, ModResults), (Option<PathBuf>, AdapterError)> {
    let path = resolve_artifact_path(kind, platform_root, project_name).map_err(|err| (None, err))?;
    match adapter.read(&path) {
        Ok(results) => Ok((path, results)),
        Err(err) => Err((Some(path), err)),
    }
}

/// A document ready for the chain, and where to write it back
struct LoadedArtifact {
    path: Option<PathBuf>,
    results: ModResults,
}

/// Apply the artifact's policy to a read outcome
///
/// `Ok(None)` means an optional artifact could not be read: it exists but is
/// unreadable, or it is missing and the adapter has no empty document.
fn settle_read(
    kind: ArtifactKind,
    adapter: &dyn ErasedAdapter,
    request: &ModRequest,
    outcome: Result<(PathBuf, ModResults), (Option<PathBuf>, AdapterError)>,
) -> Result<Option<LoadedArtifact>, ModError> {
    let (path, err) = match outcome {
        Ok((path, results)) => {
            debug!("Read {} from {}", kind, path.display());
            return Ok(Some(LoadedArtifact {
                path: Some(path),
                results,
            }));
        }
        Err(failure) => failure,
    };

    match kind.policy() {
        ArtifactPolicy::Required => Err(artifact_error(
            kind,
            request,
            ArtifactOperation::Read,
            path.as_deref(),
            &err,
        )),
        ArtifactPolicy::Optional => {
            // An existing file that fails to read is never replaced
            let missing = path.as_deref().is_some_and(|p| !p.exists());
            if missing {
                if let Some(results) = adapter.empty() {
                    debug!("{} does not exist yet, starting from an empty document", kind);
                    return Ok(Some(LoadedArtifact { path, results }));
                }
            }
            request.warnings.add_warning(
                kind.platform(),
                kind.to_string(),
                format!("Could not read {}: {}", describe(path.as_deref()), err),
                None,
            );
            Ok(None)
        }
    }
}

/// Apply the artifact's policy to a write outcome
fn settle_write(
    kind: ArtifactKind,
    request: &ModRequest,
    path: &Path,
    outcome: Result<(), AdapterError>,
) -> Result<(), ModError> {
    let Err(err) = outcome else {
        debug!("Wrote {} to {}", kind, path.display());
        return Ok(());
    };
    match kind.policy() {
        ArtifactPolicy::Required => Err(artifact_error(
            kind,
            request,
            ArtifactOperation::Write,
            Some(path),
            &err,
        )),
        ArtifactPolicy::Optional => {
            request.warnings.add_warning(
                kind.platform(),
                kind.to_string(),
                format!("Could not write {}: {}", path.display(), err),
                None,
            );
            Ok(())
        }
    }
}

fn artifact_error(
    kind: ArtifactKind,
    request: &ModRequest,
    operation: ArtifactOperation,
    path: Option<&Path>,
    err: &AdapterError,
) -> ModError {
    ModError::Artifact {
        platform: kind.platform(),
        mod_name: kind.mod_name().to_string(),
        operation,
        path: path.map_or_else(|| request.platform_project_root.clone(), Path::to_path_buf),
        message: err.to_string(),
    }
}

fn describe(path: Option<&Path>) -> String {
    path.map_or_else(|| "artifact".to_string(), |p| p.display().to_string())
}

/// The chain must hand back something that is still a config
fn validate_shape(kind: ArtifactKind, config: &AppConfig) -> Result<(), ModError> {
    if config.has_mods() {
        Ok(())
    } else {
        Err(ModError::InvalidModResult {
            platform: kind.platform(),
            mod_name: kind.mod_name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modkit_core::register_mod;

    fn noop(config: AppConfig, platform: Platform, name: &str) -> AppConfig {
        register_mod(config, platform, name, |ctx| ctx.forward())
    }

    #[test]
    fn test_install_only_for_registered_keys_by_default() {
        let config = noop(AppConfig::new(), Platform::Android, "gradleProperties");
        let config = install_base_providers(config, &AdapterSet::builtin(), &InstallOptions::default());

        let Some(mods) = config.mods() else {
            assert!(false, "registry should exist");
            return;
        };
        assert_eq!(mods.len(), 1);
        let chain = mods.get(Platform::Android, "gradleProperties");
        assert!(chain.is_some_and(|c| c.is_provider() && c.depth() == 2));
    }

    #[test]
    fn test_install_all_keys_with_adapters() {
        let options = InstallOptions {
            platforms: vec![Platform::Ios],
            skip_empty_mods: false,
        };
        let config = install_base_providers(AppConfig::new(), &AdapterSet::builtin(), &options);
        let Some(mods) = config.mods() else {
            assert!(false, "registry should exist");
            return;
        };
        assert!(mods.contains(Platform::Ios, "podfileProperties"));
        assert!(mods.contains(Platform::Ios, "dangerous"));
        assert!(!mods.contains(Platform::Ios, "infoPlist"));
        assert!(!mods.contains(Platform::Android, "gradleProperties"));
    }

    #[test]
    fn test_install_is_idempotent() {
        let config = noop(AppConfig::new(), Platform::Android, "gradleProperties");
        let adapters = AdapterSet::builtin();
        let options = InstallOptions::default();
        let config = install_base_providers(config, &adapters, &options);
        let config = install_base_providers(config, &adapters, &options);

        let depth = config
            .mods()
            .and_then(|m| m.get(Platform::Android, "gradleProperties"))
            .map(|c| c.depth());
        assert_eq!(depth, Some(2));
    }

    #[test]
    fn test_kind_without_adapter_gets_no_provider() {
        let config = noop(AppConfig::new(), Platform::Android, "manifest");
        let config = install_base_providers(config, &AdapterSet::builtin(), &InstallOptions::default());
        let chain = config.mods().and_then(|m| m.get(Platform::Android, "manifest"));
        assert!(chain.is_some_and(|c| !c.is_provider()));
    }
}
