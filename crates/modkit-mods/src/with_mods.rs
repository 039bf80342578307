//! Typed registration helpers, one per artifact the built-in adapters read
//!
//! Each helper is `with_extended_mod` pinned to a key and a document type, so
//! a plugin edits `&mut T` and never deals with forwarding.

use crate::adapters::{PropertiesItem, SourceFile};
use crate::kinds::ArtifactKind;
use modkit_core::{register_mod, with_extended_mod, AppConfig, ModError, ModRequest, Platform};
use serde_json::{Map, Value};
use std::any::Any;

/// Register a typed edit for any artifact kind
pub fn with_artifact<T, F>(config: AppConfig, kind: ArtifactKind, action: F) -> AppConfig
where
    T: Any + Send,
    F: Fn(&mut AppConfig, &mut T, &ModRequest) -> Result<(), ModError> + Send + Sync + 'static,
{
    with_extended_mod(config, kind.platform(), kind.mod_name(), action)
}

pub fn with_gradle_properties<F>(config: AppConfig, action: F) -> AppConfig
where
    F: Fn(&mut AppConfig, &mut Vec<PropertiesItem>, &ModRequest) -> Result<(), ModError>
        + Send
        + Sync
        + 'static,
{
    with_artifact(config, ArtifactKind::AndroidGradleProperties, action)
}

pub fn with_app_build_gradle<F>(config: AppConfig, action: F) -> AppConfig
where
    F: Fn(&mut AppConfig, &mut SourceFile, &ModRequest) -> Result<(), ModError> + Send + Sync + 'static,
{
    with_artifact(config, ArtifactKind::AndroidAppBuildGradle, action)
}

pub fn with_project_build_gradle<F>(config: AppConfig, action: F) -> AppConfig
where
    F: Fn(&mut AppConfig, &mut SourceFile, &ModRequest) -> Result<(), ModError> + Send + Sync + 'static,
{
    with_artifact(config, ArtifactKind::AndroidProjectBuildGradle, action)
}

pub fn with_settings_gradle<F>(config: AppConfig, action: F) -> AppConfig
where
    F: Fn(&mut AppConfig, &mut SourceFile, &ModRequest) -> Result<(), ModError> + Send + Sync + 'static,
{
    with_artifact(config, ArtifactKind::AndroidSettingsGradle, action)
}

pub fn with_main_activity<F>(config: AppConfig, action: F) -> AppConfig
where
    F: Fn(&mut AppConfig, &mut SourceFile, &ModRequest) -> Result<(), ModError> + Send + Sync + 'static,
{
    with_artifact(config, ArtifactKind::AndroidMainActivity, action)
}

pub fn with_main_application<F>(config: AppConfig, action: F) -> AppConfig
where
    F: Fn(&mut AppConfig, &mut SourceFile, &ModRequest) -> Result<(), ModError> + Send + Sync + 'static,
{
    with_artifact(config, ArtifactKind::AndroidMainApplication, action)
}

/// `ios/Podfile.properties.json`
pub fn with_podfile_properties<F>(config: AppConfig, action: F) -> AppConfig
where
    F: Fn(&mut AppConfig, &mut Map<String, Value>, &ModRequest) -> Result<(), ModError>
        + Send
        + Sync
        + 'static,
{
    with_artifact(config, ArtifactKind::IosPodfileProperties, action)
}

pub fn with_app_delegate<F>(config: AppConfig, action: F) -> AppConfig
where
    F: Fn(&mut AppConfig, &mut SourceFile, &ModRequest) -> Result<(), ModError> + Send + Sync + 'static,
{
    with_artifact(config, ArtifactKind::IosAppDelegate, action)
}

/// Free-form work on the native project directory, no modResults
pub fn with_dangerous_mod<F>(config: AppConfig, platform: Platform, action: F) -> AppConfig
where
    F: Fn(&mut AppConfig, &ModRequest) -> Result<(), ModError> + Send + Sync + 'static,
{
    with_config_step(config, platform, "dangerous", action)
}

pub fn with_finalized_mod<F>(config: AppConfig, platform: Platform, action: F) -> AppConfig
where
    F: Fn(&mut AppConfig, &ModRequest) -> Result<(), ModError> + Send + Sync + 'static,
{
    with_config_step(config, platform, "finalized", action)
}

fn with_config_step<F>(config: AppConfig, platform: Platform, mod_name: &str, action: F) -> AppConfig
where
    F: Fn(&mut AppConfig, &ModRequest) -> Result<(), ModError> + Send + Sync + 'static,
{
    register_mod(config, platform, mod_name, move |mut ctx| {
        action(&mut ctx.config, &ctx.mod_request)?;
        ctx.forward()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use modkit_core::{ModContext, ModResults};
    use std::path::Path;

    #[test]
    fn test_typed_helpers_register_under_their_key() {
        let config = with_gradle_properties(AppConfig::new(), |_, _, _| Ok(()));
        let config = with_app_delegate(config, |_, _, _| Ok(()));
        let config = with_finalized_mod(config, Platform::Ios, |_, _| Ok(()));

        let Some(mods) = config.mods() else {
            assert!(false, "registry should exist");
            return;
        };
        assert_eq!(
            mods.entries().iter().map(|e| format!("{}.{}", e.platform, e.mod_name)).collect::<Vec<_>>(),
            vec!["android.gradleProperties", "ios.appDelegate", "ios.finalized"]
        );
    }

    #[test]
    fn test_dangerous_mod_sees_request_and_forwards() {
        let config = with_dangerous_mod(AppConfig::new(), Platform::Android, |config, request| {
            config.set("root", request.platform_project_root.display().to_string());
            Ok(())
        });
        let Some(chain) = config.mods().and_then(|m| m.get(Platform::Android, "dangerous")).cloned() else {
            return;
        };
        let request = ModRequest::new(Path::new("/app"), Platform::Android, "dangerous");
        let result = chain.invoke(ModContext::new(config, request));
        assert!(result.is_ok_and(|ctx| ctx.config.get_str("root") == Some("/app/android")));
    }

    #[test]
    fn test_wrong_document_type_names_the_key() {
        let config = with_podfile_properties(AppConfig::new(), |_, _, _| Ok(()));
        let Some(chain) = config.mods().and_then(|m| m.get(Platform::Ios, "podfileProperties")).cloned() else {
            return;
        };
        let request = ModRequest::new(Path::new("/app"), Platform::Ios, "podfileProperties");
        let ctx = ModContext::new(config, request).with_results(ModResults::new(String::new()));
        let result = chain.invoke(ctx);
        assert!(result.is_err_and(|e| e.to_string().contains("ios.podfileProperties")));
    }
}
