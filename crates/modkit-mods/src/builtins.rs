//! Built-in config plugins for the text artifacts modkit can edit itself

use crate::adapters::{set_property, SourceFile};
use crate::with_mods::{with_app_build_gradle, with_gradle_properties, with_podfile_properties};
use modkit_core::{
    create_run_once_plugin, with_plugins, AppConfig, ConfigPlugin, ModError, ModRequest, PluginError, Platform,
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

const DEFAULT_JS_ENGINE: &str = "hermes";
const BUILTIN_VERSION: &str = env!("CARGO_PKG_VERSION");

type Pattern = Lazy<Result<Regex, regex::Error>>;

static APPLICATION_ID: Pattern = Lazy::new(|| Regex::new(r#"(applicationId\s*=?\s*)["'][^"']*["']"#));
static NAMESPACE: Pattern = Lazy::new(|| Regex::new(r#"(namespace\s*=?\s*)["'][^"']*["']"#));
static VERSION_NAME: Pattern = Lazy::new(|| Regex::new(r#"(versionName\s*=?\s*)["'][^"']*["']"#));
static VERSION_CODE: Pattern = Lazy::new(|| Regex::new(r"(versionCode\s*=?\s*)\d+"));

/// `jsEngine` for a platform: the platform section wins over the top-level field
pub fn js_engine(config: &AppConfig, platform: Platform) -> String {
    config
        .get_path_str(&[platform.as_str(), "jsEngine"])
        .or_else(|| config.get_str("jsEngine"))
        .unwrap_or(DEFAULT_JS_ENGINE)
        .to_string()
}

/// `hermesEnabled` in gradle.properties and `expo.jsEngine` in Podfile.properties.json
pub fn with_js_engine(config: AppConfig) -> AppConfig {
    let config = with_gradle_properties(config, |config, items, _request| {
        let enabled = js_engine(config, Platform::Android) == "hermes";
        set_property(items, "hermesEnabled", if enabled { "true" } else { "false" });
        Ok(())
    });
    with_podfile_properties(config, |config, properties, _request| {
        properties.insert(
            "expo.jsEngine".to_string(),
            Value::String(js_engine(config, Platform::Ios)),
        );
        Ok(())
    })
}

/// `android.package` as the `applicationId` and `namespace` in app/build.gradle
pub fn with_android_package(config: AppConfig) -> AppConfig {
    with_app_build_gradle(config, |config, build_gradle, request| {
        let Some(package) = config.get_path_str(&["android", "package"]) else {
            return Ok(());
        };
        replace_in(build_gradle, &APPLICATION_ID, request, |prefix| format!("{prefix}\"{package}\""))?;
        replace_in(build_gradle, &NAMESPACE, request, |prefix| format!("{prefix}\"{package}\""))
    })
}

/// `version` and `android.versionCode` as `versionName` and `versionCode`
pub fn with_android_version(config: AppConfig) -> AppConfig {
    with_app_build_gradle(config, |config, build_gradle, request| {
        if let Some(version) = config.version() {
            replace_in(build_gradle, &VERSION_NAME, request, |prefix| format!("{prefix}\"{version}\""))?;
        }
        if let Some(code) = config
            .get_path(&["android", "versionCode"])
            .and_then(Value::as_u64)
        {
            replace_in(build_gradle, &VERSION_CODE, request, |prefix| format!("{prefix}{code}"))?;
        }
        Ok(())
    })
}

/// Rewrite every match, keeping the first capture group as the prefix
fn replace_in<F>(source: &mut SourceFile, pattern: &Pattern, request: &ModRequest, render: F) -> Result<(), ModError>
where
    F: Fn(&str) -> String,
{
    let regex = pattern.as_ref().map_err(|err| ModError::Action {
        platform: request.platform,
        mod_name: request.mod_name.clone(),
        message: format!("Invalid pattern for {}: {}", source.path.display(), err),
    })?;
    let replaced = regex.replace_all(&source.contents, |caps: &Captures| {
        render(caps.get(1).map_or("", |m| m.as_str()))
    });
    if replaced != source.contents {
        source.contents = replaced.into_owned();
    }
    Ok(())
}

/// Every built-in plugin, each applied at most once per config
pub fn builtin_plugins() -> Vec<ConfigPlugin> {
    vec![
        create_run_once_plugin(
            ConfigPlugin::new("withJsEngine", |config, _props| Ok(with_js_engine(config))),
            "withJsEngine",
            Some(BUILTIN_VERSION),
        ),
        create_run_once_plugin(
            ConfigPlugin::new("withAndroidPackage", |config, _props| Ok(with_android_package(config))),
            "withAndroidPackage",
            Some(BUILTIN_VERSION),
        ),
        create_run_once_plugin(
            ConfigPlugin::new("withAndroidVersion", |config, _props| Ok(with_android_version(config))),
            "withAndroidVersion",
            Some(BUILTIN_VERSION),
        ),
    ]
}

pub fn with_builtin_plugins(config: AppConfig) -> Result<AppConfig, PluginError> {
    with_plugins(config, builtin_plugins())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{compile_mods, CompileOptions};
    use modkit_core::RunContext;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    const BUILD_GRADLE: &str = r#"android {
    namespace 'com.old.app'
    defaultConfig {
        applicationId 'com.old.app'
        versionCode 1
        versionName "1.0.0"
    }
}
"#;

    fn project() -> Option<TempDir> {
        let tmp = TempDir::new().ok()?;
        fs::create_dir_all(tmp.path().join("android/app")).ok()?;
        fs::create_dir_all(tmp.path().join("ios")).ok()?;
        fs::write(tmp.path().join("android/app/build.gradle"), BUILD_GRADLE).ok()?;
        fs::write(tmp.path().join("android/gradle.properties"), "hermesEnabled=true\n").ok()?;
        fs::write(tmp.path().join("ios/Podfile.properties.json"), "{}\n").ok()?;
        Some(tmp)
    }

    fn config() -> AppConfig {
        AppConfig::new()
            .with_field("version", "2.1.0")
            .with_field("jsEngine", "jsc")
            .with_field("android", json!({"package": "com.new.app", "versionCode": 7}))
    }

    #[test]
    fn test_builtin_plugins_rewrite_native_files() {
        let Some(tmp) = project() else {
            return;
        };
        let Ok(config) = with_builtin_plugins(config()) else {
            assert!(false, "built-in plugins never fail");
            return;
        };
        let result = compile_mods(config, tmp.path(), &RunContext::new(), &CompileOptions::default());
        assert!(result.is_ok());

        let gradle = fs::read_to_string(tmp.path().join("android/app/build.gradle")).unwrap_or_default();
        assert!(gradle.contains("namespace \"com.new.app\""));
        assert!(gradle.contains("applicationId \"com.new.app\""));
        assert!(gradle.contains("versionCode 7"));
        assert!(gradle.contains("versionName \"2.1.0\""));

        let properties = fs::read_to_string(tmp.path().join("android/gradle.properties")).ok();
        assert_eq!(properties.as_deref(), Some("hermesEnabled=false\n"));
        let podfile = fs::read_to_string(tmp.path().join("ios/Podfile.properties.json")).unwrap_or_default();
        assert!(podfile.contains("\"expo.jsEngine\": \"jsc\""));
    }

    #[test]
    fn test_builtin_plugins_run_once() {
        let Ok(once) = with_builtin_plugins(config()) else {
            return;
        };
        let Ok(twice) = with_builtin_plugins(once) else {
            return;
        };
        let depth = twice
            .mods()
            .and_then(|m| m.get(Platform::Android, "appBuildGradle"))
            .map(|c| c.depth());
        assert_eq!(depth, Some(2));
    }

    #[test]
    fn test_invalid_pattern_fails_the_mod() {
        static BROKEN: Pattern = Lazy::new(|| Regex::new("(unclosed"));
        let mut source = SourceFile {
            path: "android/app/build.gradle".into(),
            language: crate::adapters::Language::Groovy,
            contents: "versionCode 1\n".to_string(),
        };
        let request = ModRequest::new(std::path::Path::new("/app"), Platform::Android, "appBuildGradle");
        let result = replace_in(&mut source, &BROKEN, &request, |prefix| prefix.to_string());
        assert!(result.is_err_and(|e| e.code() == "MOD_FAILED" && e.to_string().contains("appBuildGradle")));
        assert_eq!(source.contents, "versionCode 1\n");
    }

    #[test]
    fn test_platform_js_engine_overrides_top_level() {
        let config = AppConfig::new()
            .with_field("jsEngine", "jsc")
            .with_field("ios", json!({"jsEngine": "hermes"}));
        assert_eq!(js_engine(&config, Platform::Ios), "hermes");
        assert_eq!(js_engine(&config, Platform::Android), "jsc");
        assert_eq!(js_engine(&AppConfig::new(), Platform::Android), "hermes");
    }
}
