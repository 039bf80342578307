//! Deterministic artifact locations under the native project directories

use crate::errors::AdapterError;
use crate::kinds::ArtifactKind;
use modkit_core::{AppConfig, ModRequest};
use smallvec::{smallvec, SmallVec};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const ANDROID_MAIN: &str = "app/src/main";
const ANDROID_RES: &str = "app/src/main/res";

type Candidates = SmallVec<[PathBuf; 3]>;

/// Locate the file a base provider reads and writes
pub fn artifact_path(kind: ArtifactKind, request: &ModRequest) -> Result<PathBuf, AdapterError> {
    resolve_artifact_path(
        kind,
        &request.platform_project_root,
        request.project_name.as_deref(),
    )
}

/// Same as [`artifact_path`], from the platform root (`{projectRoot}/{platform}`) directly
pub fn resolve_artifact_path(
    kind: ArtifactKind,
    platform_root: &Path,
    project_name: Option<&str>,
) -> Result<PathBuf, AdapterError> {
    let root = platform_root;
    let path = match kind {
        ArtifactKind::AndroidManifest => root.join(ANDROID_MAIN).join("AndroidManifest.xml"),
        ArtifactKind::AndroidStrings => root.join(ANDROID_RES).join("values/strings.xml"),
        ArtifactKind::AndroidColors => root.join(ANDROID_RES).join("values/colors.xml"),
        ArtifactKind::AndroidColorsNight => root.join(ANDROID_RES).join("values-night/colors.xml"),
        ArtifactKind::AndroidStyles => root.join(ANDROID_RES).join("values/styles.xml"),
        ArtifactKind::AndroidGradleProperties => root.join("gradle.properties"),
        ArtifactKind::AndroidAppBuildGradle => gradle_file(&root.join("app"), "build"),
        ArtifactKind::AndroidProjectBuildGradle => gradle_file(root, "build"),
        ArtifactKind::AndroidSettingsGradle => gradle_file(root, "settings"),
        ArtifactKind::AndroidMainActivity => find_android_source(root, "MainActivity")?,
        ArtifactKind::AndroidMainApplication => find_android_source(root, "MainApplication")?,
        ArtifactKind::IosPodfileProperties => root.join("Podfile.properties.json"),
        ArtifactKind::IosInfoPlist => {
            let name = require_project_name(kind, project_name)?;
            root.join(name).join("Info.plist")
        }
        ArtifactKind::IosEntitlements => {
            let name = require_project_name(kind, project_name)?;
            root.join(name).join(format!("{name}.entitlements"))
        }
        ArtifactKind::IosExpoPlist => {
            let name = require_project_name(kind, project_name)?;
            root.join(name).join("Supporting/Expo.plist")
        }
        ArtifactKind::IosXcodeproj => {
            let name = require_project_name(kind, project_name)?;
            root.join(format!("{name}.xcodeproj")).join("project.pbxproj")
        }
        ArtifactKind::IosAppDelegate => {
            let name = require_project_name(kind, project_name)?;
            let dir = root.join(name);
            let candidates: Candidates = smallvec![
                dir.join("AppDelegate.swift"),
                dir.join("AppDelegate.mm"),
                dir.join("AppDelegate.m"),
            ];
            first_existing(&candidates).ok_or_else(|| {
                AdapterError::Unresolved(format!("no AppDelegate found in {}", dir.display()))
            })?
        }
        ArtifactKind::AndroidTheme
        | ArtifactKind::AndroidDangerous
        | ArtifactKind::AndroidFinalized
        | ArtifactKind::IosDangerous
        | ArtifactKind::IosFinalized => {
            return Err(AdapterError::Unresolved(format!(
                "{kind} does not map to a single file"
            )))
        }
    };
    Ok(path)
}

/// `{name}.gradle`, or `{name}.gradle.kts` when only the Kotlin script exists
fn gradle_file(dir: &Path, name: &str) -> PathBuf {
    let candidates: Candidates = smallvec![
        dir.join(format!("{name}.gradle")),
        dir.join(format!("{name}.gradle.kts")),
    ];
    first_existing(&candidates).unwrap_or_else(|| candidates[0].clone())
}

fn first_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|path| path.is_file()).cloned()
}

fn require_project_name(kind: ArtifactKind, project_name: Option<&str>) -> Result<&str, AdapterError> {
    project_name.ok_or_else(|| {
        AdapterError::Unresolved(format!("{kind} needs the native project name"))
    })
}

/// Walk `app/src/main/java` for `{class_name}.java` or `{class_name}.kt`
fn find_android_source(platform_root: &Path, class_name: &str) -> Result<PathBuf, AdapterError> {
    let source_root = platform_root.join(ANDROID_MAIN).join("java");
    let found = WalkDir::new(&source_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .find(|e| {
            let path = e.path();
            path.file_stem().is_some_and(|stem| stem == class_name)
                && path
                    .extension()
                    .is_some_and(|ext| ext == "java" || ext == "kt")
        })
        .map(walkdir::DirEntry::into_path);

    found.ok_or_else(|| {
        AdapterError::Unresolved(format!(
            "no {class_name}.java or {class_name}.kt under {}",
            source_root.display()
        ))
    })
}

/// Native iOS project name: the `.xcodeproj` in `{root}/ios`, else the sanitized config name
pub fn ios_project_name(project_root: &Path, config: &AppConfig) -> Option<String> {
    let ios_root = project_root.join("ios");
    if let Ok(entries) = fs::read_dir(&ios_root) {
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir() && p.extension().is_some_and(|ext| ext == "xcodeproj"))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .filter(|name| name != "Pods")
            .collect();
        names.sort();
        if let Some(name) = names.into_iter().next() {
            debug!("Using iOS project {}.xcodeproj", name);
            return Some(name);
        }
    }
    config.name().map(sanitize_project_name)
}

/// Keep ASCII letters and digits; `app` when nothing is left
pub fn sanitize_project_name(name: &str) -> String {
    let sanitized: String = name.chars().filter(char::is_ascii_alphanumeric).collect();
    if sanitized.is_empty() {
        "app".to_string()
    } else {
        sanitized
    }
}
