//! Integration tests for modkit

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::io;
use std::path::Path;
use tempfile::TempDir;

struct Project {
    root: TempDir,
    home: TempDir,
}

impl Project {
    fn new(app_json: &str) -> io::Result<Self> {
        let root = TempDir::new()?;
        let home = TempDir::new()?;
        fs::write(
            root.path().join("package.json"),
            r#"{"name": "demo-app", "version": "1.2.3"}"#,
        )?;
        fs::write(root.path().join("app.json"), app_json)?;
        Ok(Project { root, home })
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = cargo_bin_cmd!("modkit");
        cmd.env("MODKIT_CONFIG_DIR", self.home.path());
        cmd.env_remove("RUST_LOG");
        cmd.args(args).arg("--project-root").arg(self.path());
        cmd
    }

    fn write(&self, relative: &str, contents: &str) -> io::Result<()> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path().join(relative)).unwrap_or_default()
    }
}

fn modkit_cmd() -> Command {
    cargo_bin_cmd!("modkit")
}

#[test]
fn test_version() {
    modkit_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("modkit"));
}

#[test]
fn test_help() {
    modkit_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("modkit resolves app configs"));
}

#[test]
fn test_invalid_command() {
    modkit_cmd().arg("invalid").assert().failure();
}

#[test]
fn test_config_json_applies_package_defaults() {
    let Ok(project) = Project::new(r#"{"expo": {"name": "My App"}}"#) else {
        return;
    };
    project
        .command(&["config", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"slug\": \"my-app\""))
        .stdout(predicate::str::contains("\"version\": \"1.2.3\""));
}

#[test]
fn test_public_config_hides_internal_fields() {
    let Ok(project) = Project::new(r#"{"name": "x", "hooks": {"postPublish": []}}"#) else {
        return;
    };
    project
        .command(&["config", "--json", "--public"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_internal").not())
        .stdout(predicate::str::contains("hooks").not());
}

#[test]
fn test_installed_javascript_plugin_is_skipped_with_warning() {
    let Ok(project) = Project::new(r#"{"name": "x", "plugins": [["demo-plugin", {"flag": true}]]}"#) else {
        return;
    };
    if project
        .write("node_modules/demo-plugin/package.json", r#"{"name": "demo-plugin"}"#)
        .is_err()
        || project
            .write("node_modules/demo-plugin/index.js", "module.exports = (config) => config;\n")
            .is_err()
    {
        return;
    }

    project
        .command(&["config", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"slug\": \"x\""))
        .stderr(predicate::str::contains("Skipping plugin demo-plugin"));
}

#[test]
fn test_missing_plugin_package_fails() {
    let Ok(project) = Project::new(r#"{"name": "x", "plugins": ["not-installed"]}"#) else {
        return;
    };
    project
        .command(&["config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PLUGIN_NOT_FOUND"));
}

#[test]
fn test_missing_package_json_fails() {
    let Ok(project) = Project::new(r#"{"name": "x"}"#) else {
        return;
    };
    let _ = fs::remove_file(project.path().join("package.json"));
    project
        .command(&["config"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("MODULE_NOT_FOUND"));
}

#[test]
fn test_prebuild_android_rewrites_gradle_files() {
    let Ok(project) = Project::new(
        r#"{"name": "x", "jsEngine": "jsc", "android": {"package": "com.example.x", "versionCode": 4}}"#,
    ) else {
        return;
    };
    let build_gradle = "android {\n    namespace 'com.old'\n    defaultConfig {\n        applicationId 'com.old'\n        versionCode 1\n        versionName \"0.0.1\"\n    }\n}\n";
    if project.write("android/app/build.gradle", build_gradle).is_err()
        || project.write("android/gradle.properties", "hermesEnabled=true\n").is_err()
    {
        return;
    }

    project
        .command(&["prebuild", "--platform", "android"])
        .assert()
        .success();

    assert_eq!(project.read("android/gradle.properties"), "hermesEnabled=false\n");
    let gradle = project.read("android/app/build.gradle");
    assert!(gradle.contains("applicationId \"com.example.x\""));
    assert!(gradle.contains("versionName \"1.2.3\""));
    assert!(gradle.contains("versionCode 4"));
    assert!(!project.path().join("ios").exists());
}

#[test]
fn test_prebuild_introspect_writes_nothing() {
    let Ok(project) = Project::new(r#"{"name": "x", "jsEngine": "jsc"}"#) else {
        return;
    };
    if project.write("android/app/build.gradle", "android {}\n").is_err()
        || project.write("android/gradle.properties", "hermesEnabled=true\n").is_err()
    {
        return;
    }

    project
        .command(&["prebuild", "--platform", "android", "--introspect"])
        .assert()
        .success();
    assert_eq!(project.read("android/gradle.properties"), "hermesEnabled=true\n");
}

#[test]
fn test_prebuild_missing_required_artifact_fails() {
    let Ok(project) = Project::new(r#"{"name": "x"}"#) else {
        return;
    };
    if project.write("android/app/build.gradle", "android {}\n").is_err() {
        return;
    }
    project
        .command(&["prebuild", "--platform", "android"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ARTIFACT_IO"));
}

#[test]
fn test_prebuild_optional_artifact_is_a_warning() {
    let Ok(project) = Project::new(r#"{"name": "x"}"#) else {
        return;
    };
    if project.write("ios/Podfile.properties.json", "not json").is_err() {
        return;
    }

    project
        .command(&["prebuild", "--platform", "ios"])
        .assert()
        .success()
        .stderr(predicate::str::contains("ios.podfileProperties"));
    assert_eq!(project.read("ios/Podfile.properties.json"), "not json");
}

#[test]
fn test_prebuild_skips_platforms_without_native_project() {
    let Ok(project) = Project::new(r#"{"name": "x"}"#) else {
        return;
    };
    if project.write("android/app/build.gradle", "android {}\n").is_err()
        || project.write("android/gradle.properties", "hermesEnabled=false\n").is_err()
    {
        return;
    }

    project.command(&["prebuild"]).assert().success();
    assert_eq!(project.read("android/gradle.properties"), "hermesEnabled=true\n");
    assert!(!project.path().join("ios").exists());
}

#[test]
fn test_unknown_platform_rejected() {
    let Ok(project) = Project::new(r#"{"name": "x"}"#) else {
        return;
    };
    project
        .command(&["prebuild", "--platform", "web"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("web"));
}
