//! Every base mod key modkit knows how to provide

use modkit_core::Platform;
use std::fmt;

/// What happens when reading or writing the artifact fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactPolicy {
    /// Load-bearing: the error aborts compilation
    Required,
    /// Optional enhancement: the error becomes a warning
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    AndroidManifest,
    AndroidStrings,
    AndroidColors,
    AndroidColorsNight,
    AndroidStyles,
    AndroidGradleProperties,
    AndroidAppBuildGradle,
    AndroidProjectBuildGradle,
    AndroidSettingsGradle,
    AndroidMainActivity,
    AndroidMainApplication,
    AndroidDangerous,
    AndroidFinalized,
    /// Colors and styles provided together
    AndroidTheme,
    IosInfoPlist,
    IosEntitlements,
    IosExpoPlist,
    IosPodfileProperties,
    IosXcodeproj,
    IosAppDelegate,
    IosDangerous,
    IosFinalized,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 22] = [
        ArtifactKind::AndroidManifest,
        ArtifactKind::AndroidStrings,
        ArtifactKind::AndroidColors,
        ArtifactKind::AndroidColorsNight,
        ArtifactKind::AndroidStyles,
        ArtifactKind::AndroidGradleProperties,
        ArtifactKind::AndroidAppBuildGradle,
        ArtifactKind::AndroidProjectBuildGradle,
        ArtifactKind::AndroidSettingsGradle,
        ArtifactKind::AndroidMainActivity,
        ArtifactKind::AndroidMainApplication,
        ArtifactKind::AndroidDangerous,
        ArtifactKind::AndroidFinalized,
        ArtifactKind::AndroidTheme,
        ArtifactKind::IosInfoPlist,
        ArtifactKind::IosEntitlements,
        ArtifactKind::IosExpoPlist,
        ArtifactKind::IosPodfileProperties,
        ArtifactKind::IosXcodeproj,
        ArtifactKind::IosAppDelegate,
        ArtifactKind::IosDangerous,
        ArtifactKind::IosFinalized,
    ];

    pub fn platform(self) -> Platform {
        match self {
            ArtifactKind::AndroidManifest
            | ArtifactKind::AndroidStrings
            | ArtifactKind::AndroidColors
            | ArtifactKind::AndroidColorsNight
            | ArtifactKind::AndroidStyles
            | ArtifactKind::AndroidGradleProperties
            | ArtifactKind::AndroidAppBuildGradle
            | ArtifactKind::AndroidProjectBuildGradle
            | ArtifactKind::AndroidSettingsGradle
            | ArtifactKind::AndroidMainActivity
            | ArtifactKind::AndroidMainApplication
            | ArtifactKind::AndroidDangerous
            | ArtifactKind::AndroidFinalized
            | ArtifactKind::AndroidTheme => Platform::Android,
            ArtifactKind::IosInfoPlist
            | ArtifactKind::IosEntitlements
            | ArtifactKind::IosExpoPlist
            | ArtifactKind::IosPodfileProperties
            | ArtifactKind::IosXcodeproj
            | ArtifactKind::IosAppDelegate
            | ArtifactKind::IosDangerous
            | ArtifactKind::IosFinalized => Platform::Ios,
        }
    }

    pub fn mod_name(self) -> &'static str {
        match self {
            ArtifactKind::AndroidManifest => "manifest",
            ArtifactKind::AndroidStrings => "strings",
            ArtifactKind::AndroidColors => "colors",
            ArtifactKind::AndroidColorsNight => "colorsNight",
            ArtifactKind::AndroidStyles => "styles",
            ArtifactKind::AndroidGradleProperties => "gradleProperties",
            ArtifactKind::AndroidAppBuildGradle => "appBuildGradle",
            ArtifactKind::AndroidProjectBuildGradle => "projectBuildGradle",
            ArtifactKind::AndroidSettingsGradle => "settingsGradle",
            ArtifactKind::AndroidMainActivity => "mainActivity",
            ArtifactKind::AndroidMainApplication => "mainApplication",
            ArtifactKind::AndroidDangerous | ArtifactKind::IosDangerous => "dangerous",
            ArtifactKind::AndroidFinalized | ArtifactKind::IosFinalized => "finalized",
            ArtifactKind::AndroidTheme => "theme",
            ArtifactKind::IosInfoPlist => "infoPlist",
            ArtifactKind::IosEntitlements => "entitlements",
            ArtifactKind::IosExpoPlist => "expoPlist",
            ArtifactKind::IosPodfileProperties => "podfileProperties",
            ArtifactKind::IosXcodeproj => "xcodeproj",
            ArtifactKind::IosAppDelegate => "appDelegate",
        }
    }

    pub fn policy(self) -> ArtifactPolicy {
        match self {
            ArtifactKind::AndroidStrings
            | ArtifactKind::AndroidColors
            | ArtifactKind::AndroidColorsNight
            | ArtifactKind::AndroidStyles
            | ArtifactKind::AndroidTheme
            | ArtifactKind::IosEntitlements
            | ArtifactKind::IosExpoPlist
            | ArtifactKind::IosPodfileProperties => ArtifactPolicy::Optional,
            _ => ArtifactPolicy::Required,
        }
    }

    /// Keys that own no file and only order work before or after the others
    pub fn owns_artifact(self) -> bool {
        !matches!(
            self,
            ArtifactKind::AndroidDangerous
                | ArtifactKind::AndroidFinalized
                | ArtifactKind::IosDangerous
                | ArtifactKind::IosFinalized
        )
    }

    /// The two independent artifacts behind a paired key
    pub fn pair(self) -> Option<(ArtifactKind, ArtifactKind)> {
        match self {
            ArtifactKind::AndroidTheme => Some((ArtifactKind::AndroidColors, ArtifactKind::AndroidStyles)),
            _ => None,
        }
    }

    pub fn from_key(platform: Platform, mod_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.platform() == platform && kind.mod_name() == mod_name)
    }

    pub fn for_platform(platform: Platform) -> impl Iterator<Item = ArtifactKind> {
        Self::ALL
            .into_iter()
            .filter(move |kind| kind.platform() == platform)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.platform(), self.mod_name())
    }
}
