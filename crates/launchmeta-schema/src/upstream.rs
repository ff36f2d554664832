//! Upstream document shapes, as handed over by the (external) document loader.
//!
//! Nothing here validates semantics: the loader guarantees the JSON shape, the
//! core decides what the content means.

use crate::coordinate::ArtifactCoordinate;
use crate::library::{AssetIndex, DownloadArtifact, LibraryRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Release document of the base platform, in the base platform's own format.
///
/// Add-on installers that embed a base-format document reuse this shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BaseReleaseDocument {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub release_type: Option<String>,
    pub release_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minecraft_arguments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<ArgumentsBlock>,
    #[serde(default)]
    pub libraries: Vec<LibraryRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<ReleaseDownloads>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_index: Option<AssetIndex>,
}

/// Per-side downloads of a base release. Only the client jar is consumed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReleaseDownloads {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<DownloadArtifact>,
}

impl BaseReleaseDocument {
    /// Plain string game arguments, conditional entries skipped.
    pub fn plain_game_arguments(&self) -> Vec<&str> {
        self.arguments
            .as_ref()
            .map(|a| {
                a.game
                    .iter()
                    .filter_map(|arg| match arg {
                        GameArgument::Plain(s) => Some(s.as_str()),
                        GameArgument::Conditional(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArgumentsBlock {
    #[serde(default)]
    pub game: Vec<GameArgument>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GameArgument {
    Plain(String),
    /// Rule-guarded argument; kept opaque.
    Conditional(serde_json::Value),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseFile {
    pub extension: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

/// One add-on release as listed in the distributor's release index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseIndexEntry {
    pub version: String,
    pub build: u32,
    #[serde(rename = "mcversion", default, skip_serializing_if = "Option::is_none")]
    pub mc_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// classifier -> file
    #[serde(default)]
    pub files: BTreeMap<String, ReleaseFile>,
}

const ADDON_GROUP: &str = "net.minecraftforge";
const ADDON_ARTIFACT: &str = "forge";
/// Base version whose installer never worked and is treated as absent.
const INSTALLER_BROKEN_BASE: &str = "1.5.2";

impl ReleaseIndexEntry {
    /// `{base}-{version}[-{branch}]`, the identifier used by upstream file names.
    pub fn long_version(&self) -> Option<String> {
        let mc = self.mc_version.as_deref()?;
        let mut long = format!("{mc}-{}", self.version);
        if let Some(branch) = &self.branch {
            long.push('-');
            long.push_str(branch);
        }
        Some(long)
    }

    /// Base version with the historical `_pre` spelling replaced by `-pre`.
    pub fn sane_base_version(&self) -> Option<String> {
        self.mc_version
            .as_deref()
            .map(|mc| mc.replacen("_pre", "-pre", 1))
    }

    fn file_coordinate(&self, classifier: &str) -> Option<ArtifactCoordinate> {
        let file = self.files.get(classifier)?;
        Some(
            ArtifactCoordinate::new(ADDON_GROUP, ADDON_ARTIFACT, self.long_version()?)
                .with_classifier(classifier)
                .with_extension(file.extension.clone()),
        )
    }

    pub fn installer_coordinate(&self) -> Option<ArtifactCoordinate> {
        self.file_coordinate("installer")
            .filter(|c| c.extension() == "jar")
    }

    /// The monolithic pre-installer artifact: `universal` when present, else `client`.
    pub fn universal_coordinate(&self) -> Option<ArtifactCoordinate> {
        ["universal", "client"]
            .iter()
            .filter_map(|classifier| self.file_coordinate(classifier))
            .find(|c| matches!(c.extension(), "jar" | "zip"))
    }

    pub fn uses_installer(&self) -> bool {
        self.installer_coordinate().is_some()
            && self.mc_version.as_deref() != Some(INSTALLER_BROKEN_BASE)
    }

    /// Coordinate of the artifact a user would download for this release.
    pub fn download_coordinate(&self) -> Option<ArtifactCoordinate> {
        if self.uses_installer() {
            self.installer_coordinate()
        } else {
            self.universal_coordinate()
        }
    }

    pub fn download_url(&self, maven_base: &str) -> Option<String> {
        self.download_coordinate()
            .map(|c| format!("{maven_base}{}", c.path()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallSection {
    pub minecraft: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<ArtifactCoordinate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileVersionInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub time: DateTime<Utc>,
    pub main_class: String,
    #[serde(default)]
    pub minecraft_arguments: String,
    #[serde(default)]
    pub libraries: Vec<LibraryRecord>,
}

/// First-generation install profile: install block plus an embedded version block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstallProfileV1 {
    pub install: InstallSection,
    pub version_info: ProfileVersionInfo,
}

/// Second-generation install profile, driven by the build-system installer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallProfileV2 {
    #[serde(default)]
    pub spec: u32,
    pub minecraft: String,
    #[serde(default)]
    pub libraries: Vec<LibraryRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum InstallProfile {
    Legacy(InstallProfileV1),
    BuildSystem(InstallProfileV2),
}

/// Integrity data of the installer jar, computed by the download layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallerInfo {
    #[serde(alias = "sha1hash")]
    pub sha1: String,
    pub size: u64,
}

/// Integrity data and release time of a pre-installer jar, recovered by the
/// archive inspector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyBuildInfo {
    pub release_time: DateTime<Utc>,
    pub sha1: String,
    pub size: u64,
}

/// Every upstream document the loader found for one add-on release.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDocuments {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_document: Option<BaseReleaseDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_profile: Option<InstallProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installer_info: Option<InstallerInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_info: Option<LegacyBuildInfo>,
}

/// Input bundle for one add-on release.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddonRelease {
    pub entry: ReleaseIndexEntry,
    #[serde(default)]
    pub documents: AvailableDocuments,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mc: Option<&str>, files: &[(&str, &str)]) -> ReleaseIndexEntry {
        ReleaseIndexEntry {
            version: "10.13.4.1614".to_owned(),
            build: 1614,
            mc_version: mc.map(str::to_owned),
            branch: Some("1.7.10".to_owned()),
            files: files
                .iter()
                .map(|(c, e)| {
                    (
                        (*c).to_owned(),
                        ReleaseFile {
                            extension: (*e).to_owned(),
                            hash: None,
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn long_and_sane_versions() {
        let e = entry(Some("1.7.10_pre4"), &[]);
        assert_eq!(
            e.long_version().as_deref(),
            Some("1.7.10_pre4-10.13.4.1614-1.7.10")
        );
        assert_eq!(e.sane_base_version().as_deref(), Some("1.7.10-pre4"));
        assert_eq!(entry(None, &[]).long_version(), None);
    }

    #[test]
    fn installer_url_preferred() {
        let e = entry(
            Some("1.7.10"),
            &[("installer", "jar"), ("universal", "jar"), ("changelog", "txt")],
        );
        assert!(e.uses_installer());
        assert_eq!(
            e.download_url("https://maven.minecraftforge.net/").as_deref(),
            Some(
                "https://maven.minecraftforge.net/net/minecraftforge/forge/1.7.10-10.13.4.1614-1.7.10/forge-1.7.10-10.13.4.1614-1.7.10-installer.jar"
            )
        );
    }

    #[test]
    fn broken_installer_base_falls_back_to_universal() {
        let e = entry(Some("1.5.2"), &[("installer", "jar"), ("universal", "zip")]);
        assert!(!e.uses_installer());
        assert_eq!(e.download_coordinate().unwrap().classifier(), Some("universal"));
        assert_eq!(e.download_coordinate().unwrap().extension(), "zip");
    }

    #[test]
    fn client_used_when_no_universal() {
        let e = entry(Some("1.1"), &[("client", "zip"), ("server", "zip")]);
        assert_eq!(e.download_coordinate().unwrap().classifier(), Some("client"));
        assert!(entry(Some("1.1"), &[("changelog", "txt")])
            .download_coordinate()
            .is_none());
    }

    #[test]
    fn install_profile_generations_are_distinguished() {
        let v1 = r#"{
            "install": {"minecraft": "1.7.10", "path": "net.minecraftforge:forge:1.7.10-10.13.4.1614-1.7.10"},
            "versionInfo": {
                "time": "2015-05-23T13:31:48Z",
                "mainClass": "net.minecraft.launchwrapper.Launch",
                "minecraftArguments": "--tweakClass cpw.mods.fml.common.launcher.FMLTweaker",
                "libraries": [{"name": "net.minecraft:launchwrapper:1.12"}]
            }
        }"#;
        let v2 = r#"{"spec": 0, "minecraft": "1.16.5", "libraries": []}"#;
        assert!(matches!(
            serde_json::from_str::<InstallProfile>(v1).unwrap(),
            InstallProfile::Legacy(_)
        ));
        assert!(matches!(
            serde_json::from_str::<InstallProfile>(v2).unwrap(),
            InstallProfile::BuildSystem(_)
        ));
    }

    #[test]
    fn plain_game_arguments_skip_conditionals() {
        let doc: BaseReleaseDocument = serde_json::from_str(
            r#"{
                "id": "1.16.5",
                "releaseTime": "2021-01-14T16:05:32+00:00",
                "arguments": {"game": ["--username", "${auth_player_name}", {"rules": [], "value": "--demo"}]}
            }"#,
        )
        .unwrap();
        assert_eq!(
            doc.plain_game_arguments(),
            vec!["--username", "${auth_player_name}"]
        );
        assert!(doc.libraries.is_empty());
    }

    #[test]
    fn client_jar_and_asset_index_are_read() {
        let doc: BaseReleaseDocument = serde_json::from_str(
            r#"{
                "id": "1.7.10",
                "releaseTime": "2014-05-14T17:29:23+00:00",
                "assetIndex": {"id": "1.7.10", "sha1": "1863782e", "size": 72996, "totalSize": 112396854, "url": "https://launchermeta.mojang.com/v1/packages/1863782e/1.7.10.json"},
                "downloads": {
                    "client": {"sha1": "e80d9b3b", "size": 5256245, "url": "https://launcher.mojang.com/v1/objects/e80d9b3b/client.jar"},
                    "server": {"sha1": "952438ac", "size": 9605030, "url": "https://launcher.mojang.com/v1/objects/952438ac/server.jar"}
                }
            }"#,
        )
        .unwrap();
        let client = doc.downloads.unwrap().client.unwrap();
        assert_eq!(client.size, 5_256_245);
        assert_eq!(doc.asset_index.unwrap().total_size, 112_396_854);
    }
}
