use crate::coordinate::ArtifactCoordinate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A downloadable file with its integrity data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub url: String,
    pub sha1: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Asset index a release's game files are resolved from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndex {
    pub id: String,
    pub sha1: String,
    pub size: u64,
    pub total_size: u64,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryDownloads {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<DownloadArtifact>,
    /// Per-classifier downloads, used for native bundles.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub classifiers: BTreeMap<String, DownloadArtifact>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OsConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
}

/// One entry of an ordered platform-applicability rule list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformRule {
    pub action: RuleAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OsConstraint>,
}

impl PlatformRule {
    pub fn allow() -> Self {
        Self {
            action: RuleAction::Allow,
            os: None,
        }
    }

    pub fn for_os(action: RuleAction, os: &str) -> Self {
        Self {
            action,
            os: Some(OsConstraint {
                name: Some(os.to_owned()),
                ..OsConstraint::default()
            }),
        }
    }

    pub fn os_name(&self) -> Option<&str> {
        self.os.as_ref().and_then(|os| os.name.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractRules {
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// One dependency of a version.
///
/// Values are never shared between records and never patched in place:
/// rewriting produces a new `LibraryRecord` through the `with_*` methods.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryRecord {
    pub name: ArtifactCoordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<LibraryDownloads>,
    /// OS name -> native classifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natives: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<ExtractRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<PlatformRule>>,
}

impl LibraryRecord {
    pub fn new(name: ArtifactCoordinate) -> Self {
        Self {
            name,
            url: None,
            downloads: None,
            natives: None,
            extract: None,
            rules: None,
        }
    }

    #[must_use]
    pub fn with_name(&self, name: ArtifactCoordinate) -> Self {
        Self {
            name,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_url(&self, url: Option<String>) -> Self {
        Self {
            url,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_artifact(&self, artifact: DownloadArtifact) -> Self {
        let mut downloads = self.downloads.clone().unwrap_or_default();
        downloads.artifact = Some(artifact);
        Self {
            downloads: Some(downloads),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn without_rules(&self) -> Self {
        Self {
            rules: None,
            ..self.clone()
        }
    }

    pub fn artifact(&self) -> Option<&DownloadArtifact> {
        self.downloads.as_ref().and_then(|d| d.artifact.as_ref())
    }

    pub fn classifier_download(&self, classifier: &str) -> Option<&DownloadArtifact> {
        self.downloads
            .as_ref()
            .and_then(|d| d.classifiers.get(classifier))
    }

    /// True when the rule list only ever allows macOS.
    pub fn is_macos_only(&self) -> bool {
        let Some(rules) = &self.rules else {
            return false;
        };
        let allows_osx = rules
            .iter()
            .any(|r| r.action == RuleAction::Allow && r.os_name() == Some("osx"));
        let allows_all = rules
            .iter()
            .any(|r| r.action == RuleAction::Allow && r.os.is_none());
        allows_osx && !allows_all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lib(s: &str) -> LibraryRecord {
        LibraryRecord::new(ArtifactCoordinate::parse(s).unwrap())
    }

    #[test]
    fn parses_upstream_library_entry() {
        let json = r#"{
            "name": "org.lwjgl.lwjgl:lwjgl-platform:2.9.4-nightly-20150209",
            "natives": {"linux": "natives-linux", "osx": "natives-osx", "windows": "natives-windows"},
            "extract": {"exclude": ["META-INF/"]},
            "rules": [{"action": "allow"}, {"action": "disallow", "os": {"name": "osx"}}],
            "downloads": {
                "classifiers": {
                    "natives-linux": {"url": "https://l/x.jar", "sha1": "aa", "size": 1}
                }
            }
        }"#;
        let parsed: LibraryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.name.version(), "2.9.4-nightly-20150209");
        assert_eq!(parsed.rules.as_ref().unwrap().len(), 2);
        assert_eq!(parsed.rules.as_ref().unwrap()[1].os_name(), Some("osx"));
        assert!(parsed.classifier_download("natives-linux").is_some());
        assert!(parsed.classifier_download("natives-osx").is_none());
    }

    #[test]
    fn omits_absent_fields_when_serialized() {
        let json = serde_json::to_string(&lib("net.x:lib:1.0")).unwrap();
        assert_eq!(json, r#"{"name":"net.x:lib:1.0"}"#);
    }

    #[test]
    fn with_methods_return_new_values() {
        let original = lib("net.x:lib:1.0").with_url(Some("http://a/".to_owned()));
        let changed = original.with_url(Some("https://a/".to_owned()));
        assert_eq!(original.url.as_deref(), Some("http://a/"));
        assert_eq!(changed.url.as_deref(), Some("https://a/"));
    }

    #[test]
    fn macos_only_detection() {
        let mut only_osx = lib("org.lwjgl:lwjgl:3.1.6");
        only_osx.rules = Some(vec![PlatformRule::for_os(RuleAction::Allow, "osx")]);
        assert!(only_osx.is_macos_only());

        let mut everywhere_but_osx = lib("org.lwjgl:lwjgl:3.1.6");
        everywhere_but_osx.rules = Some(vec![
            PlatformRule::allow(),
            PlatformRule::for_os(RuleAction::Disallow, "osx"),
        ]);
        assert!(!everywhere_but_osx.is_macos_only());

        assert!(!lib("org.lwjgl:lwjgl:3.1.6").is_macos_only());
    }
}
