//! Library override engine.
//!
//! Decides, per library an add-on declares, whether the base platform already
//! supplies it (drop) or whether it must be kept, and rewrites kept entries to
//! canonical hosts and names.

use crate::components::BASE_PACKAGE;
use crate::version_order::{compare_relaxed, RelaxedVersion};
use crate::ReconcileError;
use launchmeta_schema::{ArtifactCoordinate, DownloadArtifact, LibraryRecord, VersionRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Fixup for the add-on's own artifact, historically published under an
/// umbrella name that collides with its group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct SelfReferenceRule {
    pub group: String,
    pub umbrella_artifact: String,
    pub canonical_artifact: String,
    pub classifier: String,
}

impl Default for SelfReferenceRule {
    fn default() -> Self {
        Self {
            group: "net.minecraftforge".to_owned(),
            umbrella_artifact: "minecraftforge".to_owned(),
            canonical_artifact: "forge".to_owned(),
            classifier: "universal".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct RewriteTable {
    /// Maven root that re-pointed artifacts are served from, with trailing `/`.
    pub canonical_maven: String,
    /// Literal URL prefix substitutions.
    pub host_rewrites: BTreeMap<String, String>,
    pub self_reference: SelfReferenceRule,
    /// When set, a renamed umbrella artifact gets version `{prefix}-{version}`.
    #[serde(skip)]
    pub umbrella_version_prefix: Option<String>,
}

impl Default for RewriteTable {
    fn default() -> Self {
        let canonical = "https://maven.minecraftforge.net/".to_owned();
        let mut host_rewrites = BTreeMap::new();
        host_rewrites.insert("http://maven.minecraftforge.net/".to_owned(), canonical.clone());
        host_rewrites.insert(
            "http://files.minecraftforge.net/maven/".to_owned(),
            canonical.clone(),
        );
        Self {
            canonical_maven: canonical,
            host_rewrites,
            self_reference: SelfReferenceRule::default(),
            umbrella_version_prefix: None,
        }
    }
}

impl RewriteTable {
    /// Copy of this table that pins renamed umbrella artifacts to `base_version`.
    #[must_use]
    pub fn pinned_to_base(&self, base_version: &str) -> Self {
        Self {
            umbrella_version_prefix: Some(base_version.to_owned()),
            ..self.clone()
        }
    }

    pub fn rewrite_url(&self, url: &str) -> String {
        for (from, to) in &self.host_rewrites {
            if let Some(rest) = url.strip_prefix(from.as_str()) {
                return format!("{to}{rest}");
            }
        }
        url.to_owned()
    }

    pub fn canonical_url(&self, name: &ArtifactCoordinate) -> String {
        format!("{}{}", self.canonical_maven, name.path())
    }

    /// Point an existing download artifact at the canonical host for the
    /// library's current name. Libraries without a download are returned as is.
    #[must_use]
    pub fn repoint(&self, lib: &LibraryRecord) -> LibraryRecord {
        match lib.artifact() {
            Some(artifact) => lib.with_artifact(DownloadArtifact {
                url: self.canonical_url(&lib.name),
                path: Some(lib.name.path()),
                ..artifact.clone()
            }),
            None => lib.clone(),
        }
    }

    /// Apply host substitutions to the library URL and its download artifact.
    #[must_use]
    pub fn rewrite_hosts(&self, lib: &LibraryRecord) -> LibraryRecord {
        let mut out = lib.with_url(lib.url.as_deref().map(|u| self.rewrite_url(u)));
        if let Some(artifact) = lib.artifact() {
            out = out.with_artifact(DownloadArtifact {
                url: self.rewrite_url(&artifact.url),
                ..artifact.clone()
            });
        }
        out
    }

    /// Apply host substitutions and the self-reference fixup.
    #[must_use]
    pub fn rewrite(&self, lib: &LibraryRecord) -> LibraryRecord {
        let rule = &self.self_reference;
        let name = &lib.name;
        let renamed = if name.group() != rule.group {
            None
        } else if name.artifact() == rule.umbrella_artifact {
            let mut fixed = name
                .with_artifact(rule.canonical_artifact.as_str())
                .with_classifier(rule.classifier.as_str());
            if let Some(prefix) = &self.umbrella_version_prefix {
                fixed = fixed.with_version(format!("{prefix}-{}", name.version()));
            }
            Some(fixed)
        } else if name.artifact() == rule.canonical_artifact {
            Some(name.with_classifier(rule.classifier.as_str()))
        } else {
            None
        };

        let out = self.rewrite_hosts(lib);
        match renamed {
            Some(fixed) => self.repoint(&out.with_name(fixed)),
            None => out,
        }
    }
}

/// Checksum and size of one patched logging artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PinnedArtifact {
    pub sha1: String,
    pub size: u64,
}

impl PinnedArtifact {
    fn new(sha1: &str, size: u64) -> Self {
        Self {
            sha1: sha1.to_owned(),
            size,
        }
    }
}

/// A security-patched logging release and the maven root serving it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PatchedRelease {
    pub version: String,
    /// With trailing `/`.
    pub maven: String,
    /// Artifact name -> pinned download.
    pub artifacts: BTreeMap<String, PinnedArtifact>,
}

/// Replacement of the logging libraries base-platform releases declare.
///
/// Versions starting with `legacy_prefix` move to `legacy`; every other
/// version up to `current.version` moves to `current`. Newer versions are
/// left alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingPatch {
    pub legacy_prefix: String,
    pub legacy: PatchedRelease,
    pub current: PatchedRelease,
}

impl Default for LoggingPatch {
    fn default() -> Self {
        Self {
            legacy_prefix: "2.0-beta9".to_owned(),
            legacy: PatchedRelease {
                version: "2.0-beta9-fixed".to_owned(),
                maven: "https://files.prismlauncher.org/maven/".to_owned(),
                artifacts: BTreeMap::from([
                    (
                        "log4j-api".to_owned(),
                        PinnedArtifact::new("b61eaf2e64d8b0277e188262a8b771bbfa1502b3", 107_347),
                    ),
                    (
                        "log4j-core".to_owned(),
                        PinnedArtifact::new("677991ea2d7426f76309a73739cecf609679492c", 677_588),
                    ),
                ]),
            },
            current: PatchedRelease {
                version: "2.17.1".to_owned(),
                maven: "https://repo1.maven.org/maven2/".to_owned(),
                artifacts: BTreeMap::from([
                    (
                        "log4j-api".to_owned(),
                        PinnedArtifact::new("d771af8e336e372fb5399c99edabe0919aeaf5b2", 301_872),
                    ),
                    (
                        "log4j-core".to_owned(),
                        PinnedArtifact::new("779f60f3844dadc3ef597976fcb1e5127b1f343d", 1_790_452),
                    ),
                    (
                        "log4j-slf4j18-impl".to_owned(),
                        PinnedArtifact::new("ca499d751f4ddd8afb016ef698c30be0da1d09f7", 21_268),
                    ),
                ]),
            },
        }
    }
}

impl LoggingPatch {
    fn target(&self, version: &str) -> Option<&PatchedRelease> {
        if version.starts_with(self.legacy_prefix.as_str()) {
            Some(&self.legacy)
        } else if compare_relaxed(version, &self.current.version) == Ordering::Greater {
            None
        } else {
            Some(&self.current)
        }
    }

    /// Patched replacement for a logging-family library.
    ///
    /// Libraries outside the family, and versions newer than the current
    /// patch, come back unchanged. A library the patch has no pinned download
    /// for is a format error: shipping it unpatched is not an option.
    pub fn apply(&self, lib: &LibraryRecord) -> Result<LibraryRecord, ReconcileError> {
        if !lib.name.is_logging_family() {
            return Ok(lib.clone());
        }
        let Some(release) = self.target(lib.name.version()) else {
            return Ok(lib.clone());
        };
        let pinned = release.artifacts.get(lib.name.artifact()).ok_or_else(|| {
            ReconcileError::Format(format!(
                "no patched {} {} to replace {}",
                lib.name.artifact(),
                release.version,
                lib.name
            ))
        })?;
        let name = lib.name.with_version(release.version.as_str());
        debug!("replacing {} with {name}", lib.name);
        Ok(LibraryRecord::new(name.clone()).with_artifact(DownloadArtifact {
            url: format!("{}{}", release.maven, name.path()),
            sha1: pinned.sha1.clone(),
            size: pinned.size,
            path: Some(name.path()),
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Windowing or logging family: always supplied by the base platform.
    ExcludedFamily,
    /// The base platform already ships this library at an equal or newer version.
    Superseded { baseline: ArtifactCoordinate },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Keep(LibraryRecord),
    Drop(DropReason),
}

/// Decide what happens to one library an add-on declares.
///
/// Pure: the same inputs always yield the same `Action`.
pub fn filter_and_rewrite(
    baseline: &BTreeSet<ArtifactCoordinate>,
    candidate: &LibraryRecord,
    rewrites: &RewriteTable,
) -> Action {
    let name = &candidate.name;
    if name.is_windowing_family() || name.is_logging_family() {
        return Action::Drop(DropReason::ExcludedFamily);
    }

    if let Some(existing) = baseline.iter().find(|b| b.same_library(name)) {
        if RelaxedVersion::parse(existing.version()).is_none()
            || RelaxedVersion::parse(name.version()).is_none()
        {
            warn!(
                "unparsable version while comparing {name} against {existing}; treating it as lowest"
            );
        }
        if compare_relaxed(existing.version(), name.version()) != Ordering::Less {
            return Action::Drop(DropReason::Superseded {
                baseline: existing.clone(),
            });
        }
        debug!("{name} upgrades base platform's {existing}");
    }

    Action::Keep(rewrites.rewrite(candidate))
}

/// Library coordinates of every base-platform release that has a canonical record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaselineIndex {
    releases: BTreeMap<String, BTreeSet<ArtifactCoordinate>>,
}

impl BaselineIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the base-platform records among `records`; other packages are ignored.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a VersionRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            index.insert_record(record);
        }
        index
    }

    pub fn insert_record(&mut self, record: &VersionRecord) {
        if record.package_id != BASE_PACKAGE {
            return;
        }
        self.insert(
            record.version.clone(),
            record.libraries.iter().map(|l| l.name.clone()).collect(),
        );
    }

    pub fn insert(&mut self, version: String, libraries: BTreeSet<ArtifactCoordinate>) {
        self.releases.insert(version, libraries);
    }

    pub fn get(&self, version: &str) -> Option<&BTreeSet<ArtifactCoordinate>> {
        self.releases.get(version)
    }

    pub fn contains(&self, version: &str) -> bool {
        self.releases.contains_key(version)
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}
