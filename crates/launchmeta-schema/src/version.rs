use crate::library::{AssetIndex, LibraryRecord};
use crate::types::PackageId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Version of the canonical record layout.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("record I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("record JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A declared relation to another package.
///
/// `equals` is a hard pin, `suggests` is advisory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyEdge {
    pub uid: PackageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggests: Option<String>,
}

impl DependencyEdge {
    pub fn on(uid: impl Into<PackageId>) -> Self {
        Self {
            uid: uid.into(),
            equals: None,
            suggests: None,
        }
    }

    pub fn pinned(uid: impl Into<PackageId>, version: impl Into<String>) -> Self {
        Self {
            equals: Some(version.into()),
            ..Self::on(uid)
        }
    }

    pub fn suggested(uid: impl Into<PackageId>, version: impl Into<String>) -> Self {
        Self {
            suggests: Some(version.into()),
            ..Self::on(uid)
        }
    }
}

/// Collapse duplicate edges to the same target into one.
///
/// The first hard pin for a target wins; a suggestion survives only when no
/// pin exists, and a later suggestion supersedes an earlier one. Targets keep
/// the position of their first declaration.
pub fn normalize_edges(edges: Vec<DependencyEdge>) -> Vec<DependencyEdge> {
    let mut out: Vec<DependencyEdge> = Vec::with_capacity(edges.len());
    for edge in edges {
        match out.iter_mut().find(|e| e.uid == edge.uid) {
            Some(existing) => {
                if existing.equals.is_none() {
                    if edge.equals.is_some() {
                        existing.equals = edge.equals;
                        existing.suggests = None;
                    } else if edge.suggests.is_some() {
                        existing.suggests = edge.suggests;
                    }
                }
            }
            None => {
                let mut edge = edge;
                if edge.equals.is_some() {
                    edge.suggests = None;
                }
                out.push(edge);
            }
        }
    }
    out
}

/// The canonical record emitted once per reconciled upstream release.
///
/// Written once, never patched after emission. Field names follow the
/// launcher metadata format consumed downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub format_version: u32,
    #[serde(rename = "uid")]
    pub package_id: PackageId,
    #[serde(rename = "name")]
    pub display_name: String,
    pub version: String,
    pub release_time: DateTime<Utc>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub release_type: Option<String>,
    pub order: i32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub volatile: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<DependencyEdge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<DependencyEdge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<LibraryRecord>,
    /// Installer-time artifacts, never placed on the runtime classpath.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maven_files: Vec<LibraryRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jar_mods: Vec<LibraryRecord>,
    /// The base platform's own client jar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_jar: Option<LibraryRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_index: Option<AssetIndex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,
    #[serde(
        rename = "minecraftArguments",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub launch_arguments: Option<String>,
    #[serde(rename = "+tweakers", default, skip_serializing_if = "Vec::is_empty")]
    pub tweakers: Vec<String>,
    #[serde(rename = "+traits", default, skip_serializing_if = "BTreeSet::is_empty")]
    pub traits: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<serde_json::Value>,
}

impl VersionRecord {
    /// A record with every optional part empty.
    pub fn stub(
        package_id: impl Into<PackageId>,
        display_name: impl Into<String>,
        version: impl Into<String>,
        release_time: DateTime<Utc>,
        order: i32,
    ) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            package_id: package_id.into(),
            display_name: display_name.into(),
            version: version.into(),
            release_time,
            release_type: None,
            order,
            volatile: false,
            requires: Vec::new(),
            conflicts: Vec::new(),
            libraries: Vec::new(),
            maven_files: Vec::new(),
            jar_mods: Vec::new(),
            main_jar: None,
            asset_index: None,
            main_class: None,
            launch_arguments: None,
            tweakers: Vec::new(),
            traits: BTreeSet::new(),
            logging: None,
        }
    }

    /// Pretty JSON with object keys sorted and a trailing newline.
    ///
    /// Identical records always render to identical bytes.
    pub fn canonical_json(&self) -> Result<String, serde_json::Error> {
        canonical_string(self)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SchemaError> {
        write_atomic(path.as_ref(), self.canonical_json()?.as_bytes())
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

pub(crate) fn canonical_string<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    let mut out = serde_json::to_string_pretty(&value)?;
    out.push('\n');
    Ok(out)
}

/// Write any document in canonical form, atomically.
pub fn write_canonical<T: Serialize + ?Sized>(
    path: impl AsRef<Path>,
    value: &T,
) -> Result<(), SchemaError> {
    write_atomic(path.as_ref(), canonical_string(value)?.as_bytes())
}

pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<(), SchemaError> {
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    std::io::Write::write_all(&mut tmp, content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| SchemaError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::ArtifactCoordinate;
    use chrono::TimeZone;

    fn sample() -> VersionRecord {
        let mut v = VersionRecord::stub(
            "net.minecraftforge",
            "Forge",
            "14.23.5.2860",
            Utc.with_ymd_and_hms(2021, 12, 12, 6, 30, 0).unwrap(),
            5,
        );
        v.requires = vec![DependencyEdge::pinned("net.minecraft", "1.12.2")];
        v.libraries = vec![LibraryRecord::new(
            ArtifactCoordinate::parse("net.minecraftforge:forge:1.12.2-14.23.5.2860:universal")
                .unwrap(),
        )];
        v.tweakers = vec!["net.minecraftforge.fml.common.launcher.FMLTweaker".to_owned()];
        v.traits.insert("legacyFML".to_owned());
        v
    }

    #[test]
    fn canonical_json_sorts_keys_and_omits_empty_parts() {
        let json = sample().canonical_json().unwrap();
        let format_pos = json.find("\"formatVersion\"").unwrap();
        let uid_pos = json.find("\"uid\"").unwrap();
        let libs_pos = json.find("\"libraries\"").unwrap();
        assert!(json.find("\"+traits\"").unwrap() < format_pos);
        assert!(libs_pos < uid_pos);
        assert!(!json.contains("mavenFiles"));
        assert!(!json.contains("volatile"));
        assert!(!json.contains("conflicts"));
        assert!(json.ends_with("}\n"));
    }

    #[test]
    fn canonical_json_is_stable() {
        assert_eq!(
            sample().canonical_json().unwrap(),
            sample().canonical_json().unwrap()
        );
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.minecraftforge").join("14.23.5.2860.json");
        let record = sample();
        record.write_to_file(&path).unwrap();
        let loaded = VersionRecord::read_from_file(&path).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn normalize_edges_prefers_pins() {
        let edges = vec![
            DependencyEdge::suggested("org.lwjgl", "2.9.1"),
            DependencyEdge::pinned("net.minecraft", "1.7.10"),
            DependencyEdge::pinned("org.lwjgl", "2.9.4"),
            DependencyEdge::suggested("org.lwjgl", "2.9.0"),
            DependencyEdge::pinned("net.minecraft", "1.8"),
        ];
        let normalized = normalize_edges(edges);
        assert_eq!(
            normalized,
            vec![
                DependencyEdge::pinned("org.lwjgl", "2.9.4"),
                DependencyEdge::pinned("net.minecraft", "1.7.10"),
            ]
        );
    }

    #[test]
    fn normalize_edges_keeps_latest_suggestion() {
        let normalized = normalize_edges(vec![
            DependencyEdge::suggested("org.lwjgl3", "3.1.6"),
            DependencyEdge::suggested("org.lwjgl3", "3.2.1"),
        ]);
        assert_eq!(
            normalized,
            vec![DependencyEdge::suggested("org.lwjgl3", "3.2.1")]
        );
    }
}
