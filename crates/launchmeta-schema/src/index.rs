use crate::identity::file_hash;
use crate::types::{ContentHash, PackageId};
use crate::version::{write_canonical, SchemaError, VersionRecord, FORMAT_VERSION};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub version: String,
    pub release_time: DateTime<Utc>,
    pub sha: ContentHash,
}

/// Per-package listing of every written version and the hash of its file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PackageIndex {
    pub format_version: u32,
    pub uid: PackageId,
    pub name: String,
    pub versions: Vec<IndexEntry>,
}

impl PackageIndex {
    pub fn new(uid: PackageId, name: impl Into<String>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            uid,
            name: name.into(),
            versions: Vec::new(),
        }
    }

    /// Record a version, hashing the exact bytes that were persisted.
    ///
    /// Re-adding a version replaces its entry. Entries stay ordered newest
    /// first, ties broken by version string.
    pub fn add(&mut self, record: &VersionRecord, written: &[u8]) {
        self.versions.retain(|e| e.version != record.version);
        self.versions.push(IndexEntry {
            version: record.version.clone(),
            release_time: record.release_time,
            sha: file_hash(written),
        });
        self.versions.sort_by(|a, b| {
            b.release_time
                .cmp(&a.release_time)
                .then_with(|| a.version.cmp(&b.version))
        });
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SchemaError> {
        write_canonical(path, self)
    }
}
