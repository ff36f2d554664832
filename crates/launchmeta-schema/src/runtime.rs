use crate::types::PackageId;
use crate::version::FORMAT_VERSION;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid runtime version '{0}': expected major[.minor[.security]][+build]")]
pub struct RuntimeVersionError(pub String);

/// Numeric runtime version. Ordering is major, minor, security, then build
/// (an absent build sorts below any present one).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
    pub security: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<u32>,
}

impl RuntimeVersion {
    pub fn new(major: u32, minor: u32, security: u32, build: Option<u32>) -> Self {
        Self {
            major,
            minor,
            security,
            build,
        }
    }
}

impl FromStr for RuntimeVersion {
    type Err = RuntimeVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || RuntimeVersionError(s.to_owned());
        let (numbers, build) = match s.trim().split_once('+') {
            Some((n, b)) => (n, Some(b.parse::<u32>().map_err(|_| err())?)),
            None => (s.trim(), None),
        };
        let mut parts = numbers.split('.');
        let major: u32 = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(err)?
            .parse()
            .map_err(|_| err())?;
        let mut next = || -> Result<u32, RuntimeVersionError> {
            match parts.next() {
                Some(p) => p.parse().map_err(|_| err()),
                None => Ok(0),
            }
        };
        let minor = next()?;
        let security = next()?;
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Self::new(major, minor, security, build))
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.security)?;
        if let Some(b) = self.build {
            write!(f, "+{b}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    Jre,
    Jdk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadType {
    Archive,
    Manifest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeChecksum {
    #[serde(rename = "type")]
    pub algorithm: String,
    pub hash: String,
}

/// One vendor build of a runtime, already normalized by the catalog loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeCandidate {
    pub name: String,
    pub vendor: String,
    pub package_type: PackageType,
    #[serde(rename = "runtimeOS")]
    pub os: String,
    pub architecture: String,
    pub version: RuntimeVersion,
    pub release_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_type: Option<DownloadType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<RuntimeChecksum>,
    #[serde(default)]
    pub recommended: bool,
}

impl RuntimeCandidate {
    /// Key of the comparison group this candidate competes in.
    pub fn group_key(&self) -> (String, String, u32) {
        (
            self.os.clone(),
            self.architecture.clone(),
            self.version.major,
        )
    }
}

/// All candidates of one major version, published as one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSet {
    pub format_version: u32,
    pub uid: PackageId,
    pub name: String,
    pub version: String,
    pub runtimes: Vec<RuntimeCandidate>,
}

impl RuntimeSet {
    pub fn new(uid: impl Into<PackageId>, major: u32, runtimes: Vec<RuntimeCandidate>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            uid: uid.into(),
            name: format!("Java {major}"),
            version: format!("java{major}"),
            runtimes,
        }
    }

    pub fn recommended(&self) -> Option<&RuntimeCandidate> {
        self.runtimes.iter().find(|r| r.recommended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_and_partial_versions() {
        assert_eq!(
            "17.0.1+12".parse::<RuntimeVersion>().unwrap(),
            RuntimeVersion::new(17, 0, 1, Some(12))
        );
        assert_eq!(
            "21".parse::<RuntimeVersion>().unwrap(),
            RuntimeVersion::new(21, 0, 0, None)
        );
        assert_eq!(
            "8.0.302".parse::<RuntimeVersion>().unwrap(),
            RuntimeVersion::new(8, 0, 302, None)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<RuntimeVersion>().is_err());
        assert!("17.x".parse::<RuntimeVersion>().is_err());
        assert!("17.0.1.2".parse::<RuntimeVersion>().is_err());
        assert!("17+b".parse::<RuntimeVersion>().is_err());
    }

    #[test]
    fn ordering_is_numeric_then_build() {
        let a: RuntimeVersion = "17.0.5".parse().unwrap();
        let b: RuntimeVersion = "17.0.10".parse().unwrap();
        let c: RuntimeVersion = "17.0.10+7".parse().unwrap();
        assert!(a < b);
        assert!(b < c);
        assert_eq!(c.to_string(), "17.0.10+7");
    }

    #[test]
    fn candidate_json_shape() {
        let json = r#"{
            "name": "java-runtime-gamma",
            "vendor": "mojang",
            "packageType": "jre",
            "runtimeOS": "linux",
            "architecture": "x64",
            "version": {"major": 17, "minor": 0, "security": 8},
            "releaseTime": "2023-01-01T00:00:00Z",
            "downloadType": "manifest"
        }"#;
        let c: RuntimeCandidate = serde_json::from_str(json).unwrap();
        assert!(!c.recommended);
        assert_eq!(c.package_type, PackageType::Jre);
        assert_eq!(c.group_key(), ("linux".to_owned(), "x64".to_owned(), 17));
    }

    #[test]
    fn runtime_set_names_its_major() {
        let set = RuntimeSet::new("net.minecraft.java", 17, Vec::new());
        assert_eq!(set.name, "Java 17");
        assert_eq!(set.version, "java17");
        assert!(set.recommended().is_none());
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("\"formatVersion\":1"));
    }
}
