use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// File extension assumed when a coordinate does not carry `@extension`.
pub const DEFAULT_EXTENSION: &str = "jar";

const WINDOWING_GROUPS: &[&str] = &[
    "org.lwjgl",
    "org.lwjgl.lwjgl",
    "net.java.jinput",
    "net.java.jutils",
];
const LOGGING_GROUP: &str = "org.apache.logging.log4j";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("invalid coordinate '{0}': expected group:artifact:version[:classifier][@extension]")]
    TooFewSegments(String),
    #[error("invalid coordinate '{0}': more than four ':'-separated segments")]
    TooManySegments(String),
    #[error("invalid coordinate '{0}': empty segment")]
    EmptySegment(String),
}

/// Maven-style identifier of a reusable library.
///
/// Immutable: every `with_*` method returns a new value. Equality, hashing and
/// ordering are defined over the canonical string form
/// `group:artifact:version[:classifier][@extension]`, where `@extension` is only
/// rendered when it differs from [`DEFAULT_EXTENSION`].
#[derive(Debug, Clone)]
pub struct ArtifactCoordinate {
    group: String,
    artifact: String,
    version: String,
    classifier: Option<String>,
    extension: String,
}

impl ArtifactCoordinate {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
            classifier: None,
            extension: DEFAULT_EXTENSION.to_owned(),
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoordinateError> {
        let (body, extension) = match s.split_once('@') {
            Some((body, ext)) => (body, ext),
            None => (s, DEFAULT_EXTENSION),
        };

        let segments: Vec<&str> = body.split(':').collect();
        if segments.len() < 3 {
            return Err(CoordinateError::TooFewSegments(s.to_owned()));
        }
        if segments.len() > 4 {
            return Err(CoordinateError::TooManySegments(s.to_owned()));
        }
        if segments.iter().any(|seg| seg.is_empty()) || extension.is_empty() {
            return Err(CoordinateError::EmptySegment(s.to_owned()));
        }

        Ok(Self {
            group: segments[0].to_owned(),
            artifact: segments[1].to_owned(),
            version: segments[2].to_owned(),
            classifier: segments.get(3).map(|c| (*c).to_owned()),
            extension: extension.to_owned(),
        })
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    #[must_use]
    pub fn with_classifier(&self, classifier: impl Into<String>) -> Self {
        Self {
            classifier: Some(classifier.into()),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_extension(&self, extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_artifact(&self, artifact: impl Into<String>) -> Self {
        Self {
            artifact: artifact.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..self.clone()
        }
    }

    /// Two coordinates name the same library when group, artifact and
    /// classifier match. The version is deliberately ignored.
    pub fn same_library(&self, other: &Self) -> bool {
        self.group == other.group
            && self.artifact == other.artifact
            && self.classifier == other.classifier
    }

    /// File name inside the maven repository directory.
    pub fn filename(&self) -> String {
        match &self.classifier {
            Some(c) => format!(
                "{}-{}-{}.{}",
                self.artifact, self.version, c, self.extension
            ),
            None => format!("{}-{}.{}", self.artifact, self.version, self.extension),
        }
    }

    /// Relative path inside a maven repository, e.g.
    /// `net/minecraftforge/forge/1.12.2-14.23.5.2860/forge-1.12.2-14.23.5.2860-universal.jar`.
    pub fn path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group.replace('.', "/"),
            self.artifact,
            self.version,
            self.filename()
        )
    }

    /// Windowing/graphics bindings that are supplied by the base platform.
    pub fn is_windowing_family(&self) -> bool {
        WINDOWING_GROUPS.contains(&self.group.as_str())
    }

    /// Logging framework whose versions are mandated by the base platform.
    pub fn is_logging_family(&self) -> bool {
        self.group == LOGGING_GROUP
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)?;
        if let Some(c) = &self.classifier {
            write!(f, ":{c}")?;
        }
        if self.extension != DEFAULT_EXTENSION {
            write!(f, "@{}", self.extension)?;
        }
        Ok(())
    }
}

impl FromStr for ArtifactCoordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for ArtifactCoordinate {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for ArtifactCoordinate {}

impl Hash for ArtifactCoordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl PartialOrd for ArtifactCoordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ArtifactCoordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

impl Serialize for ArtifactCoordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ArtifactCoordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
