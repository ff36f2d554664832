//! Value types, upstream document shapes, and canonical records for launchmeta.
//!
//! This crate defines the schema layer: maven-style artifact coordinates
//! (`ArtifactCoordinate`), library declarations (`LibraryRecord`), the canonical
//! version record every reconciliation strategy emits (`VersionRecord`), runtime
//! catalog candidates (`RuntimeCandidate`), the already-parsed upstream documents
//! the core consumes, and deterministic content hashing / sorted-key persistence.

pub mod coordinate;
pub mod identity;
pub mod index;
pub mod library;
pub mod runtime;
pub mod types;
pub mod upstream;
pub mod version;

pub use coordinate::{ArtifactCoordinate, CoordinateError, DEFAULT_EXTENSION};
pub use identity::{content_hash, file_hash};
pub use index::{IndexEntry, PackageIndex};
pub use library::{
    AssetIndex, DownloadArtifact, ExtractRules, LibraryDownloads, LibraryRecord, OsConstraint,
    PlatformRule, RuleAction,
};
pub use runtime::{
    DownloadType, PackageType, RuntimeCandidate, RuntimeChecksum, RuntimeSet, RuntimeVersion,
    RuntimeVersionError,
};
pub use types::{ContentHash, PackageId};
pub use upstream::{
    AddonRelease, ArgumentsBlock, AvailableDocuments, BaseReleaseDocument, GameArgument,
    InstallProfile, InstallProfileV1, InstallProfileV2, InstallSection, InstallerInfo,
    LegacyBuildInfo, ProfileVersionInfo, ReleaseDownloads, ReleaseFile, ReleaseIndexEntry,
};
pub use version::{
    normalize_edges, write_canonical, DependencyEdge, SchemaError, VersionRecord, FORMAT_VERSION,
};
