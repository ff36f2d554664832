//! Installer schema dispatch for add-on releases.
//!
//! Add-on releases were published under four successive installer formats.
//! The format is decided once per release from the documents the loader
//! found, then one strategy turns those documents into a canonical record.

use crate::arguments::{build_system_arguments, extract_tweakers};
use crate::components::{ADDON_NAME, ADDON_ORDER, ADDON_PACKAGE, BASE_PACKAGE, TRAIT_LEGACY_FML};
use crate::config::ReconcileConfig;
use crate::overrides::{filter_and_rewrite, Action, BaselineIndex, RewriteTable};
use crate::ReconcileError;
use chrono::{DateTime, Utc};
use launchmeta_schema::{
    normalize_edges, AddonRelease, ArtifactCoordinate, AvailableDocuments, BaseReleaseDocument,
    DependencyEdge, DownloadArtifact, InstallProfile, InstallProfileV1, InstallProfileV2,
    InstallerInfo, LegacyBuildInfo, LibraryRecord, ReleaseIndexEntry, VersionRecord,
};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    ModernizedInstaller,
    BuildSystemInstaller,
    ProfileInstaller,
    LegacyJarMod,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ModernizedInstaller => "modernized-installer",
            Self::BuildSystemInstaller => "build-system-installer",
            Self::ProfileInstaller => "profile-installer",
            Self::LegacyJarMod => "legacy-jar-mod",
        })
    }
}

/// The one upstream document set a release is reconciled from.
#[derive(Debug, Clone, PartialEq)]
pub enum InstallerDocument {
    Modernized(BaseReleaseDocument),
    BuildSystem {
        profile: InstallProfileV2,
        version: BaseReleaseDocument,
        installer: InstallerInfo,
    },
    Profile(InstallProfileV1),
    LegacyJarMod(LegacyBuildInfo),
}

impl InstallerDocument {
    /// Pick the installer format for a release.
    ///
    /// A second-generation profile always selects the build-system format and
    /// then requires both of its companions. Otherwise a base-format version
    /// document wins over a first-generation profile, and releases without an
    /// installer fall back to the jar-mod format.
    pub fn select(
        entry: &ReleaseIndexEntry,
        documents: AvailableDocuments,
    ) -> Result<Self, ReconcileError> {
        let AvailableDocuments {
            version_document,
            install_profile,
            installer_info,
            legacy_info,
        } = documents;
        let release = || entry.long_version().unwrap_or_else(|| entry.version.clone());

        if let Some(InstallProfile::BuildSystem(profile)) = install_profile {
            let version = version_document.ok_or_else(|| {
                ReconcileError::MissingCompanion(format!(
                    "{}: build-system profile without a version document",
                    release()
                ))
            })?;
            let installer = installer_info.ok_or_else(|| {
                ReconcileError::MissingCompanion(format!(
                    "{}: build-system profile without installer checksums",
                    release()
                ))
            })?;
            return Ok(Self::BuildSystem {
                profile,
                version,
                installer,
            });
        }

        if let Some(doc) = version_document {
            return Ok(Self::Modernized(doc));
        }
        if let Some(InstallProfile::Legacy(profile)) = install_profile {
            return Ok(Self::Profile(profile));
        }
        if !entry.uses_installer() {
            return legacy_info.map(Self::LegacyJarMod).ok_or_else(|| {
                ReconcileError::MissingCompanion(format!(
                    "{}: pre-installer release without build info",
                    release()
                ))
            });
        }
        Err(ReconcileError::UnsupportedSchema(format!(
            "{}: installer present but no usable profile",
            release()
        )))
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Self::Modernized(_) => Strategy::ModernizedInstaller,
            Self::BuildSystem { .. } => Strategy::BuildSystemInstaller,
            Self::Profile(_) => Strategy::ProfileInstaller,
            Self::LegacyJarMod(_) => Strategy::LegacyJarMod,
        }
    }
}

fn has_numeric_head(version: &str) -> bool {
    version
        .split('.')
        .next()
        .is_some_and(|head| !head.is_empty() && head.bytes().all(|b| b.is_ascii_digit()))
}

fn is_addon_artifact(name: &ArtifactCoordinate) -> bool {
    name.group() == ADDON_PACKAGE && name.artifact() == "forge"
}

/// Reconciles add-on releases against the base-platform records produced so far.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    config: &'a ReconcileConfig,
    baselines: &'a BaselineIndex,
}

/// Release facts every strategy needs, validated up front.
struct Validated<'e> {
    entry: &'e ReleaseIndexEntry,
    raw_base: String,
    base: String,
    baseline: BTreeSet<ArtifactCoordinate>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(config: &'a ReconcileConfig, baselines: &'a BaselineIndex) -> Self {
        Self { config, baselines }
    }

    pub fn reconcile(&self, release: AddonRelease) -> Result<VersionRecord, ReconcileError> {
        let AddonRelease { entry, documents } = release;
        let checked = self.validate(&entry)?;
        let document = InstallerDocument::select(&entry, documents)?;
        info!("{}: {}", entry.version, document.strategy());

        match document {
            InstallerDocument::Modernized(doc) => Ok(self.modernized(&checked, &doc)),
            InstallerDocument::BuildSystem {
                profile,
                version,
                installer,
            } => Ok(self.build_system(&checked, &profile, &version, &installer)),
            InstallerDocument::Profile(profile) => Ok(self.profile(&checked, &profile)),
            InstallerDocument::LegacyJarMod(info) => self.legacy_jar_mod(&checked, &info),
        }
    }

    fn validate<'e>(&self, entry: &'e ReleaseIndexEntry) -> Result<Validated<'e>, ReconcileError> {
        let (Some(raw_base), Some(base), Some(long)) = (
            entry.mc_version.clone(),
            entry.sane_base_version(),
            entry.long_version(),
        ) else {
            return Err(ReconcileError::Format(format!(
                "{}: no base platform version",
                entry.version
            )));
        };
        if self.config.is_denylisted(&long) {
            return Err(ReconcileError::Denylisted(long));
        }
        if entry
            .download_url(&self.config.rewrites.canonical_maven)
            .is_none()
        {
            return Err(ReconcileError::Format(format!(
                "{long}: no downloadable artifact"
            )));
        }
        if !has_numeric_head(&entry.version) {
            return Err(ReconcileError::Format(format!(
                "{long}: version does not start with a number"
            )));
        }
        let baseline = self
            .baselines
            .get(&base)
            .ok_or_else(|| ReconcileError::MissingDependency(base.clone()))?
            .clone();
        Ok(Validated {
            entry,
            raw_base,
            base,
            baseline,
        })
    }

    fn record(checked: &Validated<'_>, release_time: DateTime<Utc>) -> VersionRecord {
        let mut record = VersionRecord::stub(
            ADDON_PACKAGE,
            ADDON_NAME,
            &checked.entry.version,
            release_time,
            ADDON_ORDER,
        );
        record.requires = normalize_edges(vec![DependencyEdge::pinned(
            BASE_PACKAGE,
            checked.base.as_str(),
        )]);
        record
    }

    fn filter_libraries(
        checked: &Validated<'_>,
        libraries: &[LibraryRecord],
        rewrites: &RewriteTable,
    ) -> Vec<LibraryRecord> {
        libraries
            .iter()
            .filter_map(|lib| match filter_and_rewrite(&checked.baseline, lib, rewrites) {
                Action::Keep(kept) => Some(kept),
                Action::Drop(reason) => {
                    debug!("{}: dropping {} ({reason:?})", checked.entry.version, lib.name);
                    None
                }
            })
            .collect()
    }

    fn modernized(&self, checked: &Validated<'_>, doc: &BaseReleaseDocument) -> VersionRecord {
        let rewrites = self.config.rewrites.pinned_to_base(&checked.raw_base);
        let mut record = Self::record(checked, doc.release_time);
        record.main_class.clone_from(&doc.main_class);
        if let Some(args) = &doc.minecraft_arguments {
            record.tweakers = extract_tweakers(args).0;
        }
        record.libraries = Self::filter_libraries(checked, &doc.libraries, &rewrites);
        record
    }

    fn build_system(
        &self,
        checked: &Validated<'_>,
        profile: &InstallProfileV2,
        version: &BaseReleaseDocument,
        installer: &InstallerInfo,
    ) -> VersionRecord {
        let rewrites = &self.config.rewrites;
        let long = checked
            .entry
            .long_version()
            .unwrap_or_else(|| checked.entry.version.clone());
        let installer_name = ArtifactCoordinate::new(ADDON_PACKAGE, "forge", long)
            .with_classifier("installer");
        let installer_lib =
            LibraryRecord::new(installer_name.clone()).with_artifact(DownloadArtifact {
                url: rewrites.canonical_url(&installer_name),
                sha1: installer.sha1.clone(),
                size: installer.size,
                path: None,
            });

        let mut maven_files = vec![installer_lib];
        for lib in profile.libraries.iter().filter(|l| !l.name.is_logging_family()) {
            let lib = if is_addon_artifact(&lib.name) && lib.name.classifier() == Some("universal")
            {
                rewrites.repoint(lib)
            } else {
                lib.clone()
            };
            maven_files.push(rewrites.rewrite_hosts(&lib));
        }

        let mut libraries = vec![self.config.wrapper.library()];
        for lib in version.libraries.iter().filter(|l| !l.name.is_logging_family()) {
            let lib = if is_addon_artifact(&lib.name) {
                rewrites.repoint(&lib.with_name(lib.name.with_classifier("launcher")))
            } else {
                lib.clone()
            };
            libraries.push(rewrites.rewrite_hosts(&lib));
        }

        let mut record = Self::record(checked, version.release_time);
        record.main_class = Some(self.config.wrapper.main_class.clone());
        record.maven_files = maven_files;
        record.libraries = libraries;
        record.launch_arguments = Some(build_system_arguments(
            version.plain_game_arguments(),
            &checked.entry.version,
            &checked.raw_base,
        ));
        record
    }

    fn profile(&self, checked: &Validated<'_>, profile: &InstallProfileV1) -> VersionRecord {
        let rewrites = self.config.rewrites.pinned_to_base(&checked.raw_base);
        let info = &profile.version_info;
        let mut record = Self::record(checked, info.time);
        record.main_class = Some(info.main_class.clone());
        record.tweakers = extract_tweakers(&info.minecraft_arguments).0;
        record.libraries = Self::filter_libraries(checked, &info.libraries, &rewrites);
        record
    }

    fn legacy_jar_mod(
        &self,
        checked: &Validated<'_>,
        info: &LegacyBuildInfo,
    ) -> Result<VersionRecord, ReconcileError> {
        let entry = checked.entry;
        let maven = &self.config.rewrites.canonical_maven;
        let (Some(name), Some(url)) = (entry.download_coordinate(), entry.download_url(maven))
        else {
            return Err(ReconcileError::Format(format!(
                "{}: no monolithic artifact",
                entry.version
            )));
        };

        let mut record = Self::record(checked, info.release_time);
        record.jar_mods = vec![LibraryRecord::new(name).with_artifact(DownloadArtifact {
            url,
            sha1: info.sha1.clone(),
            size: info.size,
            path: None,
        })];
        if self.config.needs_legacy_libraries(&checked.base) {
            record.traits.insert(TRAIT_LEGACY_FML.to_owned());
        }
        Ok(record)
    }
}
