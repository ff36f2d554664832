//! Windowing-library variant bucketing.
//!
//! Base-platform releases declare their windowing bindings inline, often
//! several times with different platform rules. These are factored out into
//! separately versioned variant records: every distinct rule list forms a
//! bucket, buckets are fingerprinted by content, and each fingerprint is
//! classified against a reviewed allow/deny policy before anything is
//! emitted.

use crate::arguments::adapt_game_arguments;
use crate::components::{
    BASE_NAME, BASE_ORDER, BASE_PACKAGE, CLIENT_JAR_ARTIFACT, CLIENT_JAR_GROUP,
    TRAIT_FIRST_THREAD_MACOS, WINDOWING_GEN2_PACKAGE, WINDOWING_GEN3_PACKAGE, WINDOWING_ORDER,
};
use crate::config::ReconcileConfig;
use crate::pipeline::{BatchReport, Diagnostic};
use crate::ReconcileError;
use chrono::{DateTime, Utc};
use launchmeta_schema::{
    content_hash, normalize_edges, ArtifactCoordinate, BaseReleaseDocument, ContentHash,
    DependencyEdge, LibraryRecord, VersionRecord,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info};

/// Known set of bucket versions within one release, with the version to suggest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ForcedSuggestion {
    pub versions: BTreeSet<String>,
    pub suggest: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct VariantPolicy {
    pub accepted: BTreeSet<ContentHash>,
    pub rejected: BTreeSet<ContentHash>,
    pub forced_suggestions: Vec<ForcedSuggestion>,
}

impl Default for VariantPolicy {
    fn default() -> Self {
        Self {
            accepted: BTreeSet::new(),
            rejected: BTreeSet::new(),
            forced_suggestions: vec![ForcedSuggestion {
                versions: BTreeSet::from(["3.1.6".to_owned(), "3.2.1".to_owned()]),
                suggest: "3.2.1".to_owned(),
            }],
        }
    }
}

impl VariantPolicy {
    /// A hash listed as rejected stays rejected even if also accepted.
    pub fn classify(&self, hash: &ContentHash) -> VariantClass {
        if self.rejected.contains(hash) {
            VariantClass::Rejected
        } else if self.accepted.contains(hash) {
            VariantClass::Accepted
        } else {
            VariantClass::Unknown
        }
    }

    pub fn forced_suggestion(&self, versions: &BTreeSet<String>) -> Option<&str> {
        self.forced_suggestions
            .iter()
            .find(|f| &f.versions == versions)
            .map(|f| f.suggest.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantClass {
    Accepted,
    Rejected,
    Unknown,
}

impl fmt::Display for VariantClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        })
    }
}

/// Windowing libraries sharing one platform rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantBucket {
    /// Hash of the rule list the libraries were declared with; `None` for
    /// unconditional libraries.
    pub rules_key: Option<ContentHash>,
    pub version: String,
    /// Sorted by coordinate, rules stripped.
    pub libraries: Vec<LibraryRecord>,
    pub release_time: DateTime<Utc>,
}

#[derive(Serialize)]
struct BucketContent<'a> {
    version: &'a str,
    libraries: &'a [LibraryRecord],
}

impl VariantBucket {
    /// Fingerprint over version and libraries. The release time is excluded so
    /// the same bucket seen in many releases hashes the same.
    pub fn content_hash(&self) -> Result<ContentHash, serde_json::Error> {
        content_hash(&BucketContent {
            version: &self.version,
            libraries: &self.libraries,
        })
    }

    /// True when the bucket carries third-generation bindings.
    pub fn is_gen3(&self) -> bool {
        self.libraries.iter().any(is_gen3_core)
    }
}

fn is_gen3_core(lib: &LibraryRecord) -> bool {
    lib.name.group() == "org.lwjgl" && lib.name.artifact() == "lwjgl"
}

fn is_core_binding(lib: &LibraryRecord) -> bool {
    is_gen3_core(lib) || (lib.name.group() == "org.lwjgl.lwjgl" && lib.name.artifact() == "lwjgl")
}

fn is_input_binding(lib: &LibraryRecord) -> bool {
    matches!(lib.name.group(), "net.java.jinput" | "net.java.jutils")
}

/// Split a release's libraries into base libraries and windowing buckets.
fn partition(
    doc: &BaseReleaseDocument,
) -> Result<(Vec<LibraryRecord>, Vec<VariantBucket>), ReconcileError> {
    let mut base = Vec::new();
    let mut grouped: BTreeMap<Option<ContentHash>, Vec<LibraryRecord>> = BTreeMap::new();

    for lib in &doc.libraries {
        if !lib.name.is_windowing_family() {
            base.push(lib.clone());
            continue;
        }
        if lib.is_macos_only() {
            debug!("{}: ignoring macOS-only {}", doc.id, lib.name);
            continue;
        }
        let key = match &lib.rules {
            Some(rules) if !rules.is_empty() => Some(content_hash(rules)?),
            _ => None,
        };
        grouped.entry(key).or_default().push(lib.without_rules());
    }

    // Unconditional libraries belong to every ruled bucket.
    if grouped.len() > 1 {
        if let Some(common) = grouped.remove(&None) {
            for libs in grouped.values_mut() {
                libs.extend(common.iter().cloned());
            }
        }
    }

    let mut buckets = Vec::with_capacity(grouped.len());
    for (rules_key, mut libraries) in grouped {
        libraries.sort_by(|a, b| a.name.cmp(&b.name));
        libraries.dedup_by(|a, b| a.name == b.name);

        let versions: BTreeSet<&str> = libraries
            .iter()
            .filter(|l| is_core_binding(l))
            .map(|l| l.name.version())
            .collect();
        let version = match versions.len() {
            1 => versions.into_iter().next().unwrap_or_default().to_owned(),
            0 => {
                return Err(ReconcileError::Format(format!(
                    "{}: windowing bucket without a core binding",
                    doc.id
                )))
            }
            _ => {
                return Err(ReconcileError::Format(format!(
                    "{}: windowing bucket with conflicting core versions {versions:?}",
                    doc.id
                )))
            }
        };

        buckets.push(VariantBucket {
            rules_key,
            version,
            libraries,
            release_time: doc.release_time,
        });
    }
    Ok((base, buckets))
}

/// The canonical base record for one release plus the buckets factored out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseReconciliation {
    pub record: VersionRecord,
    pub buckets: Vec<VariantBucket>,
}

/// Reconcile one base-platform release document.
///
/// Logging libraries are swapped for their patched releases before the record
/// is built; a logging library without a patched download fails the release.
pub fn reconcile_base_release(
    doc: &BaseReleaseDocument,
    config: &ReconcileConfig,
) -> Result<BaseReconciliation, ReconcileError> {
    let (libraries, buckets) = partition(doc)?;
    let libraries = libraries
        .iter()
        .map(|lib| config.logging_patch.apply(lib))
        .collect::<Result<Vec<_>, _>>()?;

    let mut record = VersionRecord::stub(
        BASE_PACKAGE,
        BASE_NAME,
        &doc.id,
        doc.release_time,
        BASE_ORDER,
    );
    record.release_type.clone_from(&doc.release_type);
    record.main_class.clone_from(&doc.main_class);
    record.logging.clone_from(&doc.logging);
    record.asset_index.clone_from(&doc.asset_index);
    record.main_jar = doc
        .downloads
        .as_ref()
        .and_then(|d| d.client.clone())
        .map(|client| {
            let name = ArtifactCoordinate::new(CLIENT_JAR_GROUP, CLIENT_JAR_ARTIFACT, &doc.id)
                .with_classifier("client");
            LibraryRecord::new(name).with_artifact(client)
        });
    record.libraries = libraries;
    record.launch_arguments = doc
        .minecraft_arguments
        .clone()
        .or_else(|| adapt_game_arguments(doc.plain_game_arguments()));

    let gen3 = buckets.iter().any(VariantBucket::is_gen3);
    let package = if gen3 {
        WINDOWING_GEN3_PACKAGE
    } else {
        WINDOWING_GEN2_PACKAGE
    };
    let versions: BTreeSet<String> = buckets.iter().map(|b| b.version.clone()).collect();
    let suggestion = match versions.len() {
        0 => None,
        1 => versions.iter().next().cloned(),
        _ => match config.variants.forced_suggestion(&versions) {
            Some(forced) => Some(forced.to_owned()),
            None => {
                return Err(ReconcileError::AmbiguousVariant {
                    version: doc.id.clone(),
                    detail: format!("buckets disagree on version: {versions:?}"),
                })
            }
        },
    };
    if let Some(version) = suggestion {
        record.requires = normalize_edges(vec![DependencyEdge::suggested(package, version)]);
    }
    if gen3 {
        record.traits.insert(TRAIT_FIRST_THREAD_MACOS.to_owned());
    }

    Ok(BaseReconciliation { record, buckets })
}

/// Collects buckets across a whole base-platform history, keyed by
/// representative version and content hash.
#[derive(Debug, Clone, Default)]
pub struct VariantAccumulator {
    variants: BTreeMap<String, BTreeMap<ContentHash, VariantBucket>>,
}

impl VariantAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bucket. A bucket already seen keeps the earliest release time.
    pub fn add(&mut self, bucket: VariantBucket) -> Result<ContentHash, ReconcileError> {
        let hash = bucket.content_hash()?;
        let by_hash = self.variants.entry(bucket.version.clone()).or_default();
        match by_hash.get_mut(&hash) {
            Some(existing) => {
                existing.release_time = existing.release_time.min(bucket.release_time);
            }
            None => {
                info!("new windowing variant {} ({})", bucket.version, hash.short());
                by_hash.insert(hash.clone(), bucket);
            }
        }
        Ok(hash)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ContentHash, &VariantBucket)> {
        self.variants.values().flat_map(|m| m.iter())
    }

    pub fn len(&self) -> usize {
        self.variants.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Emit one record per representative version whose classification is
    /// unambiguous.
    ///
    /// Every other version yields a diagnostic, including one whose variants
    /// were all rejected: base records still suggest it.
    pub fn finalize(&self, policy: &VariantPolicy) -> BatchReport {
        let mut report = BatchReport::default();
        for (version, by_hash) in &self.variants {
            let mut accepted = Vec::new();
            let mut unknown = Vec::new();
            for (hash, bucket) in by_hash {
                match policy.classify(hash) {
                    VariantClass::Accepted => accepted.push(bucket),
                    VariantClass::Unknown => unknown.push(hash.short()),
                    VariantClass::Rejected => {}
                }
            }

            match (accepted.as_slice(), unknown.is_empty()) {
                ([bucket], true) => match variant_record(bucket) {
                    Ok(record) => report.records.push(record),
                    Err(error) => report.diagnostics.push(Diagnostic::new(version, error)),
                },
                _ => report.diagnostics.push(Diagnostic::new(
                    version,
                    ReconcileError::AmbiguousVariant {
                        version: version.clone(),
                        detail: format!(
                            "{} of {} variants accepted, unclassified: [{}]",
                            accepted.len(),
                            by_hash.len(),
                            unknown.join(", ")
                        ),
                    },
                )),
            }
        }
        report
    }
}

const REQUIRED_NATIVE_OS: [&str; 3] = ["linux", "windows", "osx"];

fn validate_natives(version: &str, lib: &LibraryRecord) -> Result<(), ReconcileError> {
    let Some(natives) = lib.natives.as_ref().filter(|n| !n.is_empty()) else {
        return Ok(());
    };
    let malformed = |detail: String| ReconcileError::MalformedVariant {
        version: version.to_owned(),
        detail,
    };
    for os in REQUIRED_NATIVE_OS {
        let classifier = natives
            .get(os)
            .ok_or_else(|| malformed(format!("{} has no {os} natives", lib.name)))?;
        if lib.downloads.is_some()
            && lib.classifier_download(classifier).is_none()
            && lib
                .classifier_download(&classifier.replace("${arch}", "64"))
                .is_none()
        {
            return Err(malformed(format!(
                "{} has no download for {classifier}",
                lib.name
            )));
        }
    }
    Ok(())
}

fn variant_record(bucket: &VariantBucket) -> Result<VersionRecord, ReconcileError> {
    let (package, name, conflict) = match bucket.version.chars().next() {
        Some('2') => (WINDOWING_GEN2_PACKAGE, "LWJGL 2", WINDOWING_GEN3_PACKAGE),
        Some('3') => (WINDOWING_GEN3_PACKAGE, "LWJGL 3", WINDOWING_GEN2_PACKAGE),
        _ => {
            return Err(ReconcileError::Format(format!(
                "unknown windowing generation for version '{}'",
                bucket.version
            )))
        }
    };

    let libraries: Vec<LibraryRecord> = bucket
        .libraries
        .iter()
        .filter(|l| package == WINDOWING_GEN2_PACKAGE || !is_input_binding(l))
        .cloned()
        .collect();
    for lib in &libraries {
        validate_natives(&bucket.version, lib)?;
    }

    let mut record = VersionRecord::stub(
        package,
        name,
        &bucket.version,
        bucket.release_time,
        WINDOWING_ORDER,
    );
    record.volatile = true;
    record.release_type = Some("release".to_owned());
    record.conflicts = vec![DependencyEdge::on(conflict)];
    record.libraries = libraries;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use launchmeta_schema::{
        AssetIndex, DownloadArtifact, LibraryDownloads, PlatformRule, ReleaseDownloads, RuleAction,
    };

    fn lib(s: &str) -> LibraryRecord {
        LibraryRecord::new(ArtifactCoordinate::parse(s).unwrap())
    }

    fn ruled(s: &str, rules: Vec<PlatformRule>) -> LibraryRecord {
        let mut l = lib(s);
        l.rules = Some(rules);
        l
    }

    fn not_osx() -> Vec<PlatformRule> {
        vec![
            PlatformRule::allow(),
            PlatformRule::for_os(RuleAction::Disallow, "osx"),
        ]
    }

    fn doc(id: &str, day: u32, libraries: Vec<LibraryRecord>) -> BaseReleaseDocument {
        BaseReleaseDocument {
            id: id.to_owned(),
            release_type: Some("release".to_owned()),
            release_time: Utc.with_ymd_and_hms(2014, 6, day, 0, 0, 0).unwrap(),
            main_class: Some("net.minecraft.client.main.Main".to_owned()),
            minecraft_arguments: Some("--username ${auth_player_name}".to_owned()),
            arguments: None,
            libraries,
            logging: None,
            downloads: None,
            asset_index: None,
        }
    }

    fn gen2_libs() -> Vec<LibraryRecord> {
        vec![
            lib("com.google.guava:guava:15.0"),
            ruled("org.lwjgl.lwjgl:lwjgl:2.9.1", not_osx()),
            ruled("org.lwjgl.lwjgl:lwjgl_util:2.9.1", not_osx()),
            lib("net.java.jinput:jinput:2.0.5"),
        ]
    }

    fn native(s: &str) -> LibraryRecord {
        let mut l = lib(s);
        l.natives = Some(
            REQUIRED_NATIVE_OS
                .iter()
                .map(|os| ((*os).to_owned(), format!("natives-{os}")))
                .collect(),
        );
        l
    }

    #[test]
    fn base_release_factors_out_windowing() {
        let result =
            reconcile_base_release(&doc("1.7.10", 26, gen2_libs()), &ReconcileConfig::default())
                .unwrap();
        assert_eq!(result.record.libraries, vec![lib("com.google.guava:guava:15.0")]);
        assert_eq!(
            result.record.requires,
            vec![DependencyEdge::suggested("org.lwjgl", "2.9.1")]
        );
        assert!(result.record.traits.is_empty());

        assert_eq!(result.buckets.len(), 1);
        let bucket = &result.buckets[0];
        assert!(bucket.rules_key.is_some());
        assert_eq!(bucket.libraries.len(), 3);
        assert!(bucket.libraries.iter().all(|l| l.rules.is_none()));
        assert!(bucket
            .libraries
            .iter()
            .any(|l| l.name.to_string() == "net.java.jinput:jinput:2.0.5"));
    }

    #[test]
    fn no_windowing_means_no_edge() {
        let result = reconcile_base_release(
            &doc("rd-132211", 1, vec![lib("com.google.guava:guava:15.0")]),
            &ReconcileConfig::default(),
        )
        .unwrap();
        assert!(result.buckets.is_empty());
        assert!(result.record.requires.is_empty());
    }

    #[test]
    fn gen3_sets_first_thread_trait() {
        let result = reconcile_base_release(
            &doc(
                "1.13",
                18,
                vec![
                    lib("org.lwjgl:lwjgl:3.1.6"),
                    lib("org.lwjgl:lwjgl-glfw:3.1.6"),
                    ruled(
                        "org.lwjgl:lwjgl:3.1.2",
                        vec![PlatformRule::for_os(RuleAction::Allow, "osx")],
                    ),
                ],
            ),
            &ReconcileConfig::default(),
        )
        .unwrap();
        assert!(result.record.traits.contains(TRAIT_FIRST_THREAD_MACOS));
        assert_eq!(
            result.record.requires,
            vec![DependencyEdge::suggested("org.lwjgl3", "3.1.6")]
        );
        assert_eq!(result.buckets.len(), 1);
        assert!(result.buckets[0].rules_key.is_none());
    }

    #[test]
    fn known_combination_forces_suggestion() {
        let libs = vec![
            ruled("org.lwjgl:lwjgl:3.1.6", not_osx()),
            ruled(
                "org.lwjgl:lwjgl:3.2.1",
                vec![
                    PlatformRule::allow(),
                    PlatformRule::for_os(RuleAction::Disallow, "linux"),
                ],
            ),
        ];
        let result =
            reconcile_base_release(&doc("1.14", 23, libs.clone()), &ReconcileConfig::default())
                .unwrap();
        assert_eq!(
            result.record.requires,
            vec![DependencyEdge::suggested("org.lwjgl3", "3.2.1")]
        );

        let mut strict = ReconcileConfig::default();
        strict.variants.forced_suggestions.clear();
        assert!(matches!(
            reconcile_base_release(&doc("1.14", 23, libs), &strict),
            Err(ReconcileError::AmbiguousVariant { .. })
        ));
    }

    #[test]
    fn unconditional_libraries_join_every_ruled_bucket() {
        let libs = vec![
            ruled("org.lwjgl:lwjgl:3.2.2", not_osx()),
            ruled(
                "org.lwjgl:lwjgl:3.2.2",
                vec![PlatformRule::for_os(RuleAction::Allow, "linux")],
            ),
            lib("org.lwjgl:lwjgl-glfw:3.2.2"),
        ];
        let result =
            reconcile_base_release(&doc("1.16", 23, libs), &ReconcileConfig::default()).unwrap();
        assert_eq!(result.buckets.len(), 2);
        for bucket in &result.buckets {
            assert!(bucket.rules_key.is_some());
            assert_eq!(bucket.libraries.len(), 2);
        }
    }

    #[test]
    fn conflicting_core_versions_are_format_errors() {
        let libs = vec![
            lib("org.lwjgl:lwjgl:3.2.1"),
            lib("org.lwjgl:lwjgl-glfw:3.2.2"),
            lib("org.lwjgl:lwjgl:3.2.2"),
        ];
        assert!(matches!(
            reconcile_base_release(&doc("x", 1, libs), &ReconcileConfig::default()),
            Err(ReconcileError::Format(_))
        ));
        assert!(matches!(
            reconcile_base_release(
                &doc("x", 1, vec![lib("net.java.jinput:jinput:2.0.5")]),
                &ReconcileConfig::default()
            ),
            Err(ReconcileError::Format(_))
        ));
    }

    #[test]
    fn adapts_new_style_arguments() {
        let mut d: BaseReleaseDocument = serde_json::from_value(serde_json::json!({
            "id": "1.13",
            "releaseTime": "2018-07-18T15:11:46+00:00",
            "arguments": {"game": ["--username", "${auth_player_name}", "--clientId", "${clientid}"]}
        }))
        .unwrap();
        d.minecraft_arguments = None;
        let result = reconcile_base_release(&d, &ReconcileConfig::default()).unwrap();
        assert_eq!(
            result.record.launch_arguments.as_deref(),
            Some("--username ${auth_player_name}")
        );
    }

    fn bucket_from(day: u32) -> VariantBucket {
        reconcile_base_release(&doc("1.7.10", day, gen2_libs()), &ReconcileConfig::default())
            .unwrap()
            .buckets
            .remove(0)
    }

    #[test]
    fn accumulator_dedups_and_keeps_earliest_time() {
        let mut acc = VariantAccumulator::new();
        let h1 = acc.add(bucket_from(20)).unwrap();
        let h2 = acc.add(bucket_from(5)).unwrap();
        let h3 = acc.add(bucket_from(12)).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h2, h3);
        assert_eq!(acc.len(), 1);
        let (_, bucket) = acc.iter().next().unwrap();
        assert_eq!(
            bucket.release_time,
            Utc.with_ymd_and_hms(2014, 6, 5, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn finalize_requires_single_accepted_and_no_unknown() {
        let mut acc = VariantAccumulator::new();
        let hash = acc.add(bucket_from(1)).unwrap();

        let report = acc.finalize(&VariantPolicy::default());
        assert!(report.records.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].error.kind(), "ambiguous-variant");

        let accepting = VariantPolicy {
            accepted: BTreeSet::from([hash.clone()]),
            ..VariantPolicy::default()
        };
        let report = acc.finalize(&accepting);
        assert!(report.diagnostics.is_empty());
        let record = &report.records[0];
        assert_eq!(record.package_id, "org.lwjgl");
        assert_eq!(record.display_name, "LWJGL 2");
        assert!(record.volatile);
        assert_eq!(record.order, WINDOWING_ORDER);
        assert_eq!(record.conflicts, vec![DependencyEdge::on("org.lwjgl3")]);

        let rejecting = VariantPolicy {
            accepted: BTreeSet::from([hash.clone()]),
            rejected: BTreeSet::from([hash]),
            ..VariantPolicy::default()
        };
        let report = acc.finalize(&rejecting);
        assert!(report.records.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].release, "2.9.1");
        assert_eq!(report.diagnostics[0].error.kind(), "ambiguous-variant");
    }

    #[test]
    fn bucketing_ignores_library_order() {
        let libs = vec![
            lib("com.google.guava:guava:15.0"),
            ruled("org.lwjgl:lwjgl:3.2.2", not_osx()),
            lib("org.lwjgl:lwjgl-glfw:3.2.2"),
            ruled(
                "org.lwjgl:lwjgl:3.2.2",
                vec![PlatformRule::for_os(RuleAction::Allow, "linux")],
            ),
            lib("org.lwjgl:lwjgl-opengl:3.2.2"),
            ruled(
                "org.lwjgl:lwjgl-glfw:3.2.2",
                vec![PlatformRule::for_os(RuleAction::Allow, "linux")],
            ),
        ];
        let config = ReconcileConfig::default();
        let fingerprint = |libraries: Vec<LibraryRecord>| {
            let result = reconcile_base_release(&doc("1.16", 23, libraries), &config).unwrap();
            result
                .buckets
                .iter()
                .map(|b| (b.rules_key.clone(), b.content_hash().unwrap()))
                .collect::<Vec<_>>()
        };

        let expected = fingerprint(libs.clone());
        assert_eq!(expected.len(), 2);
        let mut reversed = libs.clone();
        reversed.reverse();
        assert_eq!(fingerprint(reversed), expected);
        let mut rotated = libs;
        rotated.rotate_left(3);
        assert_eq!(fingerprint(rotated), expected);
    }

    #[test]
    fn base_record_patches_logging_and_carries_client_jar() {
        let mut d = doc(
            "1.12.2",
            18,
            vec![
                lib("org.apache.logging.log4j:log4j-api:2.8.1"),
                lib("org.apache.logging.log4j:log4j-core:2.8.1"),
                lib("com.google.guava:guava:21.0"),
            ],
        );
        d.downloads = Some(ReleaseDownloads {
            client: Some(DownloadArtifact {
                url: "https://launcher.mojang.com/v1/objects/0f27/client.jar".to_owned(),
                sha1: "0f27".to_owned(),
                size: 10_180_113,
                path: None,
            }),
        });
        d.asset_index = Some(AssetIndex {
            id: "1.12".to_owned(),
            sha1: "1584".to_owned(),
            size: 169_014,
            total_size: 127_037_351,
            url: "https://launchermeta.mojang.com/v1/packages/1584/1.12.json".to_owned(),
        });

        let record = reconcile_base_release(&d, &ReconcileConfig::default())
            .unwrap()
            .record;
        let names: Vec<String> = record.libraries.iter().map(|l| l.name.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "org.apache.logging.log4j:log4j-api:2.17.1",
                "org.apache.logging.log4j:log4j-core:2.17.1",
                "com.google.guava:guava:21.0",
            ]
        );
        assert_eq!(record.libraries[1].artifact().unwrap().size, 1_790_452);

        let main_jar = record.main_jar.unwrap();
        assert_eq!(main_jar.name.to_string(), "com.mojang:minecraft:1.12.2:client");
        assert_eq!(main_jar.artifact().unwrap().sha1, "0f27");
        assert_eq!(record.asset_index.unwrap().id, "1.12");
    }

    #[test]
    fn unpatchable_logging_fails_the_release() {
        let d = doc(
            "1.18",
            1,
            vec![lib("org.apache.logging.log4j:log4j-iostreams:2.14.1")],
        );
        assert!(matches!(
            reconcile_base_release(&d, &ReconcileConfig::default()),
            Err(ReconcileError::Format(_))
        ));
    }

    #[test]
    fn gen3_variant_drops_input_bindings() {
        let bucket = VariantBucket {
            rules_key: None,
            version: "3.2.2".to_owned(),
            libraries: vec![lib("net.java.jinput:jinput:2.0.5"), lib("org.lwjgl:lwjgl:3.2.2")],
            release_time: Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap(),
        };
        let record = variant_record(&bucket).unwrap();
        assert_eq!(record.package_id, "org.lwjgl3");
        assert_eq!(record.libraries, vec![lib("org.lwjgl:lwjgl:3.2.2")]);
        assert_eq!(record.conflicts, vec![DependencyEdge::on("org.lwjgl")]);
    }

    #[test]
    fn unknown_generation_is_format_error() {
        let bucket = VariantBucket {
            rules_key: None,
            version: "4.0.0".to_owned(),
            libraries: vec![lib("org.lwjgl:lwjgl:4.0.0")],
            release_time: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
        };
        assert!(matches!(variant_record(&bucket), Err(ReconcileError::Format(_))));
    }

    #[test]
    fn natives_must_cover_every_os() {
        let mut partial = native("org.lwjgl.lwjgl:lwjgl-platform:2.9.1");
        partial.natives.as_mut().unwrap().remove("osx");
        assert!(matches!(
            validate_natives("2.9.1", &partial),
            Err(ReconcileError::MalformedVariant { .. })
        ));

        let complete = native("org.lwjgl.lwjgl:lwjgl-platform:2.9.1");
        assert!(validate_natives("2.9.1", &complete).is_ok());

        let mut empty = lib("org.lwjgl.lwjgl:lwjgl:2.9.1");
        empty.natives = Some(BTreeMap::new());
        assert!(validate_natives("2.9.1", &empty).is_ok());

        let mut missing_download = complete.clone();
        let mut downloads = LibraryDownloads::default();
        for os in ["linux", "windows"] {
            downloads.classifiers.insert(
                format!("natives-{os}"),
                DownloadArtifact {
                    url: format!("https://libraries.minecraft.net/{os}.jar"),
                    sha1: "00".to_owned(),
                    size: 1,
                    path: None,
                },
            );
        }
        missing_download.downloads = Some(downloads);
        assert!(matches!(
            validate_natives("2.9.1", &missing_download),
            Err(ReconcileError::MalformedVariant { .. })
        ));
    }
}
