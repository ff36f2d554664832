//! Reconciliation configuration.
//!
//! Every fixup table the engine consults lives here and is passed in
//! explicitly. The built-in defaults cover the published upstream history;
//! a TOML file may replace any table, omitted tables keep their defaults.

use crate::overrides::{LoggingPatch, RewriteTable};
use crate::runtime::RuntimePolicy;
use crate::variants::VariantPolicy;
use launchmeta_schema::{ArtifactCoordinate, DownloadArtifact, LibraryRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseToml(#[from] toml::de::Error),
}

/// Auxiliary library a pre-installer add-on used to fetch at first start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LegacyLibrary {
    pub filename: String,
    #[serde(default)]
    pub sha1: Option<String>,
}

impl LegacyLibrary {
    fn pinned(filename: &str, sha1: &str) -> Self {
        Self {
            filename: filename.to_owned(),
            sha1: Some(sha1.to_owned()),
        }
    }
}

/// Bridge artifact that runs build-system installers at launch time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WrapperArtifact {
    pub coordinate: ArtifactCoordinate,
    /// Maven root the wrapper is served from, with trailing `/`.
    pub maven: String,
    pub sha1: String,
    pub size: u64,
    pub main_class: String,
}

impl Default for WrapperArtifact {
    fn default() -> Self {
        Self {
            coordinate: ArtifactCoordinate::new(
                "io.github.zekerzhayard",
                "ForgeWrapper",
                "prism-2024-02-29",
            ),
            maven: "https://files.prismlauncher.org/maven/".to_owned(),
            sha1: "86c6791e32ac6478dabf9663f0ad19f8b6465dfe".to_owned(),
            size: 35483,
            main_class: "io.github.zekerzhayard.forgewrapper.installer.Main".to_owned(),
        }
    }
}

impl WrapperArtifact {
    pub fn library(&self) -> LibraryRecord {
        LibraryRecord::new(self.coordinate.clone()).with_artifact(DownloadArtifact {
            url: format!("{}{}", self.maven, self.coordinate.path()),
            sha1: self.sha1.clone(),
            size: self.size,
            path: None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct ReconcileConfig {
    /// Add-on long versions known to be corrupt upstream.
    pub denylist: BTreeSet<String>,
    pub rewrites: RewriteTable,
    pub logging_patch: LoggingPatch,
    /// Base version -> auxiliary libraries its pre-installer add-ons need.
    pub legacy_libraries: BTreeMap<String, Vec<LegacyLibrary>>,
    pub wrapper: WrapperArtifact,
    pub variants: VariantPolicy,
    pub runtimes: RuntimePolicy,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            denylist: BTreeSet::from(["1.12.2-14.23.5.2851".to_owned()]),
            rewrites: RewriteTable::default(),
            logging_patch: LoggingPatch::default(),
            legacy_libraries: default_legacy_libraries(),
            wrapper: WrapperArtifact::default(),
            variants: VariantPolicy::default(),
            runtimes: RuntimePolicy::default(),
        }
    }
}

impl ReconcileConfig {
    pub fn is_denylisted(&self, long_version: &str) -> bool {
        self.denylist.contains(long_version)
    }

    /// True when pre-installer add-ons for `base_version` need auxiliary libraries.
    pub fn needs_legacy_libraries(&self, base_version: &str) -> bool {
        self.legacy_libraries
            .get(base_version)
            .is_some_and(|libs| !libs.is_empty())
    }
}

fn default_legacy_libraries() -> BTreeMap<String, Vec<LegacyLibrary>> {
    const ARGO: (&str, &str) = ("argo-2.25.jar", "bb672829fde76cb163004752b86b0484bd0a7f4b");
    const GUAVA: (&str, &str) = ("guava-12.0.1.jar", "b8e78b9af7bf45900e14c6f958486b6ca682195f");
    const ASM: (&str, &str) = ("asm-all-4.0.jar", "98308890597acb64047f7e896638e0d98753ae82");

    let gen1 = [ARGO, GUAVA, ASM];
    let gen2 = [
        ARGO,
        GUAVA,
        ASM,
        ("bcprov-jdk15on-147.jar", "b6f5d9926b0afbde9f4dbe3db88c5247be7794bb"),
    ];
    let gen3 = [
        ("argo-small-3.2.jar", "58912ea2858d168c50781f956fa5b59f0f7c6b51"),
        ("guava-14.0-rc3.jar", "931ae21fa8014c3ce686aaa621eae565fefb1a6a"),
        ("asm-all-4.1.jar", "054986e962b88d8660ae4566475658469595ef58"),
        ("bcprov-jdk15on-148.jar", "960dea7c9181ba0b17e8bab0c06a43f0a5f04e65"),
        ("scala-library.jar", "458d046151ad179c85429ed7420ffb1eaf6ddf85"),
    ];

    let mut table = BTreeMap::new();
    let mut put = |version: &str, files: &[(&str, &str)]| {
        table.insert(
            version.to_owned(),
            files
                .iter()
                .map(|(name, sha1)| LegacyLibrary::pinned(name, sha1))
                .collect(),
        );
    };

    put("1.3.2", &gen1);
    for v in ["1.4", "1.4.1", "1.4.2", "1.4.3", "1.4.4", "1.4.5", "1.4.6", "1.4.7"] {
        put(v, &gen2);
    }
    for (v, deobf) in [
        (
            "1.5",
            ("deobfuscation_data_1.5.zip", "5f7c142d53776f16304c0bbe10542014abad6af8"),
        ),
        (
            "1.5.1",
            ("deobfuscation_data_1.5.1.zip", "22e221a0d89516c1f721d6cab056a7e37471d0a6"),
        ),
        (
            "1.5.2",
            ("deobfuscation_data_1.5.2.zip", "446e55cd986582c70fcf12cb27bc00114c5adfd9"),
        ),
    ] {
        let mut files = gen3.to_vec();
        files.push(deobf);
        put(v, &files);
    }
    table
}

pub fn parse_config_str(input: &str) -> Result<ReconcileConfig, ConfigError> {
    Ok(toml::from_str(input)?)
}

pub fn parse_config_file(path: impl AsRef<Path>) -> Result<ReconcileConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config_str(&content)
}
