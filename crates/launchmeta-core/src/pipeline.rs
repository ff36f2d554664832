//! Batch driver.
//!
//! One malformed upstream release never stops a run: every failure becomes a
//! `Diagnostic` and the remaining releases are still reconciled.

use crate::config::ReconcileConfig;
use crate::dispatch::Dispatcher;
use crate::overrides::BaselineIndex;
use crate::variants::{reconcile_base_release, VariantAccumulator, VariantClass};
use crate::ReconcileError;
use chrono::{DateTime, Utc};
use launchmeta_schema::{
    AddonRelease, BaseReleaseDocument, ContentHash, RuntimeCandidate, VersionRecord,
};
use serde::Serialize;
use tracing::{info, warn};

/// A release that was skipped, and why.
#[derive(Debug)]
pub struct Diagnostic {
    pub release: String,
    pub error: ReconcileError,
}

impl Diagnostic {
    pub fn new(release: impl Into<String>, error: ReconcileError) -> Self {
        Self {
            release: release.into(),
            error,
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<VersionRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    fn sort(&mut self) {
        self.records.sort_by(|a, b| {
            a.package_id
                .cmp(&b.package_id)
                .then_with(|| a.version.cmp(&b.version))
        });
    }
}

/// One windowing variant, for review before it is accepted or rejected.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VariantSummary {
    pub version: String,
    pub hash: ContentHash,
    pub class: VariantClass,
    pub earliest_release: DateTime<Utc>,
    pub library_count: usize,
}

/// Outcome of reconciling a base-platform history.
#[derive(Debug, Default)]
pub struct BaseBatch {
    /// Base records followed by the windowing variant records.
    pub records: Vec<VersionRecord>,
    pub variants: Vec<VariantSummary>,
    /// Library sets of every base record, for add-on reconciliation.
    pub baseline: BaselineIndex,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    fn accumulate(
        &self,
        releases: &[BaseReleaseDocument],
        base: &mut BatchReport,
    ) -> VariantAccumulator {
        let mut accumulator = VariantAccumulator::new();
        for doc in releases {
            let outcome = reconcile_base_release(doc, &self.config).and_then(|reconciled| {
                for bucket in reconciled.buckets {
                    accumulator.add(bucket)?;
                }
                Ok(reconciled.record)
            });
            match outcome {
                Ok(record) => {
                    info!("{}: reconciled base release", doc.id);
                    base.records.push(record);
                }
                Err(error) => {
                    warn!("{}: skipped: {error}", doc.id);
                    base.diagnostics.push(Diagnostic::new(&doc.id, error));
                }
            }
        }
        accumulator
    }

    fn summarize(&self, accumulator: &VariantAccumulator) -> Vec<VariantSummary> {
        accumulator
            .iter()
            .map(|(hash, bucket)| VariantSummary {
                version: bucket.version.clone(),
                hash: hash.clone(),
                class: self.config.variants.classify(hash),
                earliest_release: bucket.release_time,
                library_count: bucket.libraries.len(),
            })
            .collect()
    }

    /// Reconcile a base-platform history.
    ///
    /// Releases are processed in order, but the result does not depend on it:
    /// variant buckets keep their earliest release time and records come back
    /// sorted by package and version.
    pub fn reconcile_base(&self, releases: &[BaseReleaseDocument]) -> BaseBatch {
        let mut base = BatchReport::default();
        let accumulator = self.accumulate(releases, &mut base);
        let variants = self.summarize(&accumulator);
        let baseline = BaselineIndex::from_records(&base.records);

        let mut emitted = accumulator.finalize(&self.config.variants);
        for diagnostic in &emitted.diagnostics {
            warn!(
                "windowing {}: not emitted: {}",
                diagnostic.release, diagnostic.error
            );
        }
        base.sort();
        emitted.sort();
        base.records.append(&mut emitted.records);
        base.diagnostics.append(&mut emitted.diagnostics);

        BaseBatch {
            records: base.records,
            variants,
            baseline,
            diagnostics: base.diagnostics,
        }
    }

    /// Collect every windowing variant without emitting anything.
    pub fn survey_variants(
        &self,
        releases: &[BaseReleaseDocument],
    ) -> (Vec<VariantSummary>, Vec<Diagnostic>) {
        let mut base = BatchReport::default();
        let accumulator = self.accumulate(releases, &mut base);
        (self.summarize(&accumulator), base.diagnostics)
    }

    /// Reconcile add-on releases against known base-platform records.
    pub fn reconcile_addons(
        &self,
        releases: Vec<AddonRelease>,
        baselines: &BaselineIndex,
    ) -> BatchReport {
        let dispatcher = Dispatcher::new(&self.config, baselines);
        let mut report = BatchReport::default();
        for release in releases {
            let label = release
                .entry
                .long_version()
                .unwrap_or_else(|| release.entry.version.clone());
            match dispatcher.reconcile(release) {
                Ok(record) => report.records.push(record),
                Err(error) => {
                    warn!("{label}: skipped: {error}");
                    report.diagnostics.push(Diagnostic::new(label, error));
                }
            }
        }
        report.sort();
        report
    }

    /// Finalize recommended flags across a runtime catalog.
    pub fn recommend_runtimes(&self, candidates: Vec<RuntimeCandidate>) -> Vec<RuntimeCandidate> {
        self.config.runtimes.recommend_catalog(candidates)
    }
}
