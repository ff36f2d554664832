//! Reconciliation engine for launchmeta.
//!
//! This crate turns already-parsed upstream documents into canonical
//! `VersionRecord`s: the library override engine decides which add-on
//! libraries survive against the base platform's own set, the variant
//! bucketing engine factors platform-specific windowing libraries out of
//! base-platform releases, the schema dispatcher picks one of four installer
//! strategies per add-on release, and the runtime selector marks exactly one
//! recommended candidate per comparison group. `Reconciler` drives whole
//! batches without letting one bad release stop the others.

pub mod arguments;
pub mod components;
pub mod config;
pub mod dispatch;
pub mod overrides;
pub mod pipeline;
pub mod runtime;
pub mod variants;
pub mod version_order;

pub use config::{
    parse_config_file, parse_config_str, ConfigError, LegacyLibrary, ReconcileConfig,
    WrapperArtifact,
};
pub use dispatch::{Dispatcher, InstallerDocument, Strategy};
pub use overrides::{
    filter_and_rewrite, Action, BaselineIndex, DropReason, LoggingPatch, PatchedRelease,
    PinnedArtifact, RewriteTable, SelfReferenceRule,
};
pub use pipeline::{BaseBatch, BatchReport, Diagnostic, Reconciler, VariantSummary};
pub use runtime::RuntimePolicy;
pub use variants::{
    reconcile_base_release, BaseReconciliation, ForcedSuggestion, VariantAccumulator,
    VariantBucket, VariantClass, VariantPolicy,
};
pub use version_order::{compare_relaxed, RelaxedVersion};

use launchmeta_schema::CoordinateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("format error: {0}")]
    Format(String),
    #[error("coordinate error: {0}")]
    Coordinate(#[from] CoordinateError),
    #[error("base platform version '{0}' has no canonical record yet")]
    MissingDependency(String),
    #[error("required companion document missing: {0}")]
    MissingCompanion(String),
    #[error("unclassified windowing variant for {version}: {detail}")]
    AmbiguousVariant { version: String, detail: String },
    #[error("malformed windowing variant {version}: {detail}")]
    MalformedVariant { version: String, detail: String },
    #[error("no installer schema applies: {0}")]
    UnsupportedSchema(String),
    #[error("release '{0}' is denylisted as corrupt")]
    Denylisted(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ReconcileError {
    /// Stable machine-readable category, used in JSON reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Format(_) | Self::Coordinate(_) | Self::Serialization(_) => "format",
            Self::MissingDependency(_) => "missing-dependency",
            Self::MissingCompanion(_) => "missing-companion",
            Self::AmbiguousVariant { .. } => "ambiguous-variant",
            Self::MalformedVariant { .. } => "malformed-variant",
            Self::UnsupportedSchema(_) => "unsupported-schema",
            Self::Denylisted(_) => "denylisted",
        }
    }
}
