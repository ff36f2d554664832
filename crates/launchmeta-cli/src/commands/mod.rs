pub mod addon;
pub mod base;
pub mod runtimes;
pub mod variants;

use launchmeta_core::Diagnostic;
use launchmeta_schema::{PackageIndex, VersionRecord};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_INPUT_ERROR: u8 = 2;
pub const EXIT_PARTIAL: u8 = 3;

pub const INDEX_FILE: &str = "index.json";

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn read_input<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("input error: cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("input error: {}: {e}", path.display()))
}

/// Write records under `out/<uid>/<version>.json` and refresh each package index.
pub fn write_records(out: &Path, records: &[VersionRecord]) -> Result<Vec<PathBuf>, String> {
    let mut by_package: BTreeMap<&str, Vec<&VersionRecord>> = BTreeMap::new();
    for record in records {
        by_package
            .entry(record.package_id.as_str())
            .or_default()
            .push(record);
    }

    let mut written = Vec::with_capacity(records.len());
    for (uid, package_records) in by_package {
        let dir = out.join(uid);
        let index_path = dir.join(INDEX_FILE);
        let mut index = if index_path.exists() {
            PackageIndex::read_from_file(&index_path)
                .map_err(|e| format!("cannot read {}: {e}", index_path.display()))?
        } else {
            PackageIndex::new(
                package_records[0].package_id.clone(),
                package_records[0].display_name.clone(),
            )
        };

        for record in package_records {
            let content = record
                .canonical_json()
                .map_err(|e| format!("JSON serialization failed: {e}"))?;
            let path = dir.join(format!("{}.json", record.version));
            record
                .write_to_file(&path)
                .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
            index.add(record, content.as_bytes());
            written.push(path);
        }

        index
            .write_to_file(&index_path)
            .map_err(|e| format!("cannot write {}: {e}", index_path.display()))?;
    }
    Ok(written)
}

pub fn diagnostics_json(diagnostics: &[Diagnostic]) -> Vec<serde_json::Value> {
    diagnostics
        .iter()
        .map(|d| {
            serde_json::json!({
                "release": d.release,
                "kind": d.error.kind(),
                "error": d.error.to_string(),
            })
        })
        .collect()
}

pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    use console::Style;
    let style = Style::new().yellow();
    for d in diagnostics {
        eprintln!(
            "  {} {}: {}",
            style.apply_to("SKIP"),
            d.release,
            d.error
        );
    }
}

/// Partial success when anything was skipped.
pub fn batch_exit_code(diagnostics: &[Diagnostic]) -> u8 {
    if diagnostics.is_empty() {
        EXIT_SUCCESS
    } else {
        EXIT_PARTIAL
    }
}

pub fn colorize_class(class: &str) -> String {
    use console::Style;
    match class {
        "accepted" => Style::new().green().apply_to(class).to_string(),
        "rejected" => Style::new().dim().apply_to(class).to_string(),
        "unknown" => Style::new().yellow().bold().apply_to(class).to_string(),
        other => other.to_owned(),
    }
}
