use super::{
    batch_exit_code, diagnostics_json, json_pretty, print_diagnostics, read_input, write_records,
    INDEX_FILE,
};
use launchmeta_core::components::BASE_PACKAGE;
use launchmeta_core::{BaselineIndex, Reconciler};
use launchmeta_schema::{AddonRelease, VersionRecord};
use std::path::Path;
use tracing::debug;

/// Index every base record already present in the tree.
fn load_baselines(out: &Path) -> Result<BaselineIndex, String> {
    let dir = out.join(BASE_PACKAGE);
    let mut index = BaselineIndex::new();
    if !dir.is_dir() {
        return Ok(index);
    }

    let entries =
        std::fs::read_dir(&dir).map_err(|e| format!("cannot list {}: {e}", dir.display()))?;
    for entry in entries {
        let path = entry.map_err(|e| e.to_string())?.path();
        let is_record = path.extension().is_some_and(|ext| ext == "json")
            && path.file_name().is_some_and(|name| name != INDEX_FILE);
        if !is_record {
            continue;
        }
        let record = VersionRecord::read_from_file(&path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        index.insert_record(&record);
    }
    debug!("loaded {} base records from {}", index.len(), dir.display());
    Ok(index)
}

pub fn run(reconciler: &Reconciler, input: &Path, out: &Path, json: bool) -> Result<u8, String> {
    let releases: Vec<AddonRelease> = read_input(input)?;
    let total = releases.len();
    let baselines = load_baselines(out)?;
    let report = reconciler.reconcile_addons(releases, &baselines);
    let written = write_records(out, &report.records)?;

    if json {
        let payload = serde_json::json!({
            "releases": total,
            "written": written.len(),
            "diagnostics": diagnostics_json(&report.diagnostics),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "reconciled {}/{total} add-on releases against {} base records",
            report.records.len(),
            baselines.len()
        );
        print_diagnostics(&report.diagnostics);
    }

    Ok(batch_exit_code(&report.diagnostics))
}
