use super::{
    batch_exit_code, diagnostics_json, json_pretty, print_diagnostics, read_input, write_records,
};
use launchmeta_core::Reconciler;
use launchmeta_schema::BaseReleaseDocument;
use std::path::Path;

pub fn run(reconciler: &Reconciler, input: &Path, out: &Path, json: bool) -> Result<u8, String> {
    let releases: Vec<BaseReleaseDocument> = read_input(input)?;
    let batch = reconciler.reconcile_base(&releases);
    let written = write_records(out, &batch.records)?;

    if json {
        let payload = serde_json::json!({
            "releases": releases.len(),
            "written": written.len(),
            "baseline": batch.baseline.len(),
            "variants": batch.variants,
            "diagnostics": diagnostics_json(&batch.diagnostics),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "reconciled {}/{} base releases, {} windowing variants, wrote {} records",
            batch.baseline.len(),
            releases.len(),
            batch.variants.len(),
            written.len()
        );
        print_diagnostics(&batch.diagnostics);
    }

    Ok(batch_exit_code(&batch.diagnostics))
}
