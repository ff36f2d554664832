use super::{
    batch_exit_code, colorize_class, diagnostics_json, json_pretty, print_diagnostics, read_input,
};
use launchmeta_core::Reconciler;
use launchmeta_schema::BaseReleaseDocument;
use std::path::Path;

pub fn run(reconciler: &Reconciler, input: &Path, json: bool) -> Result<u8, String> {
    let releases: Vec<BaseReleaseDocument> = read_input(input)?;
    let (variants, diagnostics) = reconciler.survey_variants(&releases);

    if json {
        let payload = serde_json::json!({
            "variants": variants,
            "diagnostics": diagnostics_json(&diagnostics),
        });
        println!("{}", json_pretty(&payload)?);
    } else if variants.is_empty() {
        println!("no windowing variants found");
    } else {
        println!(
            "{:<28} {:<64} {:<10} {:<25} LIBS",
            "VERSION", "HASH", "CLASS", "EARLIEST"
        );
        for v in &variants {
            let class = v.class.to_string();
            println!(
                "{:<28} {:<64} {:<10} {:<25} {}",
                v.version,
                v.hash.as_str(),
                colorize_class(&class),
                v.earliest_release.to_rfc3339(),
                v.library_count
            );
        }
        print_diagnostics(&diagnostics);
    }

    Ok(batch_exit_code(&diagnostics))
}
