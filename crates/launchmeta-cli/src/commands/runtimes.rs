use super::{json_pretty, read_input, EXIT_SUCCESS};
use launchmeta_core::components::RUNTIME_PACKAGE;
use launchmeta_core::Reconciler;
use launchmeta_schema::{write_canonical, RuntimeCandidate, RuntimeSet};
use std::collections::BTreeMap;
use std::path::Path;

pub fn run(reconciler: &Reconciler, input: &Path, out: &Path, json: bool) -> Result<u8, String> {
    let candidates: Vec<RuntimeCandidate> = read_input(input)?;
    let finalized = reconciler.recommend_runtimes(candidates);

    let mut by_major: BTreeMap<u32, Vec<RuntimeCandidate>> = BTreeMap::new();
    for c in finalized {
        by_major.entry(c.version.major).or_default().push(c);
    }

    let dir = out.join(RUNTIME_PACKAGE);
    let mut summary = Vec::with_capacity(by_major.len());
    for (major, runtimes) in by_major {
        let set = RuntimeSet::new(RUNTIME_PACKAGE, major, runtimes);
        let path = dir.join(format!("{}.json", set.version));
        write_canonical(&path, &set)
            .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
        let recommended: Vec<String> = set
            .runtimes
            .iter()
            .filter(|r| r.recommended)
            .map(|r| format!("{}/{}:{}", r.os, r.architecture, r.name))
            .collect();
        summary.push((set.version, set.runtimes.len(), recommended));
    }

    if json {
        let payload: Vec<_> = summary
            .iter()
            .map(|(version, count, recommended)| {
                serde_json::json!({
                    "version": version,
                    "candidates": count,
                    "recommended": recommended,
                })
            })
            .collect();
        println!("{}", json_pretty(&payload)?);
    } else {
        for (version, count, recommended) in &summary {
            println!("{version}: {count} candidates");
            for r in recommended {
                println!("  recommended {r}");
            }
        }
    }

    Ok(EXIT_SUCCESS)
}
