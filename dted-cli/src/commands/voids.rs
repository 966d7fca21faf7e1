use anyhow::{Context, Result};
use dted::check_for_voids;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub fn run(targets: Vec<PathBuf>, indices: bool) -> Result<()> {
    let results = check_for_voids(targets, indices).context("Void scan failed")?;

    // Paths as plain strings so the output is a flat JSON object
    let report: BTreeMap<String, _> = results
        .into_iter()
        .map(|(path, check)| (path.display().to_string(), check))
        .collect();

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
