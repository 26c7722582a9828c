//! Results export module

use crate::pipeline::MiningResult;
use crate::report::Summary;
use anyhow::Result;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Write `graph.json` and `summary.json` into `output_dir`
pub fn save_results(result: &MiningResult, summary: &Summary, output_dir: &str) -> Result<()> {
    log::info!(
        "Saving {} nodes and {} edges to {}",
        result.nodes.len(),
        result.edges.len(),
        output_dir
    );

    // Ensure output directory exists
    fs::create_dir_all(output_dir)?;

    write_json(&Path::new(output_dir).join("graph.json"), result)?;
    write_json(&Path::new(output_dir).join("summary.json"), summary)?;

    log::info!("Results saved successfully");

    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(value)?.as_bytes())?;
    Ok(())
}
