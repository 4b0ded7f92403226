use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use itinera_core::Plan;
use itinera_ingest::parse_plan;

/// Read a plan file: persisted plan JSON or raw generator output.
pub fn read_plan(path: &Path) -> Result<Plan> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_plan(&s).with_context(|| format!("parse {}", path.display()))
}

/// Write `plan` as pretty JSON to `out`, or stdout when no path is given.
pub fn write_plan(plan: &Plan, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(plan).context("serialize plan")?;
    match out {
        Some(p) => fs::write(p, json).with_context(|| format!("write {}", p.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
