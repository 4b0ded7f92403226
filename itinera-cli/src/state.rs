use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// State directory: `$ITINERA_HOME`, else `~/.itinera`.
pub fn itinera_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("ITINERA_HOME").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".itinera"))
}

pub fn ensure_itinera_home() -> Result<PathBuf> {
    let dir = itinera_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
