//! Convenience helpers shared across command handlers.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use punchread::ReaderConfig;

/// Configuration from `path`, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<ReaderConfig> {
    match path {
        Some(path) => ReaderConfig::load(path),
        None => Ok(ReaderConfig::default()),
    }
}

/// Persist a string either to a file or stdout when `-` is provided.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str() == "-" {
        io::stdout().write_all(content.as_bytes())?;
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// Create `dir` (and parents) if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))
}

/// `<dir>/<scan stem>.overlay.png`
pub fn overlay_path(dir: &Path, scan: &Path) -> PathBuf {
    let stem = scan
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "card".to_string());
    dir.join(format!("{stem}.overlay.png"))
}

/// Create the parent directory of an output file.
pub fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}
