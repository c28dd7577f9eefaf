//! Path and filter utilities

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Dot-files, plus entries flagged hidden by the OS on Windows.
pub fn is_hidden(path: &Path) -> bool {
    let dot = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with('.'));
    dot || has_hidden_attribute(path)
}

#[cfg(windows)]
fn has_hidden_attribute(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    std::fs::metadata(path)
        .map(|m| m.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
        .unwrap_or(false)
}

#[cfg(not(windows))]
fn has_hidden_attribute(_path: &Path) -> bool {
    false
}

/// True if the file can be opened for reading right now.
pub fn is_readable(path: &Path) -> bool {
    std::fs::File::open(path).is_ok()
}

/// A path is tokenized iff it is a regular, readable, non-hidden file.
pub fn is_eligible_file(path: &Path) -> bool {
    path.is_file() && !is_hidden(path) && is_readable(path)
}

/// Canonicalize the watched root. Fails when it does not exist or is not a directory.
pub fn check_root_and_canonicalize(path: &Path) -> Result<PathBuf> {
    let root = path
        .canonicalize()
        .with_context(|| format!("invalid root path {}", path.display()))?;
    if !root.is_dir() {
        anyhow::bail!("invalid root path {}: not a directory", root.display());
    }
    Ok(root)
}
