//! Atomic output writes.
//!
//! Reports land next to their destination as a hidden temp file and are
//! renamed into place, so readers never see a partial file.
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Write `text` to `dest`, creating parent directories as needed.
pub fn write_text(dest: &Path, text: &str) -> Result<()> {
    write_bytes(dest, text.as_bytes())
}

pub fn write_json<T: serde::Serialize>(dest: &Path, value: &T) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value).context("serialize JSON output")?;
    bytes.push(b'\n');
    write_bytes(dest, &bytes)
}

fn write_bytes(dest: &Path, bytes: &[u8]) -> Result<()> {
    let parent = dest
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    let tmp_path = temp_path(parent, dest);
    if let Err(err) = fs::write(&tmp_path, bytes) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err).with_context(|| format!("write {}", tmp_path.display()));
    }
    if let Err(err) = fs::rename(&tmp_path, dest) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err).with_context(|| format!("publish {}", dest.display()));
    }
    tracing::debug!(path = %dest.display(), bytes = bytes.len(), "wrote output");
    Ok(())
}

fn temp_path(parent: &Path, dest: &Path) -> PathBuf {
    let file_name = dest
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("output");
    parent.join(format!(".{file_name}.tmp"))
}
