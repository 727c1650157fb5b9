//! Fetching a previously published package.
//!
//! The fetch itself is delegated to an external command configured as a
//! template; this module only runs it and finds the manifest it left behind.
//! The command runs in the caller's working directory. `{dest}` expands to
//! the absolute extraction directory.
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use tempfile::TempDir;

/// A manifest extracted into a temporary directory.
///
/// The directory is removed when this value is dropped.
#[derive(Debug)]
pub struct FetchedManifest {
    _workdir: TempDir,
    pub path: PathBuf,
}

/// Package coordinates handed to the fetch command.
#[derive(Debug, Clone, Copy)]
pub struct PackageRef<'a> {
    pub name: &'a str,
    pub version: &'a str,
}

/// Run `template` for `package` and locate `manifest_file_name` in its output.
pub fn fetch_previous_manifest(
    template: &str,
    package: PackageRef<'_>,
    manifest_file_name: &str,
) -> Result<FetchedManifest> {
    let workdir = tempfile::Builder::new()
        .prefix("cmdlet-notes-fetch-")
        .tempdir()
        .context("create fetch directory")?;
    let argv = expand_template(template, package, workdir.path())?;
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| anyhow!("fetch command is empty"))?;
    let program_path =
        which::which(program).with_context(|| format!("locate fetch program {program}"))?;

    let start = Instant::now();
    let output = Command::new(&program_path)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("run fetch command {}", program_path.display()))?;
    let elapsed_ms = start.elapsed().as_millis();
    tracing::info!(
        package = package.name,
        version = package.version,
        elapsed_ms,
        "fetch complete"
    );

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "fetch command failed with status {}: {}",
            output.status,
            stderr.trim()
        ));
    }

    let path = find_manifest(workdir.path(), manifest_file_name)?.ok_or_else(|| {
        anyhow!(
            "fetched package {} {} contains no {manifest_file_name}",
            package.name,
            package.version
        )
    })?;
    tracing::debug!(path = %path.display(), "located previous manifest");
    Ok(FetchedManifest {
        _workdir: workdir,
        path,
    })
}

fn expand_template(template: &str, package: PackageRef<'_>, dest: &Path) -> Result<Vec<String>> {
    let dest = dest.to_string_lossy();
    let argv = shell_words::split(template)
        .with_context(|| format!("parse fetch command: {template}"))?;
    Ok(argv
        .into_iter()
        .map(|arg| {
            arg.replace("{name}", package.name)
                .replace("{version}", package.version)
                .replace("{dest}", &dest)
        })
        .collect())
}

/// First file named `file_name` under `root`, in sorted path order.
fn find_manifest(root: &Path, file_name: &str) -> Result<Option<PathBuf>> {
    let files = collect_files_recursive(root)?;
    Ok(files
        .into_iter()
        .find(|path| path.file_name().is_some_and(|name| name == file_name)))
}

fn collect_files_recursive(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("read {}", root.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            files.extend(collect_files_recursive(&path)?);
        } else if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
