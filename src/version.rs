//! Release version descriptor.
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Deserialize)]
struct VersionDescriptor {
    #[serde(rename = "ProductVersion")]
    product_version: Option<String>,
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+(\.\d+){1,3}$").expect("version pattern compiles"))
}

/// Read `ProductVersion` from a JSON descriptor.
pub fn load_version(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    parse_version(&bytes).with_context(|| format!("parse {}", path.display()))
}

pub fn parse_version(bytes: &[u8]) -> Result<String> {
    let descriptor: VersionDescriptor =
        serde_json::from_slice(bytes).context("parse version descriptor JSON")?;
    let version = descriptor
        .product_version
        .map(|value| value.trim().to_string())
        .ok_or_else(|| anyhow!("descriptor has no ProductVersion"))?;
    if !version_pattern().is_match(&version) {
        return Err(anyhow!(
            "ProductVersion {version:?} is not a dotted numeric version"
        ));
    }
    Ok(version)
}
