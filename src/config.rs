//! Tool configuration.
//!
//! Configuration is a small JSON file. Every field except `schema_version`
//! falls back to a built-in default, so a file only needs the values it
//! changes.
use crate::render::is_valid_element_name;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Environment variable that replaces the configured fetch command.
pub const FETCH_COMMAND_ENV: &str = "CMDLET_NOTES_FETCH_COMMAND";

const CONFIG_DIR_NAME: &str = "cmdlet-notes";
const CONFIG_FILE_NAME: &str = "config.json";

/// Brand tokens used to normalize service display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrandConfig {
    pub canonical: String,
    pub alternate: String,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            canonical: "AWS".to_string(),
            alternate: "Amazon".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotesConfig {
    pub schema_version: u32,
    #[serde(default)]
    pub brand: BrandConfig,
    /// Display label for commands that belong to no service.
    #[serde(default = "default_ungrouped_label")]
    pub ungrouped_label: String,
    /// Lookup tag written for the shared (empty) service key.
    #[serde(default = "default_shared_service_token")]
    pub shared_service_token: String,
    /// Template used to fetch a previous package. Placeholders: `{name}`,
    /// `{version}`, `{dest}`. Relative paths resolve against the working
    /// directory of the run; `{dest}` is the absolute extraction directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_command: Option<String>,
    #[serde(default = "default_manifest_file_name")]
    pub manifest_file_name: String,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            brand: BrandConfig::default(),
            ungrouped_label: default_ungrouped_label(),
            shared_service_token: default_shared_service_token(),
            fetch_command: None,
            manifest_file_name: default_manifest_file_name(),
        }
    }
}

fn default_ungrouped_label() -> String {
    "Common cmdlets".to_string()
}

fn default_shared_service_token() -> String {
    "Common".to_string()
}

fn default_manifest_file_name() -> String {
    "surface.manifest.json".to_string()
}

/// Per-user config location, when the platform has one.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration from `explicit`, the per-user file, or defaults.
///
/// The fetch command environment override is applied last, then the result
/// is validated.
pub fn load_config(explicit: Option<&Path>) -> Result<NotesConfig> {
    let mut config = match explicit {
        Some(path) => read_config(path)?,
        None => match user_config_path().filter(|path| path.is_file()) {
            Some(path) => read_config(&path)?,
            None => NotesConfig::default(),
        },
    };
    apply_fetch_override(&mut config, std::env::var(FETCH_COMMAND_ENV).ok());
    validate_config(&config)?;
    Ok(config)
}

/// Read one config file without applying overrides.
pub fn read_config(path: &Path) -> Result<NotesConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: NotesConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

fn apply_fetch_override(config: &mut NotesConfig, value: Option<String>) {
    if let Some(command) = value.filter(|value| !value.trim().is_empty()) {
        config.fetch_command = Some(command);
    }
}

pub fn validate_config(config: &NotesConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {} (expected {CONFIG_SCHEMA_VERSION})",
            config.schema_version
        ));
    }
    for (label, value) in [
        ("brand.canonical", &config.brand.canonical),
        ("brand.alternate", &config.brand.alternate),
        ("ungrouped_label", &config.ungrouped_label),
        ("manifest_file_name", &config.manifest_file_name),
    ] {
        if value.trim().is_empty() {
            return Err(anyhow!("{label} must be non-empty"));
        }
    }
    if !is_valid_element_name(&config.shared_service_token) {
        return Err(anyhow!(
            "shared_service_token must be a valid XML element name (got {:?})",
            config.shared_service_token
        ));
    }
    if let Some(command) = config.fetch_command.as_deref() {
        if command.trim().is_empty() {
            return Err(anyhow!("fetch_command must be non-empty when set"));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
