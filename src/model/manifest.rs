//! Surface manifest schema written by the metadata extractor.
//!
//! The manifest mirrors reflective metadata (types, declarations, properties)
//! without interpreting it; `build` turns it into a `CommandModel`.
use super::ConfirmImpact;
use serde::{Deserialize, Serialize};

/// Current schema version for surface manifests.
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

/// Root of a surface manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurfaceManifest {
    pub schema_version: u32,
    #[serde(default)]
    pub module: Option<String>,
    /// Exported command types.
    #[serde(default)]
    pub commands: Vec<TypeEntry>,
    /// Ancestor types referenced through `base`.
    #[serde(default)]
    pub base_types: Vec<TypeEntry>,
}

/// One type and the declarations attached to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeEntry {
    pub name: String,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub cmdlet: Option<CmdletDeclaration>,
    #[serde(default)]
    pub output_types: Vec<OutputTypeDeclaration>,
    #[serde(default)]
    pub service_calls: Vec<ServiceCallDeclaration>,
    #[serde(default)]
    pub service: Option<ServiceDeclaration>,
    #[serde(default)]
    pub properties: Vec<PropertyEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CmdletDeclaration {
    pub verb: String,
    pub noun: String,
    #[serde(default)]
    pub default_parameter_set_name: Option<String>,
    #[serde(default)]
    pub supports_should_process: bool,
    #[serde(default)]
    pub confirm_impact: ConfirmImpact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputTypeDeclaration {
    #[serde(default)]
    pub types: Vec<TypeRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeRef {
    pub name: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
}

impl TypeRef {
    pub fn display_name(&self) -> &str {
        match self.friendly_name.as_deref() {
            Some(friendly) if !friendly.is_empty() => friendly,
            _ => &self.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceCallDeclaration {
    #[serde(default)]
    pub operations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceDeclaration {
    pub display_name: String,
    pub noun_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyEntry {
    pub name: String,
    pub property_type: PropertyType,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterDeclaration>,
}

/// Declared type of a property.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyType {
    pub name: String,
    #[serde(default)]
    pub value_type: bool,
    /// Inner type name when the property type is an optional wrapper.
    #[serde(default)]
    pub nullable_of: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterDeclaration {
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub value_from_pipeline: bool,
    #[serde(default)]
    pub value_from_pipeline_by_property_name: bool,
    #[serde(default)]
    pub value_from_remaining_arguments: bool,
    #[serde(default)]
    pub parameter_set_name: Option<String>,
}
