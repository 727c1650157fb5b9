//! Surface manifest -> `CommandModel` construction.
use super::manifest::{PropertyEntry, SurfaceManifest, TypeEntry, MANIFEST_SCHEMA_VERSION};
use super::{CommandDescriptor, CommandModel, ParameterDescriptor, NOT_POSITIONAL};
use crate::config::BrandConfig;
use crate::error::ModelError;
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Brand normalization applied to service display names.
#[derive(Debug, Clone)]
pub struct BrandRule {
    canonical: String,
    alternate: String,
}

impl BrandRule {
    pub fn new(canonical: impl Into<String>, alternate: impl Into<String>) -> Self {
        Self {
            canonical: canonical.into(),
            alternate: alternate.into(),
        }
    }

    /// Rewrite `<alternate> X` to `<canonical> X` and prefix unbranded names.
    pub fn normalize(&self, display_name: &str) -> String {
        let alternate_prefix = format!("{} ", self.alternate);
        if let Some(rest) = display_name.strip_prefix(&alternate_prefix) {
            return format!("{} {rest}", self.canonical);
        }
        if display_name.starts_with(&self.canonical) {
            return display_name.to_string();
        }
        format!("{} {display_name}", self.canonical)
    }
}

impl From<&BrandConfig> for BrandRule {
    fn from(config: &BrandConfig) -> Self {
        BrandRule::new(config.canonical.clone(), config.alternate.clone())
    }
}

/// Read a surface manifest from disk and build its model.
pub fn load_model(path: &Path, brand: &BrandRule) -> Result<CommandModel> {
    let bytes = fs::read(path).with_context(|| format!("read manifest {}", path.display()))?;
    let manifest: SurfaceManifest = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse manifest {}", path.display()))?;
    let model = build_model(&manifest, brand)
        .with_context(|| format!("build command model from {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        commands = model.len(),
        "command model loaded"
    );
    Ok(model)
}

/// Build a model from an already parsed manifest.
///
/// Any missing declaration aborts the whole model; commands are never skipped.
pub fn build_model(manifest: &SurfaceManifest, brand: &BrandRule) -> Result<CommandModel, ModelError> {
    if manifest.schema_version != MANIFEST_SCHEMA_VERSION {
        return Err(ModelError::UnsupportedSchema {
            found: manifest.schema_version,
            expected: MANIFEST_SCHEMA_VERSION,
        });
    }

    let mut types: BTreeMap<&str, &TypeEntry> = BTreeMap::new();
    for entry in manifest.base_types.iter().chain(manifest.commands.iter()) {
        types.insert(entry.name.as_str(), entry);
    }

    let mut commands = Vec::with_capacity(manifest.commands.len());
    for entry in &manifest.commands {
        commands.push(build_command(entry, &types, brand)?);
    }
    CommandModel::new(commands)
}

fn build_command(
    entry: &TypeEntry,
    types: &BTreeMap<&str, &TypeEntry>,
    brand: &BrandRule,
) -> Result<CommandDescriptor, ModelError> {
    let cmdlet = entry
        .cmdlet
        .as_ref()
        .ok_or_else(|| ModelError::MissingAnnotation {
            type_name: entry.name.clone(),
            annotation: "cmdlet",
        })?;
    if cmdlet.verb.trim().is_empty() || cmdlet.noun.trim().is_empty() {
        return Err(ModelError::MissingAnnotation {
            type_name: entry.name.clone(),
            annotation: "cmdlet verb/noun",
        });
    }

    let chain = inheritance_chain(entry, types)?;

    let mut output_types = Vec::new();
    for declaration in &entry.output_types {
        for type_ref in &declaration.types {
            push_unique(&mut output_types, type_ref.display_name());
        }
    }

    let mut operations = Vec::new();
    for call in &entry.service_calls {
        for operation in &call.operations {
            push_unique(&mut operations, operation);
        }
    }

    let service = chain.iter().find_map(|ty| ty.service.as_ref());
    let service_prefix = service
        .map(|decl| decl.noun_prefix.trim())
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_string);
    let service_display_name = service
        .map(|decl| decl.display_name.trim())
        .filter(|name| !name.is_empty())
        .map(|name| brand.normalize(name));

    let mut parameters = Vec::new();
    let mut hidden = BTreeSet::new();
    for ty in &chain {
        for property in &ty.properties {
            if !hidden.insert(property.name.as_str()) {
                continue;
            }
            if let Some(param) = build_parameter(ty, property)? {
                parameters.push(param);
            }
        }
    }

    Ok(CommandDescriptor {
        name: format!("{}-{}", cmdlet.verb.trim(), cmdlet.noun.trim()),
        output_types,
        operations,
        service_prefix,
        service_display_name,
        default_parameter_set: cmdlet.default_parameter_set_name.clone(),
        supports_confirmation: cmdlet.supports_should_process,
        confirm_impact: cmdlet.confirm_impact,
        parameters,
    })
}

/// The type itself followed by its ancestors, most derived first.
fn inheritance_chain<'a>(
    entry: &'a TypeEntry,
    types: &BTreeMap<&str, &'a TypeEntry>,
) -> Result<Vec<&'a TypeEntry>, ModelError> {
    let mut chain = vec![entry];
    let mut visited = BTreeSet::from([entry.name.as_str()]);
    let mut current = entry;
    while let Some(base) = current.base.as_deref() {
        let next = types
            .get(base)
            .copied()
            .ok_or_else(|| ModelError::UnknownBaseType {
                type_name: current.name.clone(),
                base: base.to_string(),
            })?;
        if !visited.insert(next.name.as_str()) {
            return Err(ModelError::InheritanceCycle {
                type_name: entry.name.clone(),
            });
        }
        chain.push(next);
        current = next;
    }
    Ok(chain)
}

fn build_parameter(
    owner: &TypeEntry,
    property: &PropertyEntry,
) -> Result<Option<ParameterDescriptor>, ModelError> {
    let Some(declaration) = property.parameters.first() else {
        return Ok(None);
    };
    if property.name.trim().is_empty() || property.property_type.name.trim().is_empty() {
        return Err(ModelError::MissingAnnotation {
            type_name: owner.name.clone(),
            annotation: "property name/type",
        });
    }

    let (type_name, nullable) = match property.property_type.nullable_of.as_deref() {
        Some(inner) => (inner.to_string(), true),
        None => (
            property.property_type.name.clone(),
            !property.property_type.value_type,
        ),
    };

    let mut names_and_aliases = vec![property.name.clone()];
    for alias in &property.aliases {
        push_unique(&mut names_and_aliases, alias);
    }

    let position = match declaration.position {
        Some(position) if position >= 0 => position,
        _ => NOT_POSITIONAL,
    };

    Ok(Some(ParameterDescriptor {
        name: property.name.clone(),
        type_name,
        nullable,
        mandatory: declaration.mandatory,
        position,
        from_pipeline_by_value: declaration.value_from_pipeline,
        from_pipeline_by_property_name: declaration.value_from_pipeline_by_property_name,
        from_remaining_arguments: declaration.value_from_remaining_arguments,
        parameter_set: declaration.parameter_set_name.clone(),
        names_and_aliases,
    }))
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|existing| existing == value) {
        values.push(value.to_string());
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
