//! Normalized command-surface model.
//!
//! A `CommandModel` is one snapshot of a command surface. It is built once
//! from a surface manifest and only read afterwards; the differ never mutates
//! it.
use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

mod build;
mod manifest;

pub use build::{load_model, BrandRule};

/// Position value recorded for parameters that are not positional.
pub const NOT_POSITIONAL: i32 = -1;

/// Confirmation impact declared by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum ConfirmImpact {
    None,
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for ConfirmImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfirmImpact::None => "None",
            ConfirmImpact::Low => "Low",
            ConfirmImpact::Medium => "Medium",
            ConfirmImpact::High => "High",
        };
        f.write_str(label)
    }
}

/// One command of the surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub name: String,
    pub output_types: Vec<String>,
    pub operations: Vec<String>,
    pub service_prefix: Option<String>,
    pub service_display_name: Option<String>,
    pub default_parameter_set: Option<String>,
    pub supports_confirmation: bool,
    pub confirm_impact: ConfirmImpact,
    pub parameters: Vec<ParameterDescriptor>,
}

impl CommandDescriptor {
    /// Grouping key for the owning service; the empty string is the ungrouped key.
    pub fn service_key(&self) -> &str {
        self.service_prefix.as_deref().unwrap_or("")
    }

    #[cfg(test)]
    pub fn parameter(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|param| param.name == name)
    }
}

/// One parameter of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub nullable: bool,
    pub mandatory: bool,
    pub position: i32,
    pub from_pipeline_by_value: bool,
    pub from_pipeline_by_property_name: bool,
    pub from_remaining_arguments: bool,
    pub parameter_set: Option<String>,
    pub names_and_aliases: Vec<String>,
}

impl ParameterDescriptor {
    pub fn is_positional(&self) -> bool {
        self.position >= 0
    }
}

/// Full snapshot of one version of the command surface, keyed by command name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandModel {
    commands: BTreeMap<String, CommandDescriptor>,
}

impl CommandModel {
    /// Build a model, rejecting duplicate command or parameter names.
    pub fn new<I>(commands: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = CommandDescriptor>,
    {
        let mut by_name = BTreeMap::new();
        for command in commands {
            let mut seen = std::collections::BTreeSet::new();
            for param in &command.parameters {
                if !seen.insert(param.name.as_str()) {
                    return Err(ModelError::DuplicateParameter {
                        command: command.name.clone(),
                        parameter: param.name.clone(),
                    });
                }
            }
            if by_name.contains_key(&command.name) {
                return Err(ModelError::DuplicateCommand { name: command.name });
            }
            by_name.insert(command.name.clone(), command);
        }
        Ok(Self { commands: by_name })
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name)
    }

    /// Commands in ascending name order.
    pub fn commands(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
