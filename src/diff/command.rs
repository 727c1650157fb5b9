//! Per-command comparison.
//!
//! Entries come out in a fixed order: output, default parameter set,
//! confirmation flags, removed parameters, per-parameter breaking checks,
//! added parameters, then relaxed mandatory flags.
use super::matching::{counterpart, ParameterMatch};
use crate::format::{format_list, plural};
use crate::model::{CommandDescriptor, ParameterDescriptor};
use std::collections::BTreeSet;

/// Output-type sentinel that suppresses output comparisons.
const OUTPUT_NONE_SENTINEL: &str = "None";

/// One difference found between two versions of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandChange {
    pub message: String,
    pub breaking: bool,
}

impl CommandChange {
    fn breaking(message: String) -> Self {
        Self {
            message,
            breaking: true,
        }
    }

    fn additive(message: String) -> Self {
        Self {
            message,
            breaking: false,
        }
    }
}

/// Compare two versions of the same command.
pub fn compare_commands(old: &CommandDescriptor, new: &CommandDescriptor) -> Vec<CommandChange> {
    let mut changes = Vec::new();

    let old_outputs: BTreeSet<&str> = old.output_types.iter().map(String::as_str).collect();
    let new_outputs: BTreeSet<&str> = new.output_types.iter().map(String::as_str).collect();
    if old_outputs != new_outputs && !old_outputs.contains(OUTPUT_NONE_SENTINEL) {
        changes.push(CommandChange::breaking(format!(
            "changed output from {} to {}",
            describe_outputs(&old.output_types),
            describe_outputs(&new.output_types)
        )));
    }

    if old.default_parameter_set != new.default_parameter_set {
        changes.push(CommandChange::breaking(parameter_set_message(
            old.default_parameter_set.as_deref().unwrap_or("null"),
            new.default_parameter_set.as_deref().unwrap_or("null"),
        )));
    }
    // Confirmation changes reuse the parameter-set wording; downstream
    // tooling already matches on this text.
    if old.supports_confirmation != new.supports_confirmation {
        changes.push(CommandChange::breaking(parameter_set_message(
            bool_label(old.supports_confirmation),
            bool_label(new.supports_confirmation),
        )));
    }
    if old.confirm_impact != new.confirm_impact {
        changes.push(CommandChange::breaking(parameter_set_message(
            &old.confirm_impact.to_string(),
            &new.confirm_impact.to_string(),
        )));
    }

    let mut old_params: Vec<&ParameterDescriptor> = old.parameters.iter().collect();
    old_params.sort_by(|a, b| a.name.cmp(&b.name));
    let mut new_params: Vec<&ParameterDescriptor> = new.parameters.iter().collect();
    new_params.sort_by(|a, b| a.name.cmp(&b.name));

    let removed: Vec<&str> = old_params
        .iter()
        .filter(|param| lookup(&new.name, param, &old.parameters, &new.parameters).is_none())
        .map(|param| param.name.as_str())
        .collect();
    if !removed.is_empty() {
        changes.push(CommandChange::breaking(format!(
            "removed {} {}",
            plural(removed.len(), "parameter", "parameters"),
            format_list(&removed)
        )));
    }

    let mut matched = Vec::new();
    let mut added = Vec::new();
    for param in &new_params {
        match lookup(&new.name, param, &new.parameters, &old.parameters) {
            Some(previous) => matched.push((previous, *param)),
            None => added.push(param.name.as_str()),
        }
    }

    for (previous, current) in &matched {
        changes.extend(
            parameter_breaking_changes(previous, current)
                .into_iter()
                .map(CommandChange::breaking),
        );
    }

    if !added.is_empty() {
        changes.push(CommandChange::additive(format!(
            "added {} {}",
            plural(added.len(), "parameter", "parameters"),
            format_list(&added)
        )));
    }

    for (previous, current) in &matched {
        if previous.mandatory && !current.mandatory {
            changes.push(CommandChange::additive(format!(
                "parameter {} is no longer mandatory",
                current.name
            )));
        }
    }

    changes
}

/// Breaking checks for one matched parameter pair, in reporting order.
fn parameter_breaking_changes(old: &ParameterDescriptor, new: &ParameterDescriptor) -> Vec<String> {
    let name = &new.name;
    let mut messages = Vec::new();

    if !old.mandatory && new.mandatory {
        messages.push(format!("parameter {name} is now mandatory"));
    }
    if old.type_name != new.type_name {
        messages.push(format!(
            "changed type of parameter {name} from {} to {}",
            old.type_name, new.type_name
        ));
    } else if old.nullable && !new.nullable {
        messages.push(format!("parameter {name} no longer accepts null values"));
    }
    if old.from_pipeline_by_value && !new.from_pipeline_by_value {
        messages.push(format!(
            "parameter {name} no longer accepts values from the pipeline"
        ));
    }
    if old.from_pipeline_by_property_name && !new.from_pipeline_by_property_name {
        messages.push(format!(
            "parameter {name} no longer accepts values from the pipeline by property name"
        ));
    }
    if old.from_remaining_arguments && !new.from_remaining_arguments {
        messages.push(format!(
            "parameter {name} no longer accepts remaining arguments"
        ));
    }
    if old.is_positional() && !new.is_positional() {
        messages.push(format!("parameter {name} is no longer positional"));
    } else if old.is_positional() && old.position != new.position {
        messages.push(format!(
            "changed position of parameter {name} from {} to {}",
            old.position, new.position
        ));
    }

    messages
}

fn lookup<'a>(
    command: &str,
    param: &ParameterDescriptor,
    own: &[ParameterDescriptor],
    other: &'a [ParameterDescriptor],
) -> Option<&'a ParameterDescriptor> {
    let found = counterpart(param, own, other);
    if let ParameterMatch::Ambiguous(count) = found {
        tracing::warn!(
            command,
            parameter = %param.name,
            candidates = count,
            "ambiguous parameter match; treating as unmatched"
        );
    }
    found.unique()
}

fn parameter_set_message(old: &str, new: &str) -> String {
    format!("changed default parameter set from {old} to {new}")
}

fn bool_label(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

fn describe_outputs(outputs: &[String]) -> String {
    if outputs.is_empty() {
        "(none)".to_string()
    } else {
        outputs.join(", ")
    }
}
