//! Command-surface differ.
//!
//! Compares two `CommandModel` snapshots and produces change records grouped
//! by service plus the breaking-change log. Every iteration that reaches the
//! output is sorted first so reports are byte-stable across runs.
use crate::model::{CommandDescriptor, CommandModel};
use std::collections::BTreeMap;

mod command;
mod matching;

pub use command::{compare_commands, CommandChange};

use crate::format::{format_list, plural};

/// Level a change record is reported at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeScope {
    Service,
    Command,
}

/// One rendered line of the report before formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub scope: ChangeScope,
    /// Service key the record belongs to.
    pub key: String,
    pub message: String,
    pub breaking: bool,
}

/// Breaking-change messages per service key; the empty key is the shared group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakingChangeLog {
    entries: BTreeMap<String, Vec<String>>,
}

impl BreakingChangeLog {
    pub fn record(&mut self, key: &str, message: impl Into<String>) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .push(message.into());
    }

    /// Keys in ascending order with their messages in recorded order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, messages)| (key.as_str(), messages.as_slice()))
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

/// Changes of one service that existed in, or was added to, the new model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceChanges {
    pub key: String,
    pub display_name: String,
    pub records: Vec<ChangeRecord>,
}

/// Full result of one differencing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceDiff {
    pub removed_services: Vec<ChangeRecord>,
    pub services: Vec<ServiceChanges>,
    pub breaking: BreakingChangeLog,
}

impl SurfaceDiff {
    pub fn record_count(&self) -> usize {
        self.removed_services.len()
            + self
                .services
                .iter()
                .map(|service| service.records.len())
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == 0 && self.breaking.is_empty()
    }
}

/// Labels the differ needs to word its messages.
#[derive(Debug, Clone)]
pub struct DiffLabels {
    /// Display name used for the ungrouped service key.
    pub ungrouped_label: String,
    /// Canonical brand token used in the cmdlet-listing hint.
    pub brand: String,
}

struct ServiceGroup<'a> {
    key: &'a str,
    display_name: String,
    commands: BTreeMap<&'a str, &'a CommandDescriptor>,
}

fn group_services<'a>(model: &'a CommandModel, labels: &DiffLabels) -> BTreeMap<&'a str, ServiceGroup<'a>> {
    let mut groups: BTreeMap<&str, ServiceGroup<'a>> = BTreeMap::new();
    for command in model.commands() {
        let key = command.service_key();
        let group = groups.entry(key).or_insert_with(|| ServiceGroup {
            key,
            display_name: String::new(),
            commands: BTreeMap::new(),
        });
        if group.display_name.is_empty() {
            if let Some(display) = command.service_display_name.as_deref() {
                group.display_name = display.to_string();
            }
        }
        group.commands.insert(command.name.as_str(), command);
    }
    for group in groups.values_mut() {
        if group.key.is_empty() {
            group.display_name = labels.ungrouped_label.clone();
        } else if group.display_name.is_empty() {
            group.display_name = group.key.to_string();
        }
    }
    groups
}

fn ordered_by_display<'g, 'a>(groups: &'g BTreeMap<&'a str, ServiceGroup<'a>>) -> Vec<&'g ServiceGroup<'a>> {
    let mut ordered: Vec<&ServiceGroup<'a>> = groups.values().collect();
    ordered.sort_by(|a, b| {
        a.display_name
            .cmp(&b.display_name)
            .then_with(|| a.key.cmp(b.key))
    });
    ordered
}

/// Compare two models.
pub fn diff_models(old: &CommandModel, new: &CommandModel, labels: &DiffLabels) -> SurfaceDiff {
    let old_groups = group_services(old, labels);
    let new_groups = group_services(new, labels);
    let mut diff = SurfaceDiff::default();

    for group in ordered_by_display(&old_groups) {
        if new_groups.contains_key(group.key) {
            continue;
        }
        let message = format!("Removed support for {}", group.display_name);
        diff.breaking.record(group.key, message.clone());
        diff.removed_services.push(ChangeRecord {
            scope: ChangeScope::Service,
            key: group.key.to_string(),
            message,
            breaking: true,
        });
    }

    for group in ordered_by_display(&new_groups) {
        let records = match old_groups.get(group.key) {
            None => vec![service_added(group, labels)],
            Some(previous) => diff_service(previous, group, &mut diff.breaking),
        };
        tracing::debug!(
            service = group.key,
            records = records.len(),
            "service compared"
        );
        if records.is_empty() {
            continue;
        }
        diff.services.push(ServiceChanges {
            key: group.key.to_string(),
            display_name: group.display_name.clone(),
            records,
        });
    }

    diff
}

fn service_added(group: &ServiceGroup<'_>, labels: &DiffLabels) -> ChangeRecord {
    let message = if group.key.is_empty() {
        format!("Added {}.", group.display_name)
    } else {
        format!(
            "{name}. Added cmdlets to support the service. Cmdlets for the service have the noun prefix {prefix} and can be listed using the command 'Get-{brand}CmdletName -Service {prefix}'.",
            name = group.display_name,
            prefix = group.key,
            brand = labels.brand,
        )
    };
    ChangeRecord {
        scope: ChangeScope::Service,
        key: group.key.to_string(),
        message,
        breaking: false,
    }
}

fn diff_service(
    old: &ServiceGroup<'_>,
    new: &ServiceGroup<'_>,
    breaking: &mut BreakingChangeLog,
) -> Vec<ChangeRecord> {
    let key = new.key;
    let mut records = Vec::new();
    let record = |message: String, is_breaking: bool| ChangeRecord {
        scope: ChangeScope::Command,
        key: key.to_string(),
        message,
        breaking: is_breaking,
    };

    let removed: Vec<&str> = old
        .commands
        .keys()
        .filter(|name| !new.commands.contains_key(*name))
        .copied()
        .collect();
    if !removed.is_empty() {
        let message = format!(
            "Removed {} {}",
            plural(removed.len(), "cmdlet", "cmdlets"),
            format_list(&removed)
        );
        breaking.record(key, message.clone());
        records.push(record(message, true));
    }

    for (name, command) in &new.commands {
        if old.commands.contains_key(name) {
            continue;
        }
        records.push(record(added_command_message(command), false));
    }

    for (name, current) in &new.commands {
        let Some(previous) = old.commands.get(name) else {
            continue;
        };
        let changes = compare_commands(previous, current);
        if changes.is_empty() {
            continue;
        }
        let is_breaking = changes.iter().any(|change| change.breaking);
        if is_breaking {
            let breaking_only: Vec<&str> = changes
                .iter()
                .filter(|change| change.breaking)
                .map(|change| change.message.as_str())
                .collect();
            breaking.record(key, modified_message(name, &breaking_only));
        }
        let all: Vec<&str> = changes.iter().map(|change| change.message.as_str()).collect();
        records.push(record(modified_message(name, &all), is_breaking));
    }

    records
}

fn added_command_message(command: &CommandDescriptor) -> String {
    if command.operations.is_empty() {
        return format!("Added cmdlet {}.", command.name);
    }
    format!(
        "Added cmdlet {} leveraging the {} service {}.",
        command.name,
        format_list(&command.operations),
        plural(command.operations.len(), "API", "APIs")
    )
}

fn modified_message(name: &str, entries: &[&str]) -> String {
    format!("Modified cmdlet {name}: {}.", entries.join("; "))
}
