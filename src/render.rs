//! Release-notes rendering.
//!
//! The text report is diffed line by line by downstream tooling, so its layout
//! is fixed: a version header, removed services, then one block per service.
use crate::diff::{ChangeRecord, ChangeScope, SurfaceDiff};

mod lookup;

pub use lookup::{is_valid_element_name, render_breaking_lookup};

/// Marker downstream tooling scans for on breaking lines.
pub const BREAKING_MARKER: &str = "[Breaking Change]";

/// Report emitted when the previous version could not be loaded.
pub const FALLBACK_NOTES: &str = "Unable to load the previous version of the module; release notes for this version must be written manually.";

const SERVICE_BULLET: &str = "  * ";
const COMMAND_BULLET: &str = "    * ";

/// Render the text report for one release.
pub fn render_text(diff: &SurfaceDiff, version: &str) -> String {
    let mut out = String::new();
    push_line(&mut out, &format!("### {version}"));

    for record in &diff.removed_services {
        push_record(&mut out, SERVICE_BULLET, record);
    }

    for service in &diff.services {
        let mut header_written = false;
        for record in &service.records {
            match record.scope {
                ChangeScope::Service => push_record(&mut out, SERVICE_BULLET, record),
                ChangeScope::Command => {
                    if !header_written {
                        push_line(&mut out, &format!("{SERVICE_BULLET}{}", service.display_name));
                        header_written = true;
                    }
                    push_record(&mut out, COMMAND_BULLET, record);
                }
            }
        }
    }

    out
}

/// Report written in place of a diff when the previous version is unusable.
pub fn render_fallback() -> String {
    let mut out = String::new();
    push_line(&mut out, FALLBACK_NOTES);
    out
}

fn push_record(out: &mut String, bullet: &str, record: &ChangeRecord) {
    let line = if record.breaking {
        format!("{bullet}{BREAKING_MARKER} {}", record.message)
    } else {
        format!("{bullet}{}", record.message)
    };
    push_line(out, &line);
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
