//! Breaking-changes lookup document.
//!
//! Build tooling reads this file to decide whether a service needs an
//! override before a release can go out.
use crate::diff::BreakingChangeLog;
use anyhow::{anyhow, Context, Result};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Root element of the lookup document.
const LOOKUP_ROOT: &str = "Services";
const REASON_ELEMENT: &str = "Reason";
const OVERRIDE_ATTRIBUTE: &str = "Override";

fn element_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9._-]*$").expect("element name pattern compiles")
    })
}

/// True when `name` can be written as an XML element tag.
pub fn is_valid_element_name(name: &str) -> bool {
    element_name_pattern().is_match(name) && !name.to_ascii_lowercase().starts_with("xml")
}

/// Render the lookup for `log`; keys in `overrides` are flagged as overridden.
///
/// The shared (empty) key is written under `shared_token`.
pub fn render_breaking_lookup(
    log: &BreakingChangeLog,
    overrides: &BTreeSet<String>,
    shared_token: &str,
) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .context("write XML declaration")?;

    if log.is_empty() {
        writer
            .write_event(Event::Empty(BytesStart::new(LOOKUP_ROOT)))
            .context("write empty lookup root")?;
    } else {
        writer
            .write_event(Event::Start(BytesStart::new(LOOKUP_ROOT)))
            .context("write lookup root")?;
        for (key, reasons) in log.iter() {
            let tag = if key.is_empty() { shared_token } else { key };
            if !is_valid_element_name(tag) {
                return Err(anyhow!(
                    "service key {tag:?} cannot be used as an XML element name"
                ));
            }
            let flag = if overrides.contains(key) { "true" } else { "false" };
            let mut start = BytesStart::new(tag);
            start.push_attribute((OVERRIDE_ATTRIBUTE, flag));
            writer
                .write_event(Event::Start(start))
                .with_context(|| format!("write lookup entry {tag}"))?;
            for reason in reasons {
                writer
                    .write_event(Event::Start(BytesStart::new(REASON_ELEMENT)))
                    .context("write reason")?;
                writer
                    .write_event(Event::Text(BytesText::from_escaped(partial_escape(reason))))
                    .context("write reason text")?;
                writer
                    .write_event(Event::End(BytesEnd::new(REASON_ELEMENT)))
                    .context("write reason")?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(tag)))
                .with_context(|| format!("write lookup entry {tag}"))?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(LOOKUP_ROOT)))
            .context("write lookup root")?;
    }

    let mut xml = String::from_utf8(writer.into_inner()).context("lookup is not valid UTF-8")?;
    xml.push('\n');
    Ok(xml)
}
