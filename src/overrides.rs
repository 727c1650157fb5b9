//! Override documents and service-key resolution.
//!
//! An overrides document lists services whose breaking changes are handled
//! outside the generated surface. Each entry names a service token that a
//! resolver maps to the service key used in the lookup document.
use crate::error::{AggregateError, EntryFailure};
use crate::model::CommandModel;
use anyhow::{anyhow, Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

const OVERRIDES_ROOT: &[u8] = b"Overrides";
const OVERRIDE_ELEMENT: &[u8] = b"Override";
const SERVICE_ATTRIBUTE: &str = "Service";

/// Maps an override token to a service key.
pub trait ServiceKeyResolver {
    fn resolve(&self, token: &str) -> Result<String>;
}

/// Parse the service tokens listed in an overrides document.
pub fn parse_overrides(text: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(text);
    let mut tokens = Vec::new();
    let mut saw_root = false;
    loop {
        match reader.read_event().context("parse overrides document")? {
            Event::Start(element) | Event::Empty(element) => {
                let name = element.name();
                if !saw_root {
                    if name.as_ref() != OVERRIDES_ROOT {
                        return Err(anyhow!(
                            "overrides document root must be <Overrides>, found <{}>",
                            String::from_utf8_lossy(name.as_ref())
                        ));
                    }
                    saw_root = true;
                    continue;
                }
                if name.as_ref() != OVERRIDE_ELEMENT {
                    continue;
                }
                let attribute = element
                    .try_get_attribute(SERVICE_ATTRIBUTE)
                    .context("read Override attributes")?
                    .ok_or_else(|| {
                        anyhow!(
                            "Override element at byte {} is missing its Service attribute",
                            reader.buffer_position()
                        )
                    })?;
                let token = attribute
                    .unescape_value()
                    .context("decode Service attribute")?
                    .trim()
                    .to_string();
                if token.is_empty() {
                    return Err(anyhow!("Override element has an empty Service attribute"));
                }
                tokens.push(token);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    if !saw_root {
        return Err(anyhow!("overrides document has no <Overrides> root"));
    }
    Ok(tokens)
}

/// Read and parse an overrides document from disk.
pub fn load_overrides(path: &Path) -> Result<Vec<String>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read overrides {}", path.display()))?;
    parse_overrides(&text).with_context(|| format!("parse overrides {}", path.display()))
}

/// Resolve every token, collecting all failures into one error.
pub fn resolve_override_keys(
    tokens: &[String],
    resolver: &dyn ServiceKeyResolver,
) -> Result<BTreeSet<String>, AggregateError> {
    let mut keys = BTreeSet::new();
    let mut failures = Vec::new();
    for token in tokens {
        match resolver.resolve(token) {
            Ok(key) => {
                keys.insert(key);
            }
            Err(err) => failures.push(EntryFailure {
                token: token.clone(),
                reason: format!("{err:#}"),
            }),
        }
    }
    if failures.is_empty() {
        Ok(keys)
    } else {
        Err(AggregateError { failures })
    }
}

#[derive(Deserialize)]
struct ServiceConfigFile {
    #[serde(rename = "ServiceNounPrefix")]
    service_noun_prefix: Option<String>,
}

/// Resolves tokens through `<dir>/<token>.json` service configuration files.
pub struct ServiceConfigResolver {
    dir: PathBuf,
}

impl ServiceConfigResolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ServiceKeyResolver for ServiceConfigResolver {
    fn resolve(&self, token: &str) -> Result<String> {
        let path = self.dir.join(format!("{token}.json"));
        let bytes = fs::read(&path).with_context(|| format!("read {}", path.display()))?;
        let config: ServiceConfigFile = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse {}", path.display()))?;
        config
            .service_noun_prefix
            .map(|prefix| prefix.trim().to_string())
            .filter(|prefix| !prefix.is_empty())
            .ok_or_else(|| anyhow!("{} has no ServiceNounPrefix", path.display()))
    }
}

/// Resolves tokens against the services present in the compared models.
///
/// A token matches a service prefix or display name, ignoring case. Services
/// from both versions count, so a removed service can still be overridden.
pub struct ModelResolver<'a> {
    models: Vec<&'a CommandModel>,
}

impl<'a> ModelResolver<'a> {
    pub fn new(old: Option<&'a CommandModel>, new: &'a CommandModel) -> Self {
        Self {
            models: old.into_iter().chain(std::iter::once(new)).collect(),
        }
    }
}

impl ServiceKeyResolver for ModelResolver<'_> {
    fn resolve(&self, token: &str) -> Result<String> {
        let mut keys = BTreeSet::new();
        let commands = self.models.iter().copied().flat_map(CommandModel::commands);
        for command in commands {
            let Some(prefix) = command.service_prefix.as_deref() else {
                continue;
            };
            let display = command.service_display_name.as_deref().unwrap_or_default();
            if prefix.eq_ignore_ascii_case(token) || display.eq_ignore_ascii_case(token) {
                keys.insert(prefix);
            }
        }
        let mut keys = keys.into_iter();
        match (keys.next(), keys.next()) {
            (Some(key), None) => Ok(key.to_string()),
            (None, _) => Err(anyhow!("no service in either model matches {token:?}")),
            (Some(first), Some(second)) => Err(anyhow!(
                "{token:?} matches more than one service ({first}, {second})"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CommandDescriptor, ConfirmImpact};
    use std::collections::BTreeMap;

    struct MapResolver(BTreeMap<&'static str, &'static str>);

    impl ServiceKeyResolver for MapResolver {
        fn resolve(&self, token: &str) -> Result<String> {
            self.0
                .get(token)
                .map(|key| key.to_string())
                .ok_or_else(|| anyhow!("unknown service {token}"))
        }
    }

    fn command(name: &str, prefix: &str, display: &str) -> CommandDescriptor {
        CommandDescriptor {
            name: name.to_string(),
            output_types: Vec::new(),
            operations: Vec::new(),
            service_prefix: Some(prefix.to_string()),
            service_display_name: Some(display.to_string()),
            default_parameter_set: None,
            supports_confirmation: false,
            confirm_impact: ConfirmImpact::Medium,
            parameters: Vec::new(),
        }
    }

    #[test]
    fn parses_service_tokens_in_document_order() {
        let doc = r#"<?xml version="1.0" encoding="utf-8"?>
<Overrides>
  <Override Service="S3" />
  <Override Service=" EC2 "></Override>
  <Comment>ignored</Comment>
</Overrides>"#;
        assert_eq!(parse_overrides(doc).expect("parse"), vec!["S3", "EC2"]);
    }

    #[test]
    fn override_without_service_attribute_is_an_error() {
        let doc = "<Overrides><Override Name=\"S3\"/></Overrides>";
        let err = parse_overrides(doc).expect_err("missing attribute");
        assert!(err.to_string().contains("Service attribute"));
    }

    #[test]
    fn wrong_root_is_an_error() {
        let err = parse_overrides("<Services/>").expect_err("wrong root");
        assert!(err.to_string().contains("<Overrides>"));
    }

    #[test]
    fn resolution_failures_are_aggregated() {
        let resolver = MapResolver(BTreeMap::from([("s3", "S3")]));
        let tokens = vec!["s3".to_string(), "nope".to_string(), "gone".to_string()];
        let err = resolve_override_keys(&tokens, &resolver).expect_err("should fail");
        let failed: Vec<&str> = err.failures.iter().map(|f| f.token.as_str()).collect();
        assert_eq!(failed, vec!["nope", "gone"]);
    }

    #[test]
    fn successful_resolution_returns_sorted_keys() {
        let resolver = MapResolver(BTreeMap::from([("s3", "S3"), ("ec2", "EC2")]));
        let tokens = vec!["s3".to_string(), "ec2".to_string(), "s3".to_string()];
        let keys = resolve_override_keys(&tokens, &resolver).expect("resolve");
        assert_eq!(keys.into_iter().collect::<Vec<_>>(), vec!["EC2", "S3"]);
    }

    #[test]
    fn model_resolver_matches_prefix_or_display_name() {
        let model = CommandModel::new(vec![
            command("Get-S3Bucket", "S3", "AWS Simple Storage Service"),
            command("Get-EC2Instance", "EC2", "AWS Elastic Compute Cloud"),
        ])
        .expect("build model");
        let resolver = ModelResolver::new(None, &model);
        assert_eq!(resolver.resolve("s3").expect("prefix"), "S3");
        assert_eq!(
            resolver.resolve("aws elastic compute cloud").expect("display"),
            "EC2"
        );
        assert!(resolver.resolve("Lambda").is_err());
    }

    #[test]
    fn model_resolver_covers_services_removed_from_new_model() {
        let old = CommandModel::new(vec![
            command("Get-S3Bucket", "S3", "AWS Simple Storage Service"),
            command("Get-EC2Instance", "EC2", "AWS Elastic Compute Cloud"),
        ])
        .expect("build old model");
        let new = CommandModel::new(vec![command(
            "Get-S3Bucket",
            "S3",
            "AWS Simple Storage Service",
        )])
        .expect("build new model");

        assert!(ModelResolver::new(None, &new).resolve("EC2").is_err());
        let resolver = ModelResolver::new(Some(&old), &new);
        assert_eq!(resolver.resolve("ec2").expect("old-only service"), "EC2");
        assert_eq!(resolver.resolve("S3").expect("shared service"), "S3");
        let err = resolver.resolve("Lambda").expect_err("unknown service");
        assert!(err.to_string().contains("either model"));
    }

    #[test]
    fn service_config_resolver_reads_noun_prefix() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(dir.path().join("s3.json"), r#"{ "ServiceNounPrefix": "S3", "Other": 1 }"#)
            .expect("write config");
        fs::write(dir.path().join("empty.json"), "{}").expect("write config");

        let resolver = ServiceConfigResolver::new(dir.path());
        assert_eq!(resolver.resolve("s3").expect("resolve"), "S3");
        assert!(resolver.resolve("empty").is_err());
        assert!(resolver.resolve("missing").is_err());
    }
}
