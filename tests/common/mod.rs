//! Shared test infrastructure for integration tests.
#![allow(dead_code)]

use serde_json::{json, Value};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Scratch directory holding manifests, descriptors, and outputs for one run.
pub struct Workspace {
    dir: TempDir,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        std::fs::create_dir_all(dir.path().join("config-home")).expect("create config home");
        Self { dir }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn write_json(&self, rel: &str, value: &Value) -> PathBuf {
        let text = serde_json::to_string_pretty(value).expect("serialize fixture");
        self.write_text(rel, &text)
    }

    pub fn write_text(&self, rel: &str, text: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent directory");
        }
        std::fs::write(&path, text.as_bytes()).expect("write fixture");
        path
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).expect("read output")
    }

    pub fn write_version(&self, version: &str) -> PathBuf {
        self.write_json("version.json", &json!({ "ProductVersion": version }))
    }

    /// Run the binary with per-user config and fetch overrides isolated.
    pub fn run<I, S>(&self, args: I) -> Output
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.command(args).output().expect("run cmdlet-notes")
    }

    pub fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(env!("CARGO_BIN_EXE_cmdlet-notes"));
        command
            .args(args)
            .current_dir(self.dir.path())
            .env("XDG_CONFIG_HOME", self.path("config-home"))
            .env("HOME", self.dir.path())
            .env_remove("CMDLET_NOTES_FETCH_COMMAND")
            .env("RUST_LOG", "warn");
        command
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

/// Base type declaring a service.
pub fn service_base(type_name: &str, display_name: &str, noun_prefix: &str) -> Value {
    json!({
        "name": type_name,
        "service": { "display_name": display_name, "noun_prefix": noun_prefix }
    })
}

/// Exported command type.
pub fn cmdlet(verb: &str, noun: &str, base: Option<&str>, properties: Vec<Value>) -> Value {
    let mut entry = json!({
        "name": format!("{verb}{noun}Cmdlet"),
        "cmdlet": { "verb": verb, "noun": noun },
        "properties": properties
    });
    if let Some(base) = base {
        entry["base"] = json!(base);
    }
    entry
}

/// Exported command type that calls service operations.
pub fn cmdlet_with_operations(
    verb: &str,
    noun: &str,
    base: Option<&str>,
    operations: &[&str],
) -> Value {
    let mut entry = cmdlet(verb, noun, base, Vec::new());
    entry["service_calls"] = json!([{ "operations": operations }]);
    entry
}

/// String-typed parameter property.
pub fn string_parameter(name: &str, mandatory: bool) -> Value {
    json!({
        "name": name,
        "property_type": { "name": "String" },
        "parameters": [{ "mandatory": mandatory }]
    })
}

pub fn manifest(base_types: Vec<Value>, commands: Vec<Value>) -> Value {
    json!({
        "schema_version": 1,
        "module": "AWSPowerShell",
        "base_types": base_types,
        "commands": commands
    })
}

pub fn s3_base() -> Value {
    service_base("S3Cmdlet", "Amazon Simple Storage Service (S3)", "S3")
}

pub fn ec2_base() -> Value {
    service_base("EC2Cmdlet", "Amazon Elastic Compute Cloud (EC2)", "EC2")
}
