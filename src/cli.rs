//! CLI argument parsing.
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "cmdlet-notes",
    version,
    about = "Release notes and breaking-change lookup for cmdlet surfaces",
    after_help = "Examples:\n  cmdlet-notes generate --old old/surface.manifest.json --new new/surface.manifest.json --version-file version.json\n  cmdlet-notes generate --previous-package AWSPowerShell --previous-version 4.1.0.0 --new surface.manifest.json --version-file version.json --out-notes notes.txt --out-breaking breaking.xml\n  cmdlet-notes normalize --manifest surface.manifest.json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Generate(GenerateArgs),
    Normalize(NormalizeArgs),
}

/// Inputs for one release-notes run.
#[derive(Parser, Debug)]
#[command(about = "Compare two surface manifests and write release notes")]
#[command(group(
    ArgGroup::new("old_source")
        .required(true)
        .args(["old", "previous_package"])
))]
pub struct GenerateArgs {
    /// Manifest for the version being released
    #[arg(long, value_name = "PATH")]
    pub new: PathBuf,

    /// Manifest for the previous version
    #[arg(long, value_name = "PATH")]
    pub old: Option<PathBuf>,

    /// Fetch the previous version by package name instead of --old
    #[arg(long, value_name = "NAME", requires = "previous_version")]
    pub previous_package: Option<String>,

    /// Package version to fetch with --previous-package
    #[arg(long, value_name = "VER", requires = "previous_package")]
    pub previous_version: Option<String>,

    /// JSON descriptor carrying ProductVersion
    #[arg(long, value_name = "PATH")]
    pub version_file: PathBuf,

    /// Write the text report here instead of stdout
    #[arg(long, value_name = "PATH")]
    pub out_notes: Option<PathBuf>,

    /// Write the breaking-changes lookup XML here
    #[arg(long, value_name = "PATH")]
    pub out_breaking: Option<PathBuf>,

    /// Overrides document listing services handled out of band
    #[arg(long, value_name = "PATH", requires = "out_breaking")]
    pub overrides: Option<PathBuf>,

    /// Directory of <token>.json service configs used to resolve overrides
    #[arg(long, value_name = "DIR", requires = "overrides")]
    pub service_configs: Option<PathBuf>,

    /// Config file (defaults to the per-user config when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Inputs for printing one normalized command model.
#[derive(Parser, Debug)]
#[command(about = "Print the normalized command model for a manifest")]
pub struct NormalizeArgs {
    /// Surface manifest to normalize
    #[arg(long, value_name = "PATH")]
    pub manifest: PathBuf,

    /// Write the model JSON here instead of stdout
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Config file (defaults to the per-user config when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
