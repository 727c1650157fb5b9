//! Command orchestration.
//!
//! `generate` runs load -> diff -> render -> write for one release;
//! `normalize` exposes the model the differ sees.
use crate::cli::{GenerateArgs, NormalizeArgs};
use crate::config::{load_config, NotesConfig};
use crate::diff::{diff_models, BreakingChangeLog, DiffLabels};
use crate::fetch::{fetch_previous_manifest, FetchedManifest, PackageRef};
use crate::model::{load_model, BrandRule, CommandModel};
use crate::output::{write_json, write_text};
use crate::overrides::{
    load_overrides, resolve_override_keys, ModelResolver, ServiceConfigResolver,
    ServiceKeyResolver,
};
use crate::render::{render_breaking_lookup, render_fallback, render_text};
use crate::version::load_version;
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;

/// The previous manifest, either given directly or fetched.
struct OldManifest {
    path: PathBuf,
    _fetched: Option<FetchedManifest>,
}

pub fn run_generate(args: GenerateArgs) -> Result<()> {
    let start = Instant::now();
    let config = load_config(args.config.as_deref()).context("load configuration")?;
    let brand = BrandRule::from(&config.brand);

    let new_model = load_model(&args.new, &brand).context("Error while opening new manifest")?;
    if new_model.is_empty() {
        tracing::warn!(path = %args.new.display(), "new manifest declares no commands");
    }
    let old =
        resolve_old_manifest(&args, &config).context("Error while fetching previous package")?;
    let old_model = match load_model(&old.path, &brand) {
        Ok(model) => Some(model),
        Err(err) => {
            tracing::warn!(
                path = %old.path.display(),
                error = %format!("{err:#}"),
                "previous manifest could not be loaded; release notes fall back to manual"
            );
            None
        }
    };
    let version =
        load_version(&args.version_file).context("Error while reading version descriptor")?;

    let (notes, breaking) = match old_model.as_ref() {
        Some(old_model) => {
            let labels = DiffLabels {
                ungrouped_label: config.ungrouped_label.clone(),
                brand: config.brand.canonical.clone(),
            };
            let diff = diff_models(old_model, &new_model, &labels);
            tracing::info!(
                old_commands = old_model.len(),
                new_commands = new_model.len(),
                records = diff.record_count(),
                breaking_changes = diff.breaking.len(),
                "diff complete"
            );
            if diff.is_empty() {
                tracing::info!("no surface changes between versions");
            }
            (render_text(&diff, &version), diff.breaking)
        }
        None => (render_fallback(), BreakingChangeLog::default()),
    };

    // Overrides resolve before any output is written.
    let lookup = match args.out_breaking.as_deref() {
        Some(path) => {
            let overridden = override_keys(&args, old_model.as_ref(), &new_model)?;
            let xml = render_breaking_lookup(&breaking, &overridden, &config.shared_service_token)
                .context("render breaking-changes lookup")?;
            Some((path, xml))
        }
        None => None,
    };

    match args.out_notes.as_deref() {
        Some(path) => write_text(path, &notes).context("write release notes")?,
        None => print!("{notes}"),
    }
    if let Some((path, xml)) = lookup {
        write_text(path, &xml).context("write breaking-changes lookup")?;
    }

    tracing::info!(
        version = %version,
        elapsed_ms = start.elapsed().as_millis(),
        "generate complete"
    );
    Ok(())
}

pub fn run_normalize(args: NormalizeArgs) -> Result<()> {
    let config = load_config(args.config.as_deref()).context("load configuration")?;
    let brand = BrandRule::from(&config.brand);
    let model = load_model(&args.manifest, &brand).context("Error while opening manifest")?;
    match args.out.as_deref() {
        Some(path) => write_json(path, &model).context("write normalized model")?,
        None => {
            let text = serde_json::to_string_pretty(&model).context("serialize model")?;
            println!("{text}");
        }
    }
    tracing::info!(commands = model.len(), "normalize complete");
    Ok(())
}

fn resolve_old_manifest(args: &GenerateArgs, config: &NotesConfig) -> Result<OldManifest> {
    if let Some(path) = args.old.as_deref() {
        if !path.is_file() {
            return Err(anyhow!("previous manifest {} does not exist", path.display()));
        }
        return Ok(OldManifest {
            path: path.to_path_buf(),
            _fetched: None,
        });
    }
    let (Some(name), Some(version)) = (
        args.previous_package.as_deref(),
        args.previous_version.as_deref(),
    ) else {
        return Err(anyhow!(
            "either --old or --previous-package with --previous-version is required"
        ));
    };
    let template = config.fetch_command.as_deref().ok_or_else(|| {
        anyhow!("no fetch command configured (set fetch_command or CMDLET_NOTES_FETCH_COMMAND)")
    })?;
    let fetched = fetch_previous_manifest(
        template,
        PackageRef { name, version },
        &config.manifest_file_name,
    )
    .with_context(|| format!("fetch {name} {version}"))?;
    Ok(OldManifest {
        path: fetched.path.clone(),
        _fetched: Some(fetched),
    })
}

fn override_keys(
    args: &GenerateArgs,
    old_model: Option<&CommandModel>,
    new_model: &CommandModel,
) -> Result<BTreeSet<String>> {
    let Some(path) = args.overrides.as_deref() else {
        return Ok(BTreeSet::new());
    };
    let tokens = load_overrides(path).context("Error while reading overrides")?;
    let resolver: Box<dyn ServiceKeyResolver + '_> = match args.service_configs.as_deref() {
        Some(dir) => Box::new(ServiceConfigResolver::new(dir)),
        None => Box::new(ModelResolver::new(old_model, new_model)),
    };
    let keys = resolve_override_keys(&tokens, resolver.as_ref())
        .context("Error while resolving overrides")?;
    tracing::debug!(tokens = tokens.len(), keys = keys.len(), "resolved overrides");
    Ok(keys)
}
