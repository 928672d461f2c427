//! `hwsel use-engine` command implementation

use crate::CliError;
use crate::context::CliContext;
use crate::store::ActiveEngine;
use colored::Colorize;
use hwsel_kernel::manifest::load_manifest;
use hwsel_kernel::units::fmt_bytes;
use hwsel_kernel::{EngineManifest, Grade, ManifestError, ScoredManifest, top_engine};
use tracing::info;

/// Execute `hwsel use-engine --auto`
pub fn run_auto(ctx: &CliContext) -> Result<(), CliError> {
    let scored = ctx.score_engines()?;

    println!("Evaluating engines for optimal hardware compatibility:");
    for engine in &scored {
        println!("{}", evaluation_line(engine));
    }

    let selected = top_engine(&scored)?;
    println!("Selected engine: {}", selected.name().bold());
    run(ctx, selected.name())
}

fn evaluation_line(engine: &ScoredManifest) -> String {
    if engine.score() == 0 {
        format!(
            "{} {}: not compatible: {}",
            "✘".red(),
            engine.name(),
            engine.issues().join(", ")
        )
    } else if engine.grade() != Grade::Stable {
        format!("{} {}: devel, score={}", "−".yellow(), engine.name(), engine.score())
    } else {
        format!("{} {}: compatible, score={}", "✔".green(), engine.name(), engine.score())
    }
}

/// Execute `hwsel use-engine <engine>`
pub fn run(ctx: &CliContext, name: &str) -> Result<(), CliError> {
    let manifest = load_manifest(&ctx.settings.engines_dir, name).map_err(|err| match err {
        ManifestError::NotFound { .. } => CliError::EngineNotFound(name.to_string()),
        other => other.into(),
    })?;
    print_requirements(&manifest);

    let store = ctx.store();
    let previous = store.active_name()?;
    if previous.as_deref() == Some(name) {
        println!("Engine {name:?} is already in use.");
        return Ok(());
    }

    store.save(&ActiveEngine::new(name, manifest.configurations.clone()))?;
    info!(engine = name, previous = previous.as_deref().unwrap_or("none"), "switched engine");
    println!("{} Engine changed to {name:?}.", "✔".green());
    Ok(())
}

fn print_requirements(manifest: &EngineManifest) {
    let mut resources = Vec::new();
    if let Some(memory) = manifest.memory {
        resources.push(format!("{} memory", fmt_bytes(memory.bytes())));
    }
    if let Some(disk) = manifest.disk_space {
        resources.push(format!("{} disk space", fmt_bytes(disk.bytes())));
    }
    if !resources.is_empty() {
        println!("Requires {}", resources.join(", "));
    }

    if !manifest.components.is_empty() {
        println!("Required components:");
        for component in &manifest.components {
            println!("- {component}");
        }
    }
}
