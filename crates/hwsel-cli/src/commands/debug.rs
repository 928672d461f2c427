//! `hwsel debug` developer commands

use crate::CliError;
use crate::context::CliContext;
use crate::output::{OutputFormat, render};
use colored::Colorize;
use hwsel_kernel::manifest::{load_manifests, validate};
use hwsel_kernel::selector::AllConnected;
use hwsel_kernel::{Grade, ScoredManifest, top_engine};
use hwsel_probe::{HardwareSource, ReaderSource};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Execute `hwsel debug validate-engines`
pub fn validate_engines(paths: &[PathBuf]) -> Result<(), CliError> {
    let mut all_valid = true;
    for path in paths {
        match validate(path) {
            Ok(_) => println!("{} {}", "✔".green(), path.display()),
            Err(err) => {
                all_valid = false;
                println!("{} {}: {err}", "✘".red(), path.display());
            }
        }
    }

    if all_valid {
        Ok(())
    } else {
        Err(CliError::InvalidManifests)
    }
}

/// Selection result printed by `hwsel debug select-engine`.
#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct EngineSelection<'a> {
    engines: &'a [ScoredManifest],
    top_engine: &'a str,
}

/// Execute `hwsel debug select-engine`
///
/// The machine comes from `input`, so connection checks are skipped: they
/// would describe this host, not the piped one.
pub fn select_engine(
    ctx: &CliContext,
    engines_dir: &Path,
    input: impl Read,
    format: OutputFormat,
) -> Result<(), CliError> {
    let snapshot = ReaderSource::from_reader(input)?.snapshot()?;
    let manifests = load_manifests(engines_dir)?;
    let scored = ctx.scorer(&snapshot, &AllConnected).score_all(&manifests)?;

    for engine in &scored {
        eprintln!("{}", summary_line(engine));
    }

    let selected = top_engine(&scored)?;
    eprintln!(
        "{}\n",
        format!(
            "Selected engine for your hardware configuration: {}",
            selected.name()
        )
        .green()
        .bold()
    );

    let selection = EngineSelection {
        engines: &scored,
        top_engine: selected.name(),
    };
    print!("{}", render(&selection, format)?);
    Ok(())
}

fn summary_line(engine: &ScoredManifest) -> String {
    if engine.score() == 0 {
        format!(
            "{} {} - not compatible: {}",
            "✘".red(),
            engine.name(),
            engine.issues().join(", ")
        )
    } else if engine.grade() != Grade::Stable {
        format!(
            "{} {} - score = {}, grade = {}",
            "−".yellow(),
            engine.name(),
            engine.score(),
            engine.grade()
        )
    } else {
        format!(
            "{} {} - compatible, score = {}",
            "✔".green(),
            engine.name(),
            engine.score()
        )
    }
}
