//! `hwsel show-engine` command implementation

use crate::CliError;
use crate::context::CliContext;
use crate::output::{OutputFormat, render};

/// Execute the `hwsel show-engine` command
pub fn run(ctx: &CliContext, engine: Option<&str>, format: OutputFormat) -> Result<(), CliError> {
    let name = match engine {
        Some(name) => name.to_string(),
        None => ctx.store().active_name()?.ok_or(CliError::NoActiveEngine)?,
    };

    let scored = ctx.score_engines()?;
    let engine = scored
        .iter()
        .find(|e| e.name() == name)
        .ok_or_else(|| CliError::EngineNotFound(name.clone()))?;

    print!("{}", render(engine, format)?);
    Ok(())
}
