//! `hwsel show-machine` command implementation

use crate::CliError;
use crate::context::CliContext;
use crate::output::{OutputFormat, render};

/// Execute the `hwsel show-machine` command
pub fn run(ctx: &CliContext, format: OutputFormat, refresh: bool) -> Result<(), CliError> {
    let snapshot = ctx.snapshot(refresh)?;
    print!("{}", render(&snapshot, format)?);
    Ok(())
}
