//! `hwsel list-engines` command implementation

use crate::CliError;
use crate::context::CliContext;
use crate::output::engines_table;
use hwsel_kernel::selector::display_order;

/// Execute the `hwsel list-engines` command
pub fn run(ctx: &CliContext) -> Result<(), CliError> {
    let scored = ctx.score_engines()?;
    if scored.is_empty() {
        eprintln!("No engines found.");
        return Ok(());
    }

    let active = ctx.store().active_name()?;
    let ordered = display_order(&scored);
    println!("{}", engines_table(&ordered, active.as_deref()));
    Ok(())
}
