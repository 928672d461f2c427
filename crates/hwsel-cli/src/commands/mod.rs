//! CLI command implementations

pub mod debug;
pub mod list;
pub mod machine;
pub mod show;
pub mod use_engine;

use crate::CliError;
use crate::cli::{Cli, Commands, DebugCommands};
use crate::context::CliContext;

pub fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = CliContext::new(&cli)?;

    match cli.command {
        Commands::ListEngines => list::run(&ctx),
        Commands::ShowEngine { engine, format } => show::run(&ctx, engine.as_deref(), format),
        Commands::UseEngine { engine, auto } => {
            if auto {
                use_engine::run_auto(&ctx)
            } else {
                // clap guarantees a name without --auto
                let name = engine.ok_or("engine name not specified")?;
                use_engine::run(&ctx, &name)
            }
        }
        Commands::ShowMachine { format, refresh } => machine::run(&ctx, format, refresh),
        Commands::Debug(DebugCommands::ValidateEngines { paths }) => debug::validate_engines(&paths),
        Commands::Debug(DebugCommands::SelectEngine { engines, format }) => {
            let engines_dir = engines.unwrap_or_else(|| ctx.settings.engines_dir.clone());
            debug::select_engine(&ctx, &engines_dir, std::io::stdin().lock(), format)
        }
    }
}
