//! CLI command definitions using clap

use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// hwsel - Pick the hardware acceleration engine that fits this machine
#[derive(Parser)]
#[command(name = "hwsel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (YAML, TOML or JSON)
    #[arg(short = 'c', long, global = true, env = "HWSEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read the hardware snapshot from a YAML or JSON document instead of
    /// probing this machine
    #[arg(long, global = true, value_name = "FILE")]
    pub machine: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List available engines
    ListEngines,

    /// Print information about an engine
    ShowEngine {
        /// Engine name; the active engine when omitted
        engine: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },

    /// Select an engine
    UseEngine {
        /// Engine name
        #[arg(required_unless_present = "auto")]
        engine: Option<String>,

        /// Automatically select a compatible engine
        #[arg(long, conflicts_with = "engine")]
        auto: bool,
    },

    /// Print information about the host machine
    ShowMachine {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,

        /// Probe the hardware again instead of using the cached snapshot
        #[arg(long)]
        refresh: bool,
    },

    /// Developer tools
    #[command(subcommand)]
    Debug(DebugCommands),
}

#[derive(Subcommand)]
pub enum DebugCommands {
    /// Validate engine manifest files
    ValidateEngines {
        /// Paths to engine.yaml files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Test which engine will be chosen for a machine piped in on stdin
    SelectEngine {
        /// Engine manifests directory
        #[arg(long, value_name = "DIR")]
        engines: Option<PathBuf>,

        /// Selection result format
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
}
