//! CLI argument parsing using clap derive

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// OpenPype dependency tool - merge addon requirements and build environments
#[derive(Parser, Debug)]
#[command(name = "openpype-deps")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file layered over the global settings
    #[arg(short, long, global = true, env = "OPENPYPE_DEPS_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Base configuration plus addon locations, shared by every pipeline command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PipelineArgs {
    /// Base pyproject.toml
    #[arg(short, long, default_value = "pyproject.toml")]
    pub base: String,

    /// Addon location (directory, file or file:// URL); repeat in merge order
    #[arg(short, long = "addon")]
    pub addons: Vec<String>,
}

/// Serialization format for resolved documents
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Toml,
    Json,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Check that a configuration has the required sections
    ///
    /// Examples:
    ///   openpype-deps validate pyproject.toml
    ///   openpype-deps validate addons/ftrack --addon
    Validate {
        /// File, directory or file:// URL to validate
        #[arg(default_value = "pyproject.toml")]
        location: String,

        /// Validate as an addon (dependency tables only)
        #[arg(long)]
        addon: bool,
    },

    /// Merge addons into the base and print the full configuration
    Resolve {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Toml)]
        format: OutputFormat,

        /// Fail when an addon redefines a third-party pin
        #[arg(long)]
        strict: bool,
    },

    /// Show the dependency set for a platform
    Show {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Target platform (windows, linux, darwin); defaults to this machine
        #[arg(short, long)]
        platform: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Materialize an environment for the resolved dependency set
    Install {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Directory receiving the manifest, lock file and environment
        #[arg(short, long)]
        target: PathBuf,

        /// Target platform; defaults to this machine
        #[arg(short, long)]
        platform: Option<String>,

        /// Per-step timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Installer executable (defaults to `poetry`)
        #[arg(long)]
        installer: Option<String>,
    },
}
