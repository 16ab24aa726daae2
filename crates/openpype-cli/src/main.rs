//! OpenPype dependency CLI
//!
//! Merges addon requirements into the studio base configuration, shows the
//! resolved dependency set for a platform and materializes environments.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;
use openpype_deps::{Settings, SettingsLoader};
use openpype_fs::NormalizedPath;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: failed to initialize logging: {}", "warning".yellow(), e);
    }

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let explicit = cli.config.as_ref().map(NormalizedPath::new);
    Ok(SettingsLoader::new().load(explicit.as_ref())?)
}

fn run(cli: Cli) -> Result<i32> {
    let mut settings = load_settings(&cli)?;
    tracing::debug!(?settings, "Loaded settings");

    match cli.command {
        Commands::Validate { location, addon } => {
            let context = settings.to_context();
            commands::run_validate(&context, &location, addon)?;
            Ok(0)
        }
        Commands::Resolve {
            pipeline,
            output,
            format,
            strict,
        } => {
            let context = settings.to_context();
            commands::run_resolve(&context, &pipeline, output.as_deref(), format, strict)?;
            Ok(0)
        }
        Commands::Show {
            pipeline,
            platform,
            json,
        } => {
            let context = commands::context_for(&settings, platform.as_deref())?;
            commands::run_show(&context, &pipeline, json)?;
            Ok(0)
        }
        Commands::Install {
            pipeline,
            target,
            platform,
            timeout,
            installer,
        } => {
            if let Some(program) = installer {
                settings.installer.program = program;
            }
            if timeout.is_some() {
                settings.installer.timeout_secs = timeout;
            }
            let context = commands::context_for(&settings, platform.as_deref())?;
            commands::run_install(&context, &settings.installer, &pipeline, &target)
        }
    }
}
