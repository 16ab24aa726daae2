//! Command implementations for openpype-cli

pub mod install;
pub mod resolve;
pub mod show;
pub mod validate;

pub use install::run_install;
pub use resolve::run_resolve;
pub use show::run_show;
pub use validate::run_validate;

use crate::cli::PipelineArgs;
use crate::error::Result;
use openpype_deps::{
    ConfigMerger, ConfigSource, Context, Document, FileConfigSource, MergeReport, Platform,
    Settings,
};

/// Build the run context from settings and a `--platform` override.
pub fn context_for(settings: &Settings, platform: Option<&str>) -> Result<Context> {
    let mut context = settings.to_context();
    if let Some(name) = platform {
        context.platform = name.parse::<Platform>()?;
    }
    Ok(context)
}

/// Read the base, validate it and fold the addons in order.
pub fn full_config(context: &Context, args: &PipelineArgs) -> Result<(Document, Vec<MergeReport>)> {
    let source = FileConfigSource::new();
    let base = source.get_configuration(&args.base)?;
    context.validate_base(&base)?;

    let merged = ConfigMerger::new(context.clone()).merge_addons_with_reports(&base, &args.addons, &source)?;
    tracing::debug!(base = %args.base, addons = args.addons.len(), "Resolved full configuration");
    Ok(merged)
}
