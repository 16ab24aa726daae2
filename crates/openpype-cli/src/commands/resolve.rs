//! Resolve command implementation

use colored::Colorize;
use openpype_deps::{ConflictPolicy, Context, Document};
use openpype_fs::{NormalizedPath, io};
use std::path::Path;

use crate::cli::{OutputFormat, PipelineArgs};
use crate::commands::full_config;
use crate::error::Result;

/// Render a resolved document in `format`.
pub fn render(document: &Document, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Toml => Ok(document
            .to_toml_string()
            .map_err(openpype_deps::Error::from)?),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(document)? + "\n"),
    }
}

/// Run the resolve command
pub fn run_resolve(
    context: &Context,
    pipeline: &PipelineArgs,
    output: Option<&Path>,
    format: OutputFormat,
    strict: bool,
) -> Result<()> {
    let mut context = context.clone();
    if strict {
        context.conflict_policy = ConflictPolicy::Reject;
    }

    let (document, reports) = full_config(&context, pipeline)?;
    let rendered = render(&document, format)?;

    match output {
        Some(path) => {
            io::write_text(&NormalizedPath::new(path), &rendered)?;
            let conflicts: usize = reports.iter().map(|r| r.thirdparty_conflicts().count()).sum();
            eprintln!(
                "{} Wrote {} ({} addon(s), {} third-party pin(s) kept from base)",
                "OK".green().bold(),
                path.display().to_string().cyan(),
                reports.len(),
                conflicts
            );
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
