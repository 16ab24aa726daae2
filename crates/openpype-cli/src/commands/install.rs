//! Install command implementation

use colored::Colorize;
use openpype_deps::{Context, DependencyResolver, InstallerSettings};
use openpype_env::{EnvironmentMaterializer, ProvisionReport, ProvisionStatus};
use openpype_fs::NormalizedPath;
use std::path::Path;

use crate::cli::PipelineArgs;
use crate::commands::full_config;
use crate::error::Result;

/// Run the install command, returning the process exit code.
pub fn run_install(
    context: &Context,
    installer: &InstallerSettings,
    pipeline: &PipelineArgs,
    target: &Path,
) -> Result<i32> {
    let (document, _) = full_config(context, pipeline)?;
    let set = DependencyResolver::new(context.clone()).resolve(&document)?;
    let materializer = EnvironmentMaterializer::from_settings(installer, &context.product);
    let target = NormalizedPath::new(target);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(materializer.provision(&set, &target))?;

    print_report(&report);
    Ok(report.exit_code_or_default())
}

fn print_report(report: &ProvisionReport) {
    match report.status {
        ProvisionStatus::Installed => {
            println!(
                "{} Installed {} package(s) into {}",
                "OK".green().bold(),
                report.locked_packages.len(),
                report.target.cyan()
            );
            println!("{}: {}", "Manifest".dimmed(), report.manifest_checksum);
        }
        status => {
            let step = report
                .failed_step
                .map(|s| s.to_string())
                .unwrap_or_else(|| "provision".to_string());
            eprintln!(
                "{} {} step {:?} (exit code {})",
                "error".red().bold(),
                step,
                status,
                report.exit_code_or_default()
            );
            if !report.stderr.trim().is_empty() {
                eprintln!("{}", report.stderr.trim_end());
            }
            eprintln!(
                "{}: manifest left in {}",
                "note".yellow(),
                report.target.cyan()
            );
        }
    }
}
