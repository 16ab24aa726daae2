//! Show command implementation

use colored::Colorize;
use openpype_deps::{Context, DependencyResolver, DependencySection, DependencySet};

use crate::cli::PipelineArgs;
use crate::commands::full_config;
use crate::error::Result;

/// Run the show command
pub fn run_show(context: &Context, pipeline: &PipelineArgs, json: bool) -> Result<()> {
    let (document, _) = full_config(context, pipeline)?;
    let set = DependencyResolver::new(context.clone()).resolve(&document)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&set)?);
    } else {
        print_set(&set);
    }
    Ok(())
}

fn print_set(set: &DependencySet) {
    println!("{} {}", "Platform:".bold(), set.platform.to_string().cyan());
    println!();

    for (section, title) in [
        (DependencySection::Runtime, "Dependencies"),
        (DependencySection::Dev, "Dev dependencies"),
    ] {
        println!("{}:", title.bold());
        let entries = set.section(section);
        if entries.is_empty() {
            println!("  {}", "None".dimmed());
        }
        for (name, spec) in entries {
            let constraint = spec.constraint().unwrap_or("*");
            println!("  {} {}", name.cyan(), constraint);
        }
        println!();
    }

    println!("{}:", "Third-party tools".bold());
    if set.thirdparty.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for (name, tool) in &set.thirdparty {
        let scope = if tool.platform_specific {
            set.platform.to_string()
        } else {
            "any platform".to_string()
        };
        println!("  {} {} ({})", name.cyan(), tool.version, scope.dimmed());
    }
}
