//! Validate command implementation

use colored::Colorize;
use openpype_deps::{ConfigSource, Context, FileConfigSource, ValidationProfile};

use crate::error::Result;

/// Run the validate command
pub fn run_validate(context: &Context, location: &str, addon: bool) -> Result<()> {
    let profile = if addon {
        ValidationProfile::Addon
    } else {
        ValidationProfile::Base
    };

    let document = FileConfigSource::new().get_configuration(location)?;
    context.validator().validate(&document, profile)?;

    let kind = if addon { "addon" } else { "base" };
    println!(
        "{} {} is a valid {} configuration",
        "OK".green().bold(),
        document.origin().unwrap_or(location).cyan(),
        kind
    );
    Ok(())
}
