//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `catalog` - Profile field option listing
//! - `config` - Resolved configuration display
//! - `prompt` - Prompt preview and override listing
//! - `search` - Subsidy search from the command line
//! - `serve` - Web server command

pub mod catalog;
pub mod config;
pub mod prompt;
pub mod search;
pub mod serve;

// Re-export command functions for main.rs
pub use catalog::*;
pub use config::*;
pub use prompt::*;
pub use search::*;
pub use serve::*;

use std::path::Path;

use anyhow::{bail, Context, Result};
use subsidy_core::{CompanyProfile, Config, ProfileField};

use crate::cli::ProfileArgs;

/// Load configuration from the file layers and the environment
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).with_context(|| match path {
        Some(p) => format!("Failed to load config from {}", p.display()),
        None => "Failed to load config".to_string(),
    })
}

/// Build a profile from command-line flags
///
/// Unset flags keep the form defaults. Select fields accept the catalog
/// label or its 1-based position in the catalog.
pub fn build_profile(args: &ProfileArgs) -> Result<CompanyProfile> {
    let fields = [
        (ProfileField::TaxId, &args.tax_id),
        (ProfileField::ContactPhone, &args.phone),
        (ProfileField::Industry, &args.industry),
        (ProfileField::AnnualElectricityBill, &args.bill),
        (ProfileField::EstimatedBudget, &args.budget),
        (ProfileField::ProjectEquipmentType, &args.equipment),
        (ProfileField::ProjectMeasureType, &args.measure),
        (ProfileField::ImplementationTime, &args.time),
    ];

    let mut profile = CompanyProfile::default();
    for (field, value) in fields {
        let Some(raw) = value else { continue };
        let resolved = resolve_choice(field, raw)?;
        profile = profile
            .set_field(field, &resolved)
            .with_context(|| format!("Invalid value for {}", field))?;
    }
    Ok(profile)
}

/// Map a catalog position to its label; other input passes through
pub fn resolve_choice(field: ProfileField, raw: &str) -> Result<String> {
    let Some(options) = field.catalog() else {
        return Ok(raw.to_string());
    };

    match raw.trim().parse::<usize>() {
        Ok(n) if (1..=options.len()).contains(&n) => Ok(options[n - 1].to_string()),
        Ok(n) => bail!(
            "{} option {} is out of range (1-{}); run `subsidy catalog` to list them",
            field,
            n,
            options.len()
        ),
        Err(_) => Ok(raw.to_string()),
    }
}
