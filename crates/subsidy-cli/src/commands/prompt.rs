//! Prompt-related command implementations

use anyhow::{Context, Result};
use subsidy_core::PromptLibrary;
use subsidy_core::{Config, SubsidyMatcher};

use super::build_profile;
use crate::cli::ProfileArgs;

/// List prompts with their version and where each was loaded from
pub fn cmd_prompt_list() -> Result<()> {
    let mut library = PromptLibrary::new();
    println!("{}", render_prompt_list(&mut library));
    Ok(())
}

pub fn render_prompt_list(library: &mut PromptLibrary) -> String {
    let mut lines = vec![
        format!("{:<20} {:>7}  {:<16}  {}", "ID", "VERSION", "TASK", "SOURCE"),
        "-".repeat(72),
    ];

    for info in library.list() {
        let source = match info.source.path() {
            _ if info.version == 0 => "✗ failed to load".to_string(),
            Some(path) => format!("override {}", path.display()),
            None => "embedded".to_string(),
        };
        lines.push(format!(
            "{:<20} {:>7}  {:<16}  {}",
            info.id, info.version, info.task_type, source
        ));
    }

    let dir = library
        .override_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not available)".to_string());
    lines.push(String::new());
    lines.push(format!("Override directory: {}", dir));
    lines.join("\n")
}

/// Print the rendered search prompt for a profile without calling the provider
pub fn cmd_prompt_show(config: &Config, args: &ProfileArgs) -> Result<()> {
    let profile = build_profile(args)?;
    let matcher =
        SubsidyMatcher::from_config(config).context("Failed to create search backend")?;
    let prompt = matcher
        .build_prompt(&profile)
        .context("Failed to render search prompt")?;

    if let Some(system) = &prompt.system {
        println!("--- System ---");
        println!("{}", system);
        println!();
    }
    println!("--- User ---");
    println!("{}", prompt.user);

    Ok(())
}
