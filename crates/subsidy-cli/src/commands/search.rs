//! Search command implementation

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use subsidy_core::{display, CompanyProfile, Config, SearchResult, SubsidyMatcher};

use super::build_profile;
use crate::cli::ProfileArgs;

pub async fn cmd_search(config: &Config, args: &ProfileArgs, json: bool) -> Result<()> {
    let profile = build_profile(args)?;
    let matcher =
        SubsidyMatcher::from_config(config).context("Failed to create search backend")?;

    let info = matcher.backend().info();
    eprintln!("🔎 Searching subsidies via {} ({})...", info.host, info.model);

    let result = run_search(&matcher, &profile).await?;
    println!("{}", format_result(&result, json)?);

    Ok(())
}

/// Validate the profile and run one search
///
/// Search failures surface as their fixed user message.
pub async fn run_search(matcher: &SubsidyMatcher, profile: &CompanyProfile) -> Result<SearchResult> {
    profile
        .validate()
        .map_err(|e| anyhow!("{}", profile_message(&e)))?;

    let result = matcher
        .find_subsidies(profile)
        .await
        .map_err(|e| anyhow!("{}", e.user_message()))?;

    debug!(
        subsidies = result.subsidies.len(),
        recommendations = result.recommendations.len(),
        "Search finished"
    );
    Ok(result)
}

/// Render a result as cards or pretty JSON
pub fn format_result(result: &SearchResult, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(result).context("Failed to serialize result")
    } else {
        Ok(display::render_text(result))
    }
}

fn profile_message(err: &subsidy_core::Error) -> String {
    match err {
        subsidy_core::Error::InvalidProfile(msg) => msg.clone(),
        other => other.to_string(),
    }
}
