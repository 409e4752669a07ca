//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use clap::{CommandFactory, Parser};
use subsidy_core::prompts::PromptLibrary;
use subsidy_core::{
    BackendKind, Config, MockBackend, MockReply, ProfileField, SearchClient, SubsidyMatcher,
};

use crate::cli::{Cli, Commands, ProfileArgs};
use crate::commands::{self, build_profile, resolve_choice};

fn mock_matcher(reply: MockReply) -> SubsidyMatcher {
    SubsidyMatcher::with_prompts(
        SearchClient::Mock(MockBackend::with_reply(reply)),
        PromptLibrary::embedded_only(),
    )
}

fn valid_args() -> ProfileArgs {
    ProfileArgs {
        tax_id: Some("12345678".into()),
        ..Default::default()
    }
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn test_parse_search_flags() {
    let cli = Cli::try_parse_from([
        "subsidy", "search", "--tax-id", "12345678", "--industry", "2", "--bill", "1,200,000",
        "--json",
    ])
    .unwrap();

    match cli.command {
        Commands::Search { profile, json } => {
            assert!(json);
            assert_eq!(profile.tax_id.as_deref(), Some("12345678"));
            assert_eq!(profile.industry.as_deref(), Some("2"));
            assert_eq!(profile.bill.as_deref(), Some("1,200,000"));
            assert!(profile.budget.is_none());
        }
        _ => panic!("expected search command"),
    }
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["subsidy", "config", "--config", "/tmp/x.toml", "-v"]).unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.config.unwrap().to_str(), Some("/tmp/x.toml"));
}

// ========== Profile Building Tests ==========

#[test]
fn test_build_profile_keeps_defaults() {
    let profile = build_profile(&ProfileArgs::default()).unwrap();
    assert_eq!(profile, subsidy_core::CompanyProfile::default());
}

#[test]
fn test_build_profile_resolves_catalog_numbers() {
    let args = ProfileArgs {
        industry: Some("2".into()),
        equipment: Some("照明設備 (LED)".into()),
        time: Some("4".into()),
        bill: Some("1,200,000".into()),
        ..valid_args()
    };
    let profile = build_profile(&args).unwrap();

    assert_eq!(profile.industry, "批發及零售業");
    assert_eq!(profile.project_equipment_type, "照明設備 (LED)");
    assert_eq!(profile.implementation_time, "1 年以上");
    assert_eq!(profile.annual_electricity_bill, 1_200_000.0);
    assert!(profile.validate().is_ok());
}

#[test]
fn test_resolve_choice_out_of_range() {
    let err = resolve_choice(ProfileField::Industry, "99").unwrap_err();
    assert!(err.to_string().contains("out of range"));
    assert!(resolve_choice(ProfileField::Industry, "0").is_err());
}

#[test]
fn test_resolve_choice_free_text_fields_untouched() {
    assert_eq!(resolve_choice(ProfileField::TaxId, "1").unwrap(), "1");
    assert_eq!(resolve_choice(ProfileField::ContactPhone, "02-1234").unwrap(), "02-1234");
}

#[test]
fn test_build_profile_rejects_bad_number() {
    let args = ProfileArgs {
        budget: Some("lots".into()),
        ..valid_args()
    };
    let err = build_profile(&args).unwrap_err();
    assert!(format!("{:#}", err).contains("estimatedBudget"));
}

// ========== Search Command Tests ==========

#[tokio::test]
async fn test_run_search_renders_cards() {
    let matcher = mock_matcher(MockReply::Sample);
    let profile = build_profile(&valid_args()).unwrap();

    let result = commands::run_search(&matcher, &profile).await.unwrap();
    assert_eq!(result.subsidies.len(), 2);

    let text = commands::format_result(&result, false).unwrap();
    assert!(text.contains("中小型能源用戶節能設備汰換補助"));

    let json = commands::format_result(&result, true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["subsidies"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_run_search_requires_tax_id() {
    let matcher = mock_matcher(MockReply::Sample);
    let profile = build_profile(&ProfileArgs::default()).unwrap();

    let err = commands::run_search(&matcher, &profile).await.unwrap_err();
    assert_eq!(err.to_string(), "公司統編為必填");
}

#[tokio::test]
async fn test_run_search_reports_fixed_message() {
    let profile = build_profile(&valid_args()).unwrap();

    let err = commands::run_search(&mock_matcher(MockReply::Unreachable), &profile)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), subsidy_core::error::SEARCH_UNREACHABLE_MESSAGE);

    let err = commands::run_search(&mock_matcher(MockReply::Malformed), &profile)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), subsidy_core::error::SEARCH_UNREACHABLE_MESSAGE);
}

#[tokio::test]
async fn test_run_search_empty_result() {
    let matcher = mock_matcher(MockReply::Empty);
    let profile = build_profile(&valid_args()).unwrap();

    let result = commands::run_search(&matcher, &profile).await.unwrap();
    let text = commands::format_result(&result, false).unwrap();
    assert!(text.contains(subsidy_core::display::EMPTY_STATE_MESSAGE));
}

#[tokio::test]
async fn test_cmd_search_with_mock_backend() {
    let mut config = Config::default();
    config.provider.backend = BackendKind::Mock;

    let result = commands::cmd_search(&config, &valid_args(), true).await;
    assert!(result.is_ok());
}

// ========== Catalog / Prompt / Config Command Tests ==========

#[test]
fn test_render_catalog_text() {
    let text = commands::render_catalog(false).unwrap();
    assert!(text.contains("industry:"));
    assert!(text.contains(" 1. 製造業 (default)"));
    assert!(text.contains("implementationTime:"));
    assert!(!text.contains("taxId"));
}

#[test]
fn test_render_catalog_json() {
    let json = commands::render_catalog(true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["industries"][0], "製造業");
    assert!(value["implementationTimes"].is_array());
}

#[test]
fn test_cmd_prompt_show() {
    let mut config = Config::default();
    config.provider.backend = BackendKind::Mock;
    assert!(commands::cmd_prompt_show(&config, &valid_args()).is_ok());
}

#[test]
fn test_render_prompt_list() {
    let mut library = PromptLibrary::embedded_only();
    let listing = commands::render_prompt_list(&mut library);
    assert!(listing.contains("find_subsidies"));
    assert!(listing.contains("embedded"));
    assert!(listing.contains("Override directory: (not available)"));
}

#[test]
fn test_render_prompt_list_with_override() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("find_subsidies.md"),
        "---\nid: find_subsidies\nversion: 3\ntask_type: grounded_search\n---\n# User\n{{industry}}",
    )
    .unwrap();

    let mut library = PromptLibrary::with_override_dir(dir.path().to_path_buf());
    let listing = commands::render_prompt_list(&mut library);
    assert!(listing.contains("override "));
    assert!(listing.contains("      3"));
}

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[provider]\nbackend = \"mock\"\n\n[search]\nvalidation = \"lenient\"\n\n[server]\nport = 8080"
    )
    .unwrap();

    let config = commands::load_config(Some(file.path())).unwrap();
    assert_eq!(config.provider.backend, BackendKind::Mock);
    assert_eq!(config.server.port, 8080);

    let rendered = commands::render_config(&config, Some(file.path()));
    assert!(rendered.contains("backend:    mock"));
    assert!(rendered.contains("validation: lenient"));
    assert!(rendered.contains("port:       8080"));
    assert!(!rendered.contains("not found"));
}

#[test]
fn test_load_config_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = commands::load_config(Some(&missing)).unwrap_err();
    assert!(err.to_string().contains("Failed to load config"));
}

#[test]
fn test_render_config_masks_api_key() {
    let mut config = Config::default();
    config.provider.api_key = Some("AIzaSecretKey1234".into());

    let rendered = commands::render_config(&config, None);
    assert!(rendered.contains("****1234"));
    assert!(!rendered.contains("AIzaSecret"));
}
