//! Config command implementation

use std::path::Path;

use anyhow::Result;
use subsidy_core::config::default_config_path;
use subsidy_core::prompts::default_prompts_dir;
use subsidy_core::Config;

pub fn cmd_config(config: &Config, path: Option<&Path>) -> Result<()> {
    println!("{}", render_config(config, path));
    Ok(())
}

/// Human-readable summary of the resolved configuration; the API key is masked
pub fn render_config(config: &Config, path: Option<&Path>) -> String {
    let file = path
        .map(Path::to_path_buf)
        .or_else(default_config_path)
        .map(|p| {
            let state = if p.exists() { "" } else { " (not found, using defaults)" };
            format!("{}{}", p.display(), state)
        })
        .unwrap_or_else(|| "(not available)".to_string());

    let timeout = config
        .provider
        .timeout
        .map(|t| format!("{}s", t.as_secs()))
        .unwrap_or_else(|| "transport default".to_string());

    let prompts = default_prompts_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not available)".to_string());

    [
        format!("Config file:  {}", file),
        String::new(),
        "[provider]".to_string(),
        format!("  backend:    {}", config.provider.backend.as_str()),
        format!("  model:      {}", config.provider.model),
        format!("  base_url:   {}", config.provider.base_url),
        format!("  timeout:    {}", timeout),
        format!("  api_key:    {}", config.masked_api_key()),
        String::new(),
        "[search]".to_string(),
        format!("  validation: {}", config.validation),
        String::new(),
        "[server]".to_string(),
        format!("  host:       {}", config.server.host),
        format!("  port:       {}", config.server.port),
        String::new(),
        format!("Prompt overrides: {}", prompts),
    ]
    .join("\n")
}
