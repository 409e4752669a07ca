//! Configuration for the provider, search validation and server
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override (explicit path, or ~/.local/share/subsidy/config.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Environment variables are applied on top:
//! - `SUBSIDY_BACKEND`: gemini | mock
//! - `GEMINI_MODEL`, `GEMINI_BASE_URL`
//! - `GEMINI_API_KEY` (falls back to `API_KEY`)
//!
//! The API key is resolved once here and handed to the backend explicitly.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/subsidy.toml");

pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Which search backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Gemini,
    Mock,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Mock => "mock",
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "mock" => Ok(Self::Mock),
            other => Err(Error::Config(format!("Unknown backend: {}", other))),
        }
    }
}

/// How strictly a parsed provider response is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Reject responses that break the JSON contract
    #[default]
    Strict,
    /// Pass parsed JSON through best-effort
    Lenient,
}

impl std::str::FromStr for ValidationMode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" | "best-effort" | "best_effort" => Ok(Self::Lenient),
            other => Err(Error::Config(format!("Unknown validation mode: {}", other))),
        }
    }
}

impl std::fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lenient => write!(f, "lenient"),
        }
    }
}

/// Model provider settings
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub backend: BackendKind,
    pub model: String,
    pub base_url: String,
    /// Request timeout; `None` leaves the transport default in place
    pub timeout: Option<Duration>,
    pub api_key: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Gemini,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            api_key: None,
        }
    }
}

/// Web server settings
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub validation: ValidationMode,
    pub server: ServerSettings,
}

impl Config {
    /// Load config from file layers and the process environment
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut config = load_config(override_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse config from TOML content (no environment applied)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(backend) = get("SUBSIDY_BACKEND") {
            self.provider.backend = backend.parse()?;
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.provider.model = model;
        }
        if let Some(base_url) = get("GEMINI_BASE_URL") {
            self.provider.base_url = base_url;
        }
        if let Some(key) = get("GEMINI_API_KEY").or_else(|| get("API_KEY")) {
            self.provider.api_key = Some(key);
        }
        Ok(())
    }

    /// API key with all but the last four characters hidden
    pub fn masked_api_key(&self) -> String {
        match self.provider.api_key.as_deref() {
            None => "(not set)".to_string(),
            Some(key) => {
                let visible: String = key
                    .chars()
                    .rev()
                    .take(4)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .collect();
                format!("****{}", visible)
            }
        }
    }
}

/// Default config override location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("subsidy").join("config.toml"))
}

fn load_config(override_path: Option<&Path>) -> Result<Config> {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(default_config_path);

    let content = match path {
        Some(ref p) if p.exists() => {
            tracing::debug!(path = %p.display(), "Loading config override");
            fs::read_to_string(p)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
        }
        Some(ref p) if override_path.is_some() => {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    provider: Option<RawProvider>,
    search: Option<RawSearch>,
    server: Option<RawServer>,
}

#[derive(Debug, Deserialize)]
struct RawProvider {
    backend: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawSearch {
    validation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
}

fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = Config::default();

    if let Some(provider) = raw.provider {
        if let Some(backend) = provider.backend {
            config.provider.backend = backend.parse()?;
        }
        if let Some(model) = provider.model {
            config.provider.model = model;
        }
        if let Some(base_url) = provider.base_url {
            config.provider.base_url = base_url;
        }
        config.provider.timeout = provider.timeout_secs.map(Duration::from_secs);
    }

    if let Some(validation) = raw.search.and_then(|s| s.validation) {
        config.validation = validation.parse()?;
    }

    if let Some(server) = raw.server {
        if let Some(host) = server.host {
            config.server.host = host;
        }
        if let Some(port) = server.port {
            config.server.port = port;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_embedded_default_parses() {
        let config = Config::from_toml_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.provider.backend, BackendKind::Gemini);
        assert_eq!(config.provider.model, DEFAULT_MODEL);
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert!(config.provider.timeout.is_none());
        assert!(config.provider.api_key.is_none());
        assert_eq!(config.validation, ValidationMode::Strict);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
[provider]
model = "gemini-2.5-flash"
timeout_secs = 90

[search]
validation = "lenient"
"#,
        )
        .unwrap();
        assert_eq!(config.provider.model, "gemini-2.5-flash");
        assert_eq!(config.provider.timeout, Some(Duration::from_secs(90)));
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.validation, ValidationMode::Lenient);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_toml_str("[provider]\nbackend = \"openai\"").is_err());
        assert!(Config::from_toml_str("[search]\nvalidation = \"loose\"").is_err());
        assert!(Config::from_toml_str("not toml =").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SUBSIDY_BACKEND", "mock"),
            ("GEMINI_MODEL", "gemini-2.5-pro"),
            ("API_KEY", "fallback-key"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.provider.backend, BackendKind::Mock);
        assert_eq!(config.provider.model, "gemini-2.5-pro");
        assert_eq!(config.provider.api_key.as_deref(), Some("fallback-key"));
    }

    #[test]
    fn test_gemini_api_key_preferred_over_api_key() {
        let env: HashMap<&str, &str> = [("GEMINI_API_KEY", "primary"), ("API_KEY", "fallback")]
            .into_iter()
            .collect();
        let mut config = Config::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.provider.api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 8080\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server.port, 8080);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(load_config(Some(&missing)), Err(Error::Config(_))));
    }

    #[test]
    fn test_masked_api_key() {
        let mut config = Config::default();
        assert_eq!(config.masked_api_key(), "(not set)");
        config.provider.api_key = Some("AIzaSyExample1234".into());
        assert_eq!(config.masked_api_key(), "****1234");
    }
}
