//! Pluggable search backend abstraction
//!
//! This module provides a backend-agnostic interface for the grounded,
//! structured-output generation call the matcher depends on.
//!
//! # Architecture
//!
//! - `SearchBackend` trait: defines the interface for all backends
//! - `SearchClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = Config::load(None)?;
//! let client = SearchClient::from_config(&config.provider)?;
//! let response = client.generate(&request).await?;
//! ```

mod gemini;
mod mock;
pub mod parsing;
pub mod types;

pub use gemini::GeminiBackend;
pub use mock::{MockBackend, MockReply, EMPTY_RESPONSE, SAMPLE_RESPONSE};
pub use types::*;

use async_trait::async_trait;

use crate::config::{BackendKind, ProviderConfig};
use crate::error::Result;

/// Trait defining the interface for all search backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one grounded generation and return the raw model text
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete search client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum SearchClient {
    /// Google Gemini (Generative Language API)
    Gemini(GeminiBackend),
    /// Mock backend for testing and offline use
    Mock(MockBackend),
}

impl SearchClient {
    /// Create a search client from provider configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config.backend {
            BackendKind::Gemini => {
                if config.api_key.is_none() {
                    tracing::warn!("No Gemini API key configured (set GEMINI_API_KEY)");
                }
                Ok(SearchClient::Gemini(GeminiBackend::from_config(config)?))
            }
            BackendKind::Mock => Ok(SearchClient::Mock(MockBackend::new())),
        }
    }

    /// Create a mock client for testing
    pub fn mock() -> Self {
        SearchClient::Mock(MockBackend::new())
    }

    /// Backend description for logs and health output
    pub fn info(&self) -> BackendInfo {
        let backend = match self {
            SearchClient::Gemini(_) => "gemini",
            SearchClient::Mock(_) => "mock",
        };
        BackendInfo {
            backend,
            model: self.model().to_string(),
            host: self.host().to_string(),
        }
    }
}

// Implement SearchBackend for SearchClient by delegating to the inner backend
#[async_trait]
impl SearchBackend for SearchClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        match self {
            SearchClient::Gemini(b) => b.generate(request).await,
            SearchClient::Mock(b) => b.generate(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            SearchClient::Gemini(b) => b.health_check().await,
            SearchClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            SearchClient::Gemini(b) => b.model(),
            SearchClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            SearchClient::Gemini(b) => b.host(),
            SearchClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_client_mock() {
        let client = SearchClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
        assert_eq!(client.info().backend, "mock");
    }

    #[test]
    fn test_from_config_gemini() {
        let config = ProviderConfig {
            api_key: Some("key".into()),
            ..Default::default()
        };
        let client = SearchClient::from_config(&config).unwrap();
        assert_eq!(client.info().backend, "gemini");
        assert_eq!(client.model(), crate::config::DEFAULT_MODEL);
    }

    #[test]
    fn test_from_config_mock() {
        let config = ProviderConfig {
            backend: BackendKind::Mock,
            ..Default::default()
        };
        assert!(matches!(
            SearchClient::from_config(&config).unwrap(),
            SearchClient::Mock(_)
        ));
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        assert!(SearchClient::mock().health_check().await);
    }
}
