//! Gemini backend implementation
//!
//! Calls the Generative Language API `generateContent` endpoint with Google
//! Search grounding and a JSON response schema.
//!
//! # Configuration
//!
//! Built from `ProviderConfig`; the API key is passed in, never read from
//! the environment here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::error::{Error, Result};

use super::types::{GenerationRequest, GenerationResponse};
use super::SearchBackend;

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini backend
///
/// # Example
///
/// ```rust,ignore
/// let backend = GeminiBackend::new(
///     "https://generativelanguage.googleapis.com",
///     "gemini-3-pro-preview",
///     Some("AIza...".into()),
/// );
/// ```
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    /// Create with an explicit request timeout
    pub fn with_timeout(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    /// Create from provider configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config.timeout {
            Some(timeout) => Self::with_timeout(
                &config.base_url,
                &config.model,
                config.api_key.clone(),
                timeout,
            ),
            None => Ok(Self::new(
                &config.base_url,
                &config.model,
                config.api_key.clone(),
            )),
        }
    }

    fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.base_url, self.model)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key {
            Some(ref key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }
}

/// generateContent request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Tool {
    pub google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
pub(crate) struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
}

/// generateContent response body (only the parts we read)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    pub content: Option<Content>,
    pub grounding_metadata: Option<GroundingMetadata>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GroundingChunk {
    pub web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WebSource {
    pub uri: Option<String>,
}

impl GenerateContentRequest {
    pub(crate) fn from_generation(request: &GenerationRequest) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(request.prompt.clone()),
                }],
            }],
            system_instruction: request.system.as_ref().map(|system| Content {
                role: None,
                parts: vec![Part {
                    text: Some(system.clone()),
                }],
            }),
            tools: if request.web_search {
                vec![Tool {
                    google_search: GoogleSearch {},
                }]
            } else {
                Vec::new()
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: request.response_schema.clone(),
            },
        }
    }
}

impl GenerateContentResponse {
    /// Flatten the first candidate into text plus grounding URIs
    pub(crate) fn into_generation(self) -> Result<GenerationResponse> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::InvalidResponse("No candidates in Gemini response".into()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            return Err(Error::InvalidResponse(format!(
                "Empty Gemini response (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        let mut grounding_sources: Vec<String> = Vec::new();
        for uri in candidate
            .grounding_metadata
            .map(|g| g.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|chunk| chunk.web.and_then(|w| w.uri))
        {
            if !grounding_sources.contains(&uri) {
                grounding_sources.push(uri);
            }
        }

        Ok(GenerationResponse {
            text,
            grounding_sources,
        })
    }
}

#[async_trait]
impl SearchBackend for GeminiBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let body = GenerateContentRequest::from_generation(request);

        let response = self
            .authorized(
                self.http_client
                    .post(format!("{}:generateContent", self.model_url())),
            )
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, model = %self.model, "Gemini request failed");
            return Err(Error::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let generation = parsed.into_generation()?;
        debug!(
            chars = generation.text.len(),
            grounding = generation.grounding_sources.len(),
            "Gemini response: {}",
            generation.text
        );
        Ok(generation)
    }

    async fn health_check(&self) -> bool {
        match self
            .authorized(self.http_client.get(self.model_url()))
            .timeout(Duration::from_secs(10))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Gemini health check failed");
                false
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
