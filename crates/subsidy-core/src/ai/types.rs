//! Backend request/response types
//!
//! These types are backend-agnostic and used across all backend implementations.

use serde_json::Value;

/// One structured-output generation call
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Persona / system instruction, if the prompt defines one
    pub system: Option<String>,
    /// The instruction text
    pub prompt: String,
    /// Schema the JSON answer should follow
    pub response_schema: Value,
    /// Allow the model to ground its answer with live web search
    pub web_search: bool,
}

/// Raw answer from a backend
#[derive(Debug, Clone, Default)]
pub struct GenerationResponse {
    /// Model output text (expected to be JSON)
    pub text: String,
    /// Web pages the provider reports as grounding for the answer
    pub grounding_sources: Vec<String>,
}

/// Backend description for logs and the health endpoint
#[derive(Debug, Clone)]
pub struct BackendInfo {
    pub backend: &'static str,
    pub model: String,
    pub host: String,
}
