//! JSON parsing helpers for backend responses
//!
//! Models sometimes wrap the JSON payload in a code fence or stray text even
//! when JSON output is requested, so the object is located first.

use serde_json::Value;

use crate::config::ValidationMode;
use crate::error::{Error, Result};
use crate::models::SearchResult;
use crate::schema;

/// Maximum raw text echoed into error messages
const RAW_PREVIEW_LEN: usize = 200;

/// Locate the outermost JSON object in a model response
pub fn extract_json(response: &str) -> Result<&str> {
    let response = response.trim();
    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(&response[s..=e]),
        _ => Err(Error::InvalidResponse(format!(
            "No JSON found in response | Raw: {}",
            preview(response)
        ))),
    }
}

/// Parse a search result from raw model text
///
/// In strict mode the parsed JSON must satisfy `schema::validate`; in lenient
/// mode anything that parses as a JSON object is accepted and missing fields
/// fall back to their defaults.
pub fn parse_search_result(response: &str, mode: ValidationMode) -> Result<SearchResult> {
    let json_str = extract_json(response)?;
    let value: Value = serde_json::from_str(json_str)?;

    if mode == ValidationMode::Strict {
        let problems = schema::validate(&value);
        if !problems.is_empty() {
            return Err(Error::SchemaViolation(problems));
        }
    }

    match serde_json::from_value::<SearchResult>(value) {
        Ok(result) => Ok(result),
        Err(e) if mode == ValidationMode::Lenient => {
            // Shape is too far off to map onto the result model; keep what we can
            tracing::warn!(error = %e, "Lenient parse fell back to partial result");
            lenient_fallback(json_str)
        }
        Err(e) => Err(Error::Json(e)),
    }
}

/// Salvage the parts of a malformed-but-parseable response that still fit
fn lenient_fallback(json_str: &str) -> Result<SearchResult> {
    let value: Value = serde_json::from_str(json_str)?;
    let subsidies = value
        .get("subsidies")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default();
    let recommendations = value
        .get("recommendations")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|r| r.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    Ok(SearchResult {
        subsidies,
        recommendations,
        grounding_sources: Vec::new(),
    })
}

fn preview(text: &str) -> String {
    if text.chars().count() > RAW_PREVIEW_LEN {
        let truncated: String = text.chars().take(RAW_PREVIEW_LEN).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}
