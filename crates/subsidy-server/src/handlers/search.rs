//! Stateless JSON search

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{AppError, AppState};
use subsidy_core::{CompanyProfile, SearchResult};

/// POST /api/search - Run one search for a profile
pub async fn api_search(
    State(state): State<Arc<AppState>>,
    Json(profile): Json<CompanyProfile>,
) -> Result<Json<SearchResult>, AppError> {
    profile
        .validate()
        .map_err(|e| AppError::invalid_profile(&e))?;

    let result = state
        .matcher
        .find_subsidies(&profile)
        .await
        .map_err(|e| AppError::search(&e))?;

    Ok(Json(result))
}
