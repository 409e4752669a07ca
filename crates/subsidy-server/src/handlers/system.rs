//! Catalog and health handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use subsidy_core::catalog::{self, Catalogs};
use subsidy_core::SearchBackend;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// "ok" when the search backend answers, "degraded" otherwise
    pub status: &'static str,
    pub backend: &'static str,
    pub model: String,
    pub validation: String,
    /// Live search sessions held by the JSON API
    pub sessions: usize,
}

/// GET /api/health - Server and search backend status
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    let backend = state.matcher.backend();
    let info = backend.info();
    let reachable = backend.health_check().await;

    Json(HealthStatus {
        status: if reachable { "ok" } else { "degraded" },
        backend: info.backend,
        model: info.model,
        validation: state.matcher.validation().to_string(),
        sessions: state.sessions.active_count().await,
    })
}

/// GET /api/catalog - Option lists for the profile form
pub async fn get_catalog() -> Json<Catalogs> {
    Json(catalog::catalogs())
}
