//! Subsidy Web Server
//!
//! Axum-based server for the energy-saving subsidy matcher: a server-rendered
//! profile form with result cards, plus a JSON API.
//!
//! Security features:
//! - Security headers (nosniff, frame deny, CSP without scripts)
//! - All model-provided text HTML-escaped before rendering
//! - Sanitized error responses (provider errors are logged, never returned)
//!
//! There is no authentication: this is a single-user local tool and binds to
//! 127.0.0.1 by default.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{info, warn};

use subsidy_core::{Config, SearchBackend, SearchError, SubsidyMatcher};

mod handlers;
pub mod views;

pub use handlers::SessionManager;

/// Shared application state
pub struct AppState {
    pub matcher: SubsidyMatcher,
    /// In-memory search sessions for the JSON API
    pub sessions: SessionManager,
}

/// Create the application router
pub fn create_router(matcher: SubsidyMatcher) -> Router {
    let info = matcher.backend().info();
    info!(
        "Search backend configured: {} (model: {}, validation: {})",
        info.host,
        info.model,
        matcher.validation()
    );

    let state = Arc::new(AppState {
        matcher,
        sessions: SessionManager::new(),
    });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/catalog", get(handlers::get_catalog))
        .route("/search", post(handlers::api_search))
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/sessions/:id/profile", patch(handlers::update_session_profile))
        .route("/sessions/:id/search", post(handlers::search_session));

    // Security headers
    // CSP: the page is plain HTML forms, no scripts at all; inline styles only
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'none'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; form-action 'self'; frame-ancestors 'none'",
    );

    Router::new()
        .route("/", get(handlers::index))
        .route("/search", post(handlers::form_search))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ))
}

/// Start the server on the configured host and port
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let matcher =
        SubsidyMatcher::from_config(&config).context("Failed to create search backend")?;

    check_backend_connection(&matcher).await;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = create_router(matcher);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log search backend connection status
async fn check_backend_connection(matcher: &SubsidyMatcher) {
    let backend = matcher.backend();
    if backend.health_check().await {
        info!(
            "✅ Search backend reachable: {} (model: {})",
            backend.host(),
            backend.model()
        );
    } else {
        warn!(
            "⚠️  Search backend not responding: {} (model: {}); check GEMINI_API_KEY",
            backend.host(),
            backend.model()
        );
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Error response with its HTTP status and the user-facing message
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
        }
    }

    /// Map a failed search to its status and fixed message
    pub fn search(err: &SearchError) -> Self {
        let status = match err {
            SearchError::Unreachable => StatusCode::BAD_GATEWAY,
            SearchError::SchemaViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self {
            status,
            message: err.user_message().to_string(),
        }
    }

    /// Map a rejected profile edit or submission to 400
    pub fn invalid_profile(err: &subsidy_core::Error) -> Self {
        Self::bad_request(&profile_error_message(err))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// User-facing text for a profile error
pub fn profile_error_message(err: &subsidy_core::Error) -> String {
    match err {
        subsidy_core::Error::InvalidProfile(msg) => msg.clone(),
        subsidy_core::Error::UnknownField(name) => format!("未知的欄位: {}", name),
        other => other.to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}
