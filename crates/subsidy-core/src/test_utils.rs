//! Test utilities for subsidy-core
//!
//! This module provides testing infrastructure including a mock Gemini server
//! that can be used for development and integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::ai::{EMPTY_RESPONSE, SAMPLE_RESPONSE};

/// Grounding URI reported by the mock server
pub const MOCK_GROUNDING_URI: &str = "https://www.energypark.org.tw/mock";

/// How the mock server answers `generateContent`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockGeminiMode {
    /// Two-program sample result
    Sample,
    /// `{"subsidies": [], "recommendations": []}`
    Empty,
    /// Prose instead of JSON
    Malformed,
    /// HTTP 500
    ServerError,
}

/// A request the mock server received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Path segment after `/v1beta/models/`
    pub model_action: String,
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    mode: MockGeminiMode,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Mock Gemini server for testing and development
pub struct MockGeminiServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockGeminiServer {
    /// Start the mock server on an available port, answering with the sample result
    pub async fn start() -> Self {
        Self::start_with(MockGeminiMode::Sample).await
    }

    /// Start the mock server with a specific answer mode
    pub async fn start_with(mode: MockGeminiMode) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            mode,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route(
                "/v1beta/models/:model_action",
                get(handle_model).post(handle_generate),
            )
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            requests,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockGeminiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Model metadata endpoint (health check)
async fn handle_model(Path(model): Path<String>) -> Json<Value> {
    Json(json!({
        "name": format!("models/{}", model),
        "displayName": "Mock Gemini",
        "supportedGenerationMethods": ["generateContent"]
    }))
}

/// generateContent endpoint
async fn handle_generate(
    State(state): State<MockState>,
    Path(model_action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.requests.lock().unwrap().push(RecordedRequest {
        model_action: model_action.clone(),
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    if !model_action.ends_with(":generateContent") {
        return (StatusCode::NOT_FOUND, "unknown method").into_response();
    }

    let text = match state.mode {
        MockGeminiMode::Sample => SAMPLE_RESPONSE,
        MockGeminiMode::Empty => EMPTY_RESPONSE,
        MockGeminiMode::Malformed => "抱歉，目前無法完成搜尋。",
        MockGeminiMode::ServerError => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": { "code": 500, "message": "Internal error", "status": "INTERNAL" }
                })),
            )
                .into_response();
        }
    };

    Json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP",
            "groundingMetadata": {
                "webSearchQueries": ["節能補助 2025"],
                "groundingChunks": [{ "web": { "uri": MOCK_GROUNDING_URI, "title": "energypark.org.tw" } }]
            }
        }]
    }))
    .into_response()
}
