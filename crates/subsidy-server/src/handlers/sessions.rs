//! Search session handlers
//!
//! A session keeps one form's profile and its latest search outcome between
//! API calls. The session lock is never held across the provider call:
//! `search_session` takes a ticket, releases the lock, awaits the matcher and
//! re-locks to complete. Overlapping searches resolve by ticket, latest wins.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{AppError, AppState};
use subsidy_core::{CompanyProfile, SearchSession, SearchTicket, SessionView};

/// Session timeout (30 minutes of inactivity)
const SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

const SESSION_NOT_FOUND: &str = "Session not found or expired";

/// A search session with bookkeeping for expiry
#[derive(Debug)]
struct ManagedSession {
    created_at: DateTime<Utc>,
    last_activity: Instant,
    search: SearchSession,
}

impl ManagedSession {
    fn new() -> Self {
        Self {
            created_at: Utc::now(),
            last_activity: Instant::now(),
            search: SearchSession::new(),
        }
    }

    fn is_expired(&self) -> bool {
        self.last_activity.elapsed() > SESSION_TIMEOUT
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

/// Serializable view of a session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub profile: CompanyProfile,
    pub has_searched: bool,
    /// Sequence number of the latest search
    pub sequence: u64,
    #[serde(flatten)]
    pub view: SessionView,
}

/// In-memory session manager
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, ManagedSession>>,
    counter: AtomicU64,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new session and return its ID
    pub async fn create_session(&self) -> String {
        // Unique session ID from timestamp + counter
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        let mut hasher = Sha256::new();
        hasher.update(timestamp.to_le_bytes());
        hasher.update(count.to_le_bytes());
        let session_id = format!("sub_{}", &hex::encode(hasher.finalize())[..16]);

        let mut sessions = self.sessions.write().await;

        // Clean up expired sessions while we're here
        sessions.retain(|_, s| !s.is_expired());

        sessions.insert(session_id.clone(), ManagedSession::new());
        session_id
    }

    /// Run `f` against a live session, refreshing its activity time
    async fn with_session<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut SearchSession) -> R,
    ) -> Option<R> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(session_id).filter(|s| !s.is_expired())?;
        session.touch();
        Some(f(&mut session.search))
    }

    /// Snapshot of a session (None if not found or expired)
    pub async fn snapshot(&self, session_id: &str) -> Option<SessionSnapshot> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .filter(|s| !s.is_expired())
            .map(|s| SessionSnapshot {
                id: session_id.to_string(),
                created_at: s.created_at,
                profile: s.search.profile().clone(),
                has_searched: s.search.has_searched(),
                sequence: s.search.sequence(),
                view: s.search.view(),
            })
    }

    /// Update one profile field
    pub async fn set_field(
        &self,
        session_id: &str,
        field: &str,
        value: &str,
    ) -> Option<subsidy_core::Result<CompanyProfile>> {
        self.with_session(session_id, |s| s.set_field(field, value).cloned())
            .await
    }

    /// Start a search on a session
    ///
    /// Validates the profile first; an invalid profile leaves the previous
    /// outcome in place.
    pub async fn begin_search(
        &self,
        session_id: &str,
    ) -> Option<subsidy_core::Result<SearchTicket>> {
        self.with_session(session_id, |s| -> subsidy_core::Result<SearchTicket> {
            s.profile().validate()?;
            Ok(s.begin_search())
        })
        .await
    }

    /// Complete a search; false if the session is gone or the ticket is stale
    pub async fn complete(
        &self,
        session_id: &str,
        ticket: &SearchTicket,
        outcome: Result<subsidy_core::SearchResult, subsidy_core::SearchError>,
    ) -> bool {
        self.with_session(session_id, |s| s.complete(ticket, outcome))
            .await
            .unwrap_or(false)
    }

    /// Delete a session
    pub async fn delete_session(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id).is_some()
    }

    /// Number of live sessions
    pub async fn active_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.values().filter(|s| !s.is_expired()).count()
    }
}

/// Response for a newly created session
#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub id: String,
}

/// Request to change one profile field
#[derive(Debug, Deserialize)]
pub struct FieldUpdate {
    /// Field wire name (camelCase or snake_case)
    pub field: String,
    /// Raw value; numeric fields are coerced
    #[serde(default)]
    pub value: String,
}

/// POST /api/sessions - Create a new search session
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SessionCreated>) {
    let id = state.sessions.create_session().await;
    debug!(session_id = %id, "Created search session");
    (StatusCode::CREATED, Json(SessionCreated { id }))
}

/// GET /api/sessions/:id - Current profile and results panel
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    state
        .sessions
        .snapshot(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found(SESSION_NOT_FOUND))
}

/// PATCH /api/sessions/:id/profile - Change one profile field
pub async fn update_session_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<FieldUpdate>,
) -> Result<Json<CompanyProfile>, AppError> {
    let profile = state
        .sessions
        .set_field(&id, &update.field, &update.value)
        .await
        .ok_or_else(|| AppError::not_found(SESSION_NOT_FOUND))?
        .map_err(|e| AppError::invalid_profile(&e))?;

    Ok(Json(profile))
}

/// POST /api/sessions/:id/search - Search with the session's profile
///
/// Returns the session after the search settles. If a newer search was
/// started meanwhile, this response shows that search's state instead.
pub async fn search_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let ticket = state
        .sessions
        .begin_search(&id)
        .await
        .ok_or_else(|| AppError::not_found(SESSION_NOT_FOUND))?
        .map_err(|e| AppError::invalid_profile(&e))?;

    let outcome = state.matcher.find_subsidies(&ticket.profile).await;

    if !state.sessions.complete(&id, &ticket, outcome).await {
        debug!(session_id = %id, sequence = ticket.sequence, "Search superseded");
    }

    get_session(State(state), Path(id)).await
}

/// DELETE /api/sessions/:id - Discard a session
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.sessions.delete_session(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(SESSION_NOT_FOUND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subsidy_core::{SearchError, SearchResult};

    #[tokio::test]
    async fn test_session_ids_are_unique() {
        let manager = SessionManager::new();
        let a = manager.create_session().await;
        let b = manager.create_session().await;
        assert_ne!(a, b);
        assert!(a.starts_with("sub_"));
        assert_eq!(manager.active_count().await, 2);
    }

    #[tokio::test]
    async fn test_missing_session() {
        let manager = SessionManager::new();
        assert!(manager.snapshot("nope").await.is_none());
        assert!(manager.set_field("nope", "taxId", "1").await.is_none());
        assert!(!manager.delete_session("nope").await);
    }

    #[tokio::test]
    async fn test_begin_search_requires_valid_profile() {
        let manager = SessionManager::new();
        let id = manager.create_session().await;
        let result = manager.begin_search(&id).await.unwrap();
        assert!(result.is_err());

        let snapshot = manager.snapshot(&id).await.unwrap();
        assert!(!snapshot.has_searched);
        assert_eq!(snapshot.view, SessionView::Initial);
    }

    #[tokio::test]
    async fn test_latest_ticket_wins() {
        let manager = SessionManager::new();
        let id = manager.create_session().await;
        manager.set_field(&id, "taxId", "12345678").await.unwrap().unwrap();

        let first = manager.begin_search(&id).await.unwrap().unwrap();
        let second = manager.begin_search(&id).await.unwrap().unwrap();

        assert!(
            manager
                .complete(&id, &second, Ok(SearchResult::default()))
                .await
        );
        assert!(
            !manager
                .complete(&id, &first, Err(SearchError::Unreachable))
                .await
        );

        let snapshot = manager.snapshot(&id).await.unwrap();
        assert_eq!(snapshot.view, SessionView::Empty);
        assert_eq!(snapshot.sequence, 2);
    }

    #[tokio::test]
    async fn test_complete_after_delete() {
        let manager = SessionManager::new();
        let id = manager.create_session().await;
        manager.set_field(&id, "taxId", "12345678").await.unwrap().unwrap();
        let ticket = manager.begin_search(&id).await.unwrap().unwrap();
        assert!(manager.delete_session(&id).await);
        assert!(
            !manager
                .complete(&id, &ticket, Ok(SearchResult::default()))
                .await
        );
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = SessionSnapshot {
            id: "sub_1".into(),
            created_at: Utc::now(),
            profile: CompanyProfile::default(),
            has_searched: true,
            sequence: 1,
            view: SessionView::Loading,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["state"], "loading");
        assert_eq!(json["hasSearched"], true);
        assert!(json["profile"]["taxId"].is_string());
        assert!(json["createdAt"].is_string());
    }
}
