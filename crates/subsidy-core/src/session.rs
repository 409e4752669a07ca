//! Search session state
//!
//! A session holds the form profile and the outcome of its latest search.
//! Searches are split in two so no lock is held across the network call:
//!
//! ```text
//! begin_search() ──► ticket ──► matcher.find_subsidies(ticket.profile) ──► complete(ticket, outcome)
//! ```
//!
//! Only the most recently issued ticket may complete; older responses are
//! dropped.

use serde::Serialize;

use crate::error::{Result, SearchError};
use crate::models::SearchResult;
use crate::profile::CompanyProfile;

/// Lifecycle of the latest submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    #[default]
    Idle,
    Requesting,
    Succeeded,
    Failed,
}

/// Proof of one submission, handed back to `complete`
#[derive(Debug, Clone)]
pub struct SearchTicket {
    pub sequence: u64,
    /// Profile as it was when the search started
    pub profile: CompanyProfile,
}

/// What the results panel should show
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionView {
    /// Nothing submitted yet
    Initial,
    /// A request is in flight
    Loading,
    /// The latest search failed
    Failed { message: String },
    /// Finished with no matching program
    Empty,
    /// Finished with at least one program
    Results { result: SearchResult },
}

/// One user's form and search outcome
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    profile: CompanyProfile,
    state: SearchState,
    result: Option<SearchResult>,
    error: Option<String>,
    has_searched: bool,
    sequence: u64,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a filled-in profile
    pub fn with_profile(profile: CompanyProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    pub fn profile(&self) -> &CompanyProfile {
        &self.profile
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn result(&self) -> Option<&SearchResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_searched(&self) -> bool {
        self.has_searched
    }

    /// Sequence number of the latest ticket (0 before any search)
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Update one profile field by its wire name
    ///
    /// On error the profile is left unchanged.
    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<&CompanyProfile> {
        self.profile = self.profile.set_field_by_name(name, raw)?;
        Ok(&self.profile)
    }

    /// Start a new search, clearing the previous outcome
    pub fn begin_search(&mut self) -> SearchTicket {
        self.result = None;
        self.error = None;
        self.state = SearchState::Requesting;
        self.has_searched = true;
        self.sequence += 1;

        SearchTicket {
            sequence: self.sequence,
            profile: self.profile.clone(),
        }
    }

    /// Apply a search outcome
    ///
    /// Returns `false` (and changes nothing) when a newer search has been
    /// started since `ticket` was issued.
    pub fn complete(
        &mut self,
        ticket: &SearchTicket,
        outcome: std::result::Result<SearchResult, SearchError>,
    ) -> bool {
        if ticket.sequence != self.sequence {
            tracing::debug!(
                ticket = ticket.sequence,
                latest = self.sequence,
                "Discarding stale search response"
            );
            return false;
        }

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.error = None;
                self.state = SearchState::Succeeded;
            }
            Err(e) => {
                self.result = None;
                self.error = Some(e.user_message().to_string());
                self.state = SearchState::Failed;
            }
        }
        true
    }

    /// Current panel content
    pub fn view(&self) -> SessionView {
        match self.state {
            SearchState::Idle => SessionView::Initial,
            SearchState::Requesting => SessionView::Loading,
            SearchState::Failed => SessionView::Failed {
                message: self.error.clone().unwrap_or_default(),
            },
            SearchState::Succeeded => match &self.result {
                Some(result) if !result.is_empty() => SessionView::Results {
                    result: result.clone(),
                },
                _ => SessionView::Empty,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SEARCH_UNREACHABLE_MESSAGE;
    use crate::models::Subsidy;

    fn one_result() -> SearchResult {
        SearchResult {
            subsidies: vec![Subsidy {
                name: "A".into(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_initial_view() {
        let session = SearchSession::new();
        assert_eq!(session.view(), SessionView::Initial);
        assert!(!session.has_searched());
        assert_eq!(session.sequence(), 0);
    }

    #[test]
    fn test_set_field_changes_only_that_field() {
        let mut session = SearchSession::new();
        let before = session.profile().clone();
        session.set_field("estimatedBudget", "1,200,000").unwrap();

        assert_eq!(session.profile().estimated_budget, 1_200_000.0);
        let restored = CompanyProfile {
            estimated_budget: before.estimated_budget,
            ..session.profile().clone()
        };
        assert_eq!(restored, before);
    }

    #[test]
    fn test_set_field_error_keeps_profile() {
        let mut session = SearchSession::new();
        assert!(session.set_field("annualElectricityBill", "abc").is_err());
        assert!(session.set_field("nope", "1").is_err());
        assert_eq!(session.profile(), &CompanyProfile::default());
    }

    #[test]
    fn test_begin_search_clears_previous_outcome() {
        let mut session = SearchSession::new();
        let ticket = session.begin_search();
        assert!(session.complete(&ticket, Ok(one_result())));
        assert!(session.result().is_some());

        let ticket = session.begin_search();
        assert!(session.result().is_none());
        assert!(session.error().is_none());
        assert_eq!(session.view(), SessionView::Loading);
        assert_eq!(ticket.sequence, 2);

        assert!(session.complete(&ticket, Err(SearchError::Unreachable)));
        session.begin_search();
        assert!(session.error().is_none());
        assert_eq!(session.state(), SearchState::Requesting);
    }

    #[test]
    fn test_views_after_completion() {
        let mut session = SearchSession::new();

        let ticket = session.begin_search();
        session.complete(&ticket, Ok(SearchResult::default()));
        assert_eq!(session.view(), SessionView::Empty);

        let ticket = session.begin_search();
        session.complete(&ticket, Ok(one_result()));
        assert!(matches!(session.view(), SessionView::Results { .. }));

        let ticket = session.begin_search();
        session.complete(&ticket, Err(SearchError::Unreachable));
        assert_eq!(
            session.view(),
            SessionView::Failed {
                message: SEARCH_UNREACHABLE_MESSAGE.to_string()
            }
        );
        assert!(session.result().is_none());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut session = SearchSession::new();
        let first = session.begin_search();
        let second = session.begin_search();

        assert!(session.complete(&second, Ok(SearchResult::default())));
        assert!(!session.complete(&first, Ok(one_result())));
        assert_eq!(session.view(), SessionView::Empty);
    }

    #[test]
    fn test_stale_response_does_not_end_loading() {
        let mut session = SearchSession::new();
        let first = session.begin_search();
        let _second = session.begin_search();

        assert!(!session.complete(&first, Err(SearchError::Unreachable)));
        assert_eq!(session.view(), SessionView::Loading);
    }

    #[test]
    fn test_ticket_snapshots_profile() {
        let mut session = SearchSession::new();
        session.set_field("taxId", "12345678").unwrap();
        let ticket = session.begin_search();
        session.set_field("taxId", "87654321").unwrap();
        assert_eq!(ticket.profile.tax_id, "12345678");
    }

    #[test]
    fn test_view_serializes_with_state_tag() {
        let json = serde_json::to_value(SessionView::Failed {
            message: "x".into(),
        })
        .unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["message"], "x");
    }
}
