//! Subsidy Core Library
//!
//! Shared functionality for the energy-saving subsidy matcher:
//! - Company profile collection and validation
//! - Fixed option catalogs for the profile form
//! - Pluggable grounded-search backends (Gemini, mock)
//! - Prompt library for the customizable search instruction
//! - Response schema and post-parse validation
//! - Search sessions with stale-response protection
//! - Display formatting shared by the server and CLI

pub mod ai;
pub mod catalog;
pub mod config;
pub mod display;
pub mod error;
pub mod matcher;
pub mod models;
pub mod profile;
pub mod prompts;
pub mod schema;
pub mod session;

/// Test utilities including mock Gemini server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    BackendInfo, GeminiBackend, GenerationRequest, GenerationResponse, MockBackend, MockReply,
    SearchBackend, SearchClient,
};
pub use catalog::Catalogs;
pub use config::{BackendKind, Config, ValidationMode};
pub use error::{Error, Result, SearchError};
pub use matcher::{RenderedPrompt, SubsidyMatcher};
pub use models::{SearchResult, Subsidy, SubsidyBenefitAssessment};
pub use profile::{CompanyProfile, FieldKind, ProfileField};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary, PromptSource};
pub use session::{SearchSession, SearchState, SearchTicket, SessionView};
