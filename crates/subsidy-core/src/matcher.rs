//! Subsidy matcher
//!
//! Turns a `CompanyProfile` into one grounded generation request, then parses
//! and checks the answer against the response contract.
//!
//! ```text
//! CompanyProfile ──► build_prompt ──► SearchBackend::generate ──► parse + validate ──► SearchResult
//! ```
//!
//! Every failure below this layer is logged in full and collapsed into a
//! `SearchError` carrying a fixed user-facing message.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, error, info, warn};

use crate::ai::parsing::parse_search_result;
use crate::ai::{GenerationRequest, SearchBackend, SearchClient};
use crate::config::{Config, ValidationMode};
use crate::error::{Error, Result, SearchError};
use crate::models::SearchResult;
use crate::profile::{format_number, CompanyProfile};
use crate::prompts::{PromptId, PromptLibrary};
use crate::schema;

/// Prompt text ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    /// System instruction (persona)
    pub system: Option<String>,
    /// The instruction carrying the company profile
    pub user: String,
}

/// Finds subsidies for a company profile via a search backend
#[derive(Clone)]
pub struct SubsidyMatcher {
    backend: SearchClient,
    prompts: Arc<RwLock<PromptLibrary>>,
    validation: ValidationMode,
}

impl SubsidyMatcher {
    /// Create a matcher with the default prompt library and strict validation
    pub fn new(backend: SearchClient) -> Self {
        Self::with_prompts(backend, PromptLibrary::new())
    }

    /// Create a matcher with a specific prompt library
    pub fn with_prompts(backend: SearchClient, prompts: PromptLibrary) -> Self {
        Self {
            backend,
            prompts: Arc::new(RwLock::new(prompts)),
            validation: ValidationMode::default(),
        }
    }

    /// Create a matcher from resolved configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = SearchClient::from_config(&config.provider)?;
        Ok(Self::new(backend).with_validation(config.validation))
    }

    /// Set how strictly responses are checked
    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    pub fn backend(&self) -> &SearchClient {
        &self.backend
    }

    pub fn validation(&self) -> ValidationMode {
        self.validation
    }

    /// Render the search instruction for a profile
    pub fn build_prompt(&self, profile: &CompanyProfile) -> Result<RenderedPrompt> {
        let bill = format_number(profile.annual_electricity_bill);
        let budget = format_number(profile.estimated_budget);

        let mut vars = HashMap::new();
        vars.insert("industry", profile.industry.as_str());
        vars.insert("annual_electricity_bill", bill.as_str());
        vars.insert("estimated_budget", budget.as_str());
        vars.insert("equipment_type", profile.project_equipment_type.as_str());
        vars.insert("measure_type", profile.project_measure_type.as_str());
        vars.insert("implementation_time", profile.implementation_time.as_str());

        let mut prompts = self
            .prompts
            .write()
            .map_err(|_| Error::Prompt("Failed to acquire prompt library lock".into()))?;
        let template = prompts.get(PromptId::FindSubsidies)?;

        let missing = template.missing_variables(&vars);
        if !missing.is_empty() {
            warn!(missing = ?missing, "Prompt declares variables the profile does not supply");
        }

        Ok(RenderedPrompt {
            system: template.system_section().map(str::to_string),
            user: template.render_user(&vars),
        })
    }

    /// Run one search for a profile
    ///
    /// Each call issues exactly one backend request; nothing is cached.
    pub async fn find_subsidies(
        &self,
        profile: &CompanyProfile,
    ) -> std::result::Result<SearchResult, SearchError> {
        info!(
            industry = %profile.industry,
            equipment = %profile.project_equipment_type,
            model = %self.backend.model(),
            "Searching subsidies"
        );

        match self.search(profile).await {
            Ok(result) => {
                info!(
                    subsidies = result.subsidies.len(),
                    recommendations = result.recommendations.len(),
                    "Subsidy search finished"
                );
                Ok(result)
            }
            Err(Error::SchemaViolation(problems)) => {
                warn!(problems = ?problems, "Search response violates the contract");
                Err(SearchError::SchemaViolation(problems))
            }
            Err(e) => {
                error!(error = %e, host = %self.backend.host(), "Subsidy search failed");
                Err(SearchError::from(e))
            }
        }
    }

    async fn search(&self, profile: &CompanyProfile) -> Result<SearchResult> {
        let prompt = self.build_prompt(profile)?;
        debug!(prompt = %prompt.user, "Rendered search prompt");

        let request = GenerationRequest {
            system: prompt.system,
            prompt: prompt.user,
            response_schema: schema::response_schema(),
            web_search: true,
        };

        let response = self.backend.generate(&request).await?;
        let mut result = parse_search_result(&response.text, self.validation)?;
        result.grounding_sources = response.grounding_sources;
        Ok(result)
    }
}
