//! Search result models
//!
//! These mirror the JSON contract requested from the model. Required string
//! fields default to empty so that a lenient search can still deserialize a
//! response that omits them; strict searches reject such responses earlier
//! in `schema::validate`.

use serde::{Deserialize, Serialize};

/// Financial and environmental projection attached to a subsidy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsidyBenefitAssessment {
    /// Estimated subsidy (NTD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_subsidy_amount: Option<f64>,
    /// Budget minus estimated subsidy (NTD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_investment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payback_period_years: Option<f64>,
    /// Estimated yearly electricity saving (NTD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_cost_saving: Option<f64>,
    /// Estimated yearly reduction (tonnes CO2e)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbon_reduction_tons: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_ton_carbon_reduction: Option<f64>,
    /// Which policy formula the numbers came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_logic: Option<String>,
}

/// A matched government subsidy program
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subsidy {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub agency: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub eligibility: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    /// Official program page
    #[serde(default)]
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefit_assessment: Option<SubsidyBenefitAssessment>,
    /// 1 (weak) to 5 (exact) match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_rationale: Option<String>,
    /// Web pages consulted for this subsidy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}

impl Subsidy {
    /// Sources, skipping blank entries
    pub fn source_links(&self) -> impl Iterator<Item = &str> {
        self.sources
            .iter()
            .flatten()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// One complete search answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub subsidies: Vec<Subsidy>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Pages the provider reported as grounding, independent of what the
    /// model wrote into `sources`
    #[serde(
        default,
        rename = "groundingSources",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub grounding_sources: Vec<String>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.subsidies.is_empty()
    }
}
