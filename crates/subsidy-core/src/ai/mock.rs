//! Mock backend for testing
//!
//! Returns canned responses without any network access. Useful for unit
//! tests and for running the server offline (`SUBSIDY_BACKEND=mock`).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::types::{GenerationRequest, GenerationResponse};
use super::SearchBackend;

/// Canned sample answer with two programs
pub const SAMPLE_RESPONSE: &str = r#"{
  "subsidies": [
    {
      "name": "中小型能源用戶節能設備汰換補助",
      "agency": "經濟部能源署",
      "description": "補助中小型能源用戶汰換老舊空調、照明及空壓機等設備。",
      "eligibility": "契約容量 800kW 以下之服務業或製造業用戶",
      "deadline": "2025-10-31",
      "link": "https://www.energypark.org.tw/",
      "benefitAssessment": {
        "estimatedSubsidyAmount": 250000,
        "netInvestment": 750000,
        "paybackPeriodYears": 7.5,
        "annualCostSaving": 100000,
        "carbonReductionTons": 49.5,
        "calculationLogic": "政策補助 25%，1,000,000 × 0.25 = 250,000 元，低於上限 50 萬元"
      },
      "relevanceScore": 5,
      "matchingRationale": "設備類別與汰換措施皆符合公告範圍",
      "sources": ["https://www.energypark.org.tw/"]
    },
    {
      "name": "製造部門淨零轉型補助",
      "agency": "經濟部產業發展署",
      "description": "協助製造業導入能源管理與製程節能。",
      "eligibility": "依法辦理工廠登記之製造業",
      "link": "https://www.ida.gov.tw/",
      "relevanceScore": 3,
      "matchingRationale": "需搭配製程改善項目"
    }
  ],
  "recommendations": [
    "備妥近 12 個月電費單以利計算節電量",
    "補助額度有限，建議於公告後儘速送件"
  ]
}"#;

/// Canned answer with no matching program
pub const EMPTY_RESPONSE: &str = r#"{"subsidies": [], "recommendations": []}"#;

/// What the mock returns from `generate`
#[derive(Debug, Clone)]
pub enum MockReply {
    /// `SAMPLE_RESPONSE`
    Sample,
    /// `EMPTY_RESPONSE`
    Empty,
    /// Text that is not JSON
    Malformed,
    /// Transport-level failure
    Unreachable,
    /// Arbitrary raw text
    Text(String),
}

/// Mock search backend
///
/// Counts calls and remembers the last request so tests can inspect what
/// would have been sent to the provider.
#[derive(Clone)]
pub struct MockBackend {
    reply: MockReply,
    /// Whether health_check should return true
    pub healthy: bool,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<GenerationRequest>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a mock backend returning the sample answer
    pub fn new() -> Self {
        Self::with_reply(MockReply::Sample)
    }

    /// Create a mock backend with a specific reply
    pub fn with_reply(reply: MockReply) -> Self {
        Self {
            reply,
            healthy: true,
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::with_reply(MockReply::Unreachable)
        }
    }

    /// Number of `generate` calls so far (shared across clones)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        let text = match &self.reply {
            MockReply::Sample => SAMPLE_RESPONSE.to_string(),
            MockReply::Empty => EMPTY_RESPONSE.to_string(),
            MockReply::Malformed => "很抱歉，我無法提供 JSON 格式的結果。".to_string(),
            MockReply::Unreachable => {
                return Err(Error::Provider {
                    status: 503,
                    body: "mock backend unreachable".to_string(),
                })
            }
            MockReply::Text(text) => text.clone(),
        };

        Ok(GenerationResponse {
            text,
            grounding_sources: vec!["https://www.energypark.org.tw/".to_string()],
        })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> GenerationRequest {
        GenerationRequest {
            system: None,
            prompt: "p".into(),
            response_schema: json!({}),
            web_search: true,
        }
    }

    #[test]
    fn test_canned_responses_are_json() {
        serde_json::from_str::<serde_json::Value>(SAMPLE_RESPONSE).unwrap();
        serde_json::from_str::<serde_json::Value>(EMPTY_RESPONSE).unwrap();
    }

    #[tokio::test]
    async fn test_counts_calls_across_clones() {
        let mock = MockBackend::new();
        let clone = mock.clone();
        mock.generate(&request()).await.unwrap();
        clone.generate(&request()).await.unwrap();
        assert_eq!(mock.calls(), 2);
        assert_eq!(mock.last_request().unwrap().prompt, "p");
    }

    #[tokio::test]
    async fn test_unreachable_reply() {
        let mock = MockBackend::with_reply(MockReply::Unreachable);
        assert!(matches!(
            mock.generate(&request()).await,
            Err(Error::Provider { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_health() {
        assert!(MockBackend::new().health_check().await);
        assert!(!MockBackend::unhealthy().health_check().await);
    }
}
