//! Error types for the subsidy matcher

use thiserror::Error;

/// Message shown to the user for every transport, provider or JSON failure.
pub const SEARCH_UNREACHABLE_MESSAGE: &str = "無法連接聯網搜尋，請確認網路環境或 API 金鑰權限。";

/// Message shown when the provider answered with JSON that breaks the contract.
pub const SCHEMA_VIOLATION_MESSAGE: &str = "搜尋結果格式不符，請稍後再試一次。";

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Provider error {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Response violates schema: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Unknown profile field: {0}")]
    UnknownField(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt error: {0}")]
    Prompt(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// User-facing search failure
///
/// Every cause below the matcher collapses into one of these two kinds.
/// The display string is the fixed message shown in the results panel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("{}", SEARCH_UNREACHABLE_MESSAGE)]
    Unreachable,

    #[error("{}", SCHEMA_VIOLATION_MESSAGE)]
    SchemaViolation(Vec<String>),
}

impl SearchError {
    /// The fixed message for this error kind
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unreachable => SEARCH_UNREACHABLE_MESSAGE,
            Self::SchemaViolation(_) => SCHEMA_VIOLATION_MESSAGE,
        }
    }
}

impl From<Error> for SearchError {
    fn from(err: Error) -> Self {
        match err {
            Error::SchemaViolation(problems) => Self::SchemaViolation(problems),
            _ => Self::Unreachable,
        }
    }
}
