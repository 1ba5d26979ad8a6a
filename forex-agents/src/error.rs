use common::{NewsApiError, ProviderError};
use rig::completion::{CompletionError, PromptError};
use thiserror::Error;

use crate::progress::Stage;

/// Why an external call failed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Cause {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("credentials rejected: {0}")]
    Auth(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("rejected by service: {0}")]
    Rejected(String),

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("empty result: {0}")]
    Empty(String),
}

impl From<reqwest::Error> for Cause {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Cause::Timeout
        } else if e.is_decode() {
            Cause::Parse(e.to_string())
        } else {
            Cause::Network(e.to_string())
        }
    }
}

impl From<ProviderError> for Cause {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Http(e) => e.into(),
            ProviderError::Unauthorized(body) => Cause::Auth(body),
            ProviderError::RateLimit => Cause::Rejected("rate limit exceeded".to_string()),
            ProviderError::Api { status, body } => Cause::Status { status, body },
            ProviderError::ParseError(msg) => Cause::Parse(msg),
            ProviderError::EmptyCompletion => Cause::Empty("completion contained no text".to_string()),
        }
    }
}

impl From<CompletionError> for Cause {
    fn from(e: CompletionError) -> Self {
        match e {
            CompletionError::HttpError(e) => e.into(),
            CompletionError::JsonError(e) => Cause::Parse(e.to_string()),
            CompletionError::RequestError(e) => match e.downcast::<ProviderError>() {
                Ok(provider) => (*provider).into(),
                Err(e) => Cause::Network(e.to_string()),
            },
            CompletionError::ResponseError(msg) => Cause::Parse(msg),
            other => Cause::Rejected(other.to_string()),
        }
    }
}

impl From<PromptError> for Cause {
    fn from(e: PromptError) -> Self {
        match e {
            PromptError::CompletionError(e) => e.into(),
            other => Cause::Rejected(other.to_string()),
        }
    }
}

impl From<NewsApiError> for Cause {
    fn from(e: NewsApiError) -> Self {
        match e {
            NewsApiError::ApiError { code, message } => Cause::Rejected(format!("{}: {}", code, message)),
            NewsApiError::Unauthorized(msg) => Cause::Auth(msg),
            NewsApiError::RateLimit => Cause::Rejected("rate limit exceeded".to_string()),
            NewsApiError::Status { status, body } => Cause::Status { status, body },
            NewsApiError::InvalidResponse(msg) => Cause::Parse(msg),
            NewsApiError::ReqwestError(e) => e.into(),
        }
    }
}

/// Error surfaced by a single stage.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalysisError {
    #[error("Exchange rate unavailable: {0}")]
    RateUnavailable(#[source] Cause),

    #[error("News unavailable: {0}")]
    NewsUnavailable(#[source] Cause),

    #[error("Synthesis unavailable: {0}")]
    SynthesisUnavailable(#[source] Cause),
}

impl AnalysisError {
    pub fn stage(&self) -> Stage {
        match self {
            AnalysisError::RateUnavailable(_) => Stage::Rate,
            AnalysisError::NewsUnavailable(_) => Stage::News,
            AnalysisError::SynthesisUnavailable(_) => Stage::Synthesis,
        }
    }

    pub fn cause(&self) -> &Cause {
        match self {
            AnalysisError::RateUnavailable(c)
            | AnalysisError::NewsUnavailable(c)
            | AnalysisError::SynthesisUnavailable(c) => c,
        }
    }
}

/// A failed pipeline run, tagged with the stage that was active.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    pub source: AnalysisError,
}
