use rig::completion::CompletionError;
use thiserror::Error;

/// Failure talking to an LLM completion provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Request to provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider rejected the credentials: {0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Provider returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Provider returned an empty completion")]
    EmptyCompletion,
}

impl From<ProviderError> for CompletionError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Http(e) => CompletionError::HttpError(e),
            other => CompletionError::RequestError(Box::new(other)),
        }
    }
}
