#[derive(Debug, thiserror::Error)]
pub enum NewsApiError {
    #[error("API error ({code}): {message}")]
    ApiError { code: String, message: String },

    #[error("API key rejected: {0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
}
