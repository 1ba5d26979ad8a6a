use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::debug;

use super::error::NewsApiError;
use super::types::{EverythingParams, NewsApiArticle, NewsApiResponse};

const NEWS_API_URL: &str = "https://newsapi.org/v2";

pub struct NewsApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl NewsApiClient {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, NewsApiError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.to_string(),
            base_url: NEWS_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Runs an `/everything` search and returns articles in the order the
    /// service ranked them.
    pub async fn everything(&self, params: &EverythingParams) -> Result<Vec<NewsApiArticle>, NewsApiError> {
        debug!(query = %params.q, page_size = params.page_size, "searching news");

        let response = self.client
            .get(format!("{}/everything", self.base_url))
            .header("X-Api-Key", &self.api_key)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(NewsApiError::RateLimit);
        }

        let text = response.text().await?;
        let parsed = serde_json::from_str::<NewsApiResponse>(&text);

        match parsed {
            Ok(body) if status.is_success() && body.status == "ok" => Ok(body.articles),
            Ok(body) if body.status == "error" => Err(Self::api_error(body)),
            Ok(_) if status.is_success() => {
                Err(NewsApiError::InvalidResponse(format!("unexpected payload: {}", text)))
            }
            Err(e) if status.is_success() => Err(NewsApiError::InvalidResponse(e.to_string())),
            _ if status == StatusCode::UNAUTHORIZED => Err(NewsApiError::Unauthorized(text)),
            _ => Err(NewsApiError::Status { status: status.as_u16(), body: text }),
        }
    }

    pub async fn search_forex_news(
        &self,
        base: &str,
        target: &str,
        page_size: u32,
    ) -> Result<Vec<NewsApiArticle>, NewsApiError> {
        let params = EverythingParams::new(&format!("forex {} {} exchange rate", base, target))
            .page_size(page_size);
        self.everything(&params).await
    }

    fn api_error(body: NewsApiResponse) -> NewsApiError {
        let code = body.code.unwrap_or_default();
        let message = body.message.unwrap_or_default();
        if code.starts_with("apiKey") {
            NewsApiError::Unauthorized(message)
        } else if code == "rateLimited" {
            NewsApiError::RateLimit
        } else {
            NewsApiError::ApiError { code, message }
        }
    }
}
