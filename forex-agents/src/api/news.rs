use async_trait::async_trait;
use common::newsapi::{NewsApiArticle, NewsApiClient};
use tracing::info;

use super::NewsFetcher;
use crate::config::Config;
use crate::error::AnalysisError;
use crate::models::{CurrencyPair, NewsArticle};

pub struct NewsClient {
    api: NewsApiClient,
    page_size: u32,
}

impl NewsClient {
    pub fn new(config: &Config) -> Result<Self, AnalysisError> {
        let api = NewsApiClient::new(&config.news_api_key, config.timeout)
            .map_err(|e| AnalysisError::NewsUnavailable(e.into()))?
            .with_base_url(&config.news_api_url);

        Ok(Self { api, page_size: config.news_page_size })
    }
}

impl From<NewsApiArticle> for NewsArticle {
    fn from(article: NewsApiArticle) -> Self {
        let source = article.source_name().unwrap_or_default().to_string();
        Self {
            title: article.title.unwrap_or_default(),
            source,
            published_at: article.published_at.unwrap_or_default(),
            summary: article.description.unwrap_or_default(),
            url: article.url.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl NewsFetcher for NewsClient {
    async fn fetch_news(&self, pair: &CurrencyPair) -> Result<Vec<NewsArticle>, AnalysisError> {
        let articles = self.api
            .search_forex_news(&pair.base, &pair.target, self.page_size)
            .await
            .map_err(|e| AnalysisError::NewsUnavailable(e.into()))?;

        info!(%pair, count = articles.len(), "fetched news articles");
        Ok(articles.into_iter().map(NewsArticle::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Cause;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn client(server: &MockServer) -> NewsClient {
        let config = Config {
            news_api_key: "news-key".to_string(),
            news_api_url: server.base_url(),
            news_page_size: 5,
            ..Config::default()
        };
        NewsClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn zero_articles_is_not_an_error() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET).path("/everything").query_param("pageSize", "5");
            then.status(200).json_body(json!({ "status": "ok", "totalResults": 0, "articles": [] }));
        }).await;

        let pair = CurrencyPair::new("USD", "INR").unwrap();
        let articles = client(&server).fetch_news(&pair).await.unwrap();
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn missing_fields_degrade_to_empty_strings() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET).path("/everything");
            then.status(200).json_body(json!({
                "status": "ok",
                "articles": [
                    {
                        "source": { "name": "FXStreet" },
                        "title": "Rupee steadies",
                        "description": "The rupee held near record lows.",
                        "url": "https://example.com/rupee",
                        "publishedAt": "2024-05-17T08:00:00Z"
                    },
                    { "title": "Untitled source" }
                ]
            }));
        }).await;

        let pair = CurrencyPair::new("USD", "INR").unwrap();
        let articles = client(&server).fetch_news(&pair).await.unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].source, "FXStreet");
        assert_eq!(articles[0].summary, "The rupee held near record lows.");
        assert_eq!(articles[1], NewsArticle { title: "Untitled source".into(), ..NewsArticle::default() });
    }

    #[tokio::test]
    async fn service_failure_is_news_unavailable() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET).path("/everything");
            then.status(426).json_body(json!({
                "status": "error",
                "code": "parameterInvalid",
                "message": "bad query"
            }));
        }).await;

        let pair = CurrencyPair::new("USD", "INR").unwrap();
        let err = client(&server).fetch_news(&pair).await.unwrap_err();
        assert_eq!(
            err,
            AnalysisError::NewsUnavailable(Cause::Rejected("parameterInvalid: bad query".into()))
        );
    }

    #[tokio::test]
    async fn slow_news_service_times_out() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET).path("/everything");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({ "status": "ok", "articles": [] }));
        }).await;
        let config = Config {
            news_api_key: "news-key".to_string(),
            news_api_url: server.base_url(),
            timeout: Duration::from_millis(300),
            ..Config::default()
        };

        let pair = CurrencyPair::new("USD", "INR").unwrap();
        let err = NewsClient::new(&config).unwrap().fetch_news(&pair).await.unwrap_err();
        assert_eq!(err, AnalysisError::NewsUnavailable(Cause::Timeout));
    }
}
