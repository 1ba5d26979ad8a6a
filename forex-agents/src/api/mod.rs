use async_trait::async_trait;

use crate::error::AnalysisError;
use crate::models::{CurrencyPair, ExchangeRate, NewsArticle};

pub mod exchange_rate;
pub mod news;

pub use exchange_rate::ExchangeRateClient;
pub use news::NewsClient;

/// Retrieves the current exchange rate for a pair. One attempt per call.
#[async_trait]
pub trait RateFetcher: Send + Sync {
    async fn fetch_rate(&self, pair: &CurrencyPair) -> Result<ExchangeRate, AnalysisError>;
}

/// Retrieves recent news for a pair, in the order the service ranks them.
/// An empty list is a valid answer.
#[async_trait]
pub trait NewsFetcher: Send + Sync {
    async fn fetch_news(&self, pair: &CurrencyPair) -> Result<Vec<NewsArticle>, AnalysisError>;
}
