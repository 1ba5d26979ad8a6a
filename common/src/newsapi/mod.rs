mod client;
mod error;
mod types;

pub use client::NewsApiClient;
pub use error::NewsApiError;
pub use types::{ArticleSource, EverythingParams, NewsApiArticle, NewsApiResponse};
