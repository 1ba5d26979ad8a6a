pub mod error;
pub mod newsapi;
pub mod providers;

pub use error::ProviderError;
pub use newsapi::{NewsApiClient, NewsApiError};
pub use providers::*;
