use async_trait::async_trait;

use crate::error::AnalysisError;
use crate::models::{CurrencyPair, ExchangeRate, NewsArticle};

pub mod synthesizer;

pub use synthesizer::{build_prompt, LlmReportSynthesizer, ANALYST_PREAMBLE};

/// Turns collected market data into a narrative. Implementations must fail
/// rather than return blank text.
#[async_trait]
pub trait ReportSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        rate: &ExchangeRate,
        articles: &[NewsArticle],
        pair: &CurrencyPair,
    ) -> Result<String, AnalysisError>;
}
