pub mod agents;
pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod routes;

// Re-export main components
pub use agents::{LlmReportSynthesizer, ReportSynthesizer};
pub use api::{ExchangeRateClient, NewsClient, NewsFetcher, RateFetcher};
pub use config::{Config, ConfigError};
pub use error::{AnalysisError, Cause, PipelineError};
pub use models::{AnalysisReport, CurrencyPair, ExchangeRate, NewsArticle, PairError};
pub use pipeline::AnalysisPipeline;
pub use progress::{
    ChannelProgress, CollectingProgress, NoProgress, PipelineState, ProgressEvent, ProgressSink,
    Stage, StageStatus, TracingProgress,
};
