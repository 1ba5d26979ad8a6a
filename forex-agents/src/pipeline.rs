use std::future::Future;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use crate::agents::{LlmReportSynthesizer, ReportSynthesizer};
use crate::api::{ExchangeRateClient, NewsClient, NewsFetcher, RateFetcher};
use crate::config::Config;
use crate::error::{AnalysisError, PipelineError};
use crate::models::{AnalysisReport, CurrencyPair};
use crate::progress::{NoProgress, PipelineState, ProgressEvent, ProgressSink, Stage, StageStatus};

/// Runs rate fetch, news fetch and synthesis in that order and assembles the
/// report. Holds no per-run state, so one pipeline can serve concurrent runs.
pub struct AnalysisPipeline {
    rates: Box<dyn RateFetcher>,
    news: Box<dyn NewsFetcher>,
    synthesizer: Box<dyn ReportSynthesizer>,
}

impl AnalysisPipeline {
    pub fn new(
        rates: impl RateFetcher + 'static,
        news: impl NewsFetcher + 'static,
        synthesizer: impl ReportSynthesizer + 'static,
    ) -> Self {
        Self {
            rates: Box::new(rates),
            news: Box::new(news),
            synthesizer: Box::new(synthesizer),
        }
    }

    /// Wires the HTTP-backed collaborators from configuration.
    pub fn from_config(config: &Config) -> Result<Self, AnalysisError> {
        Ok(Self::new(
            ExchangeRateClient::new(config)?,
            NewsClient::new(config)?,
            LlmReportSynthesizer::new(config)?,
        ))
    }

    pub async fn run_analysis(&self, pair: &CurrencyPair) -> Result<AnalysisReport, PipelineError> {
        self.run_with_progress(pair, &NoProgress).await
    }

    pub async fn run_with_progress(
        &self,
        pair: &CurrencyPair,
        progress: &dyn ProgressSink,
    ) -> Result<AnalysisReport, PipelineError> {
        info!(%pair, "starting analysis");
        let started = Instant::now();
        let mut run = Run::new(progress);

        let rate = run.stage(Stage::Rate, self.rates.fetch_rate(pair)).await?;
        let articles = run.stage(Stage::News, self.news.fetch_news(pair)).await?;
        let narrative = run
            .stage(Stage::Synthesis, self.synthesizer.synthesize(&rate, &articles, pair))
            .await?;

        let report = AnalysisReport {
            pair: pair.clone(),
            rate,
            articles,
            narrative,
            generated_at: Utc::now(),
        };
        run.advance(PipelineState::Complete);

        info!(%pair, elapsed_ms = started.elapsed().as_millis() as u64, "analysis complete");
        Ok(report)
    }
}

/// State machine for a single run.
struct Run<'a> {
    state: PipelineState,
    sink: &'a dyn ProgressSink,
}

impl<'a> Run<'a> {
    fn new(sink: &'a dyn ProgressSink) -> Self {
        Self { state: PipelineState::Idle, sink }
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        self.sink.on_event(&ProgressEvent::Transition { from: self.state, to: next });
        self.state = next;
    }

    async fn stage<T, F>(&mut self, stage: Stage, work: F) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, AnalysisError>>,
    {
        self.advance(stage.state());
        self.sink.on_event(&ProgressEvent::Stage { stage, status: StageStatus::Started });
        let started = Instant::now();

        match work.await {
            Ok(value) => {
                self.sink.on_event(&ProgressEvent::Stage { stage, status: StageStatus::Completed });
                info!(%stage, elapsed_ms = started.elapsed().as_millis() as u64, "stage completed");
                Ok(value)
            }
            Err(source) => {
                self.sink.on_event(&ProgressEvent::Stage { stage, status: StageStatus::Failed });
                self.advance(PipelineState::Failed);
                warn!(%stage, error = %source, "stage failed, aborting run");
                Err(PipelineError { stage, source })
            }
        }
    }
}
