#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use forex_agents::{
    AnalysisError, Cause, CurrencyPair, ExchangeRate, NewsArticle, NewsFetcher, RateFetcher,
    ReportSynthesizer,
};

/// Counts calls so tests can check which stages actually ran.
#[derive(Clone, Default)]
pub struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct StubRates {
    rates: HashMap<String, f64>,
    failure: Option<Cause>,
    delay: Duration,
    pub calls: Calls,
}

impl StubRates {
    pub fn with_rates(rates: &[(&str, f64)]) -> Self {
        Self {
            rates: rates.iter().map(|(pair, rate)| (pair.to_string(), *rate)).collect(),
            failure: None,
            delay: Duration::ZERO,
            calls: Calls::default(),
        }
    }

    pub fn failing(cause: Cause) -> Self {
        Self { failure: Some(cause), ..Self::with_rates(&[]) }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl RateFetcher for StubRates {
    async fn fetch_rate(&self, pair: &CurrencyPair) -> Result<ExchangeRate, AnalysisError> {
        self.calls.hit();
        tokio::time::sleep(self.delay).await;
        if let Some(cause) = &self.failure {
            return Err(AnalysisError::RateUnavailable(cause.clone()));
        }
        let rate = self.rates.get(&pair.to_string()).copied().ok_or_else(|| {
            AnalysisError::RateUnavailable(Cause::Rejected("unsupported-code".to_string()))
        })?;
        Ok(ExchangeRate {
            pair: pair.clone(),
            rate,
            fetched_at: Utc::now(),
            last_updated: None,
            next_update: None,
        })
    }
}

pub struct StubNews {
    count: usize,
    failure: Option<Cause>,
    delay: Duration,
    pub calls: Calls,
}

impl StubNews {
    /// Returns `count` articles whose titles name the requested pair.
    pub fn articles(count: usize) -> Self {
        Self { count, failure: None, delay: Duration::ZERO, calls: Calls::default() }
    }

    pub fn failing(cause: Cause) -> Self {
        Self { failure: Some(cause), ..Self::articles(0) }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl NewsFetcher for StubNews {
    async fn fetch_news(&self, pair: &CurrencyPair) -> Result<Vec<NewsArticle>, AnalysisError> {
        self.calls.hit();
        tokio::time::sleep(self.delay).await;
        if let Some(cause) = &self.failure {
            return Err(AnalysisError::NewsUnavailable(cause.clone()));
        }
        Ok((0..self.count)
            .map(|i| NewsArticle {
                title: format!("{} story {}", pair, i),
                source: "Stub Wire".to_string(),
                ..NewsArticle::default()
            })
            .collect())
    }
}

pub enum SynthReply {
    Fixed(String),
    /// Echoes the inputs so tests can see what reached the synthesizer.
    Echo,
    Fail(Cause),
}

pub struct StubSynth {
    reply: SynthReply,
    pub calls: Calls,
}

impl StubSynth {
    pub fn fixed(text: &str) -> Self {
        Self { reply: SynthReply::Fixed(text.to_string()), calls: Calls::default() }
    }

    pub fn echo() -> Self {
        Self { reply: SynthReply::Echo, calls: Calls::default() }
    }

    pub fn failing(cause: Cause) -> Self {
        Self { reply: SynthReply::Fail(cause), calls: Calls::default() }
    }
}

#[async_trait]
impl ReportSynthesizer for StubSynth {
    async fn synthesize(
        &self,
        rate: &ExchangeRate,
        articles: &[NewsArticle],
        pair: &CurrencyPair,
    ) -> Result<String, AnalysisError> {
        self.calls.hit();
        match &self.reply {
            SynthReply::Fixed(text) => Ok(text.clone()),
            SynthReply::Echo => Ok(format!("{} at {} with {} articles", pair, rate.rate, articles.len())),
            SynthReply::Fail(cause) => Err(AnalysisError::SynthesisUnavailable(cause.clone())),
        }
    }
}
