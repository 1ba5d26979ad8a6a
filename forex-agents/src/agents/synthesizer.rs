use std::time::Duration;

use async_trait::async_trait;
use common::providers::{GroqClient, GroqCompletionModel};
use rig::{agent::Agent, completion::Prompt};
use tracing::{debug, info};

use super::ReportSynthesizer;
use crate::config::Config;
use crate::error::{AnalysisError, Cause};
use crate::models::{CurrencyPair, ExchangeRate, NewsArticle};

pub const ANALYST_PREAMBLE: &str = r#"
You are an expert Forex Data Analyst and report writer 💹
You turn exchange rate data and recent news into clear, concise reports
that are professional but accessible to non-experts.

Guidelines:
- Stay factual and grounded in the data provided
- Quote the exchange rate exactly as given
- Use Markdown headings, bullet points and clear sections
"#;

const TEMPERATURE: f64 = 0.3;
const MAX_DIGEST_ARTICLES: usize = 10;
const MAX_SUMMARY_CHARS: usize = 300;
const MAX_DIGEST_CHARS: usize = 4000;

pub struct LlmReportSynthesizer {
    agent: Agent<GroqCompletionModel>,
    timeout: Duration,
}

impl LlmReportSynthesizer {
    pub fn new(config: &Config) -> Result<Self, AnalysisError> {
        let client = GroqClient::new(&config.completion_api_key, config.timeout)
            .map_err(|e| AnalysisError::SynthesisUnavailable(e.into()))?
            .with_base_url(&config.completion_api_url);

        let agent = client
            .agent(&config.completion_model)
            .preamble(ANALYST_PREAMBLE)
            .temperature(TEMPERATURE)
            .build();

        Ok(Self { agent, timeout: config.timeout })
    }
}

#[async_trait]
impl ReportSynthesizer for LlmReportSynthesizer {
    async fn synthesize(
        &self,
        rate: &ExchangeRate,
        articles: &[NewsArticle],
        pair: &CurrencyPair,
    ) -> Result<String, AnalysisError> {
        let prompt = build_prompt(rate, articles, pair);
        debug!(%pair, prompt_chars = prompt.chars().count(), "requesting narrative");

        let narrative = tokio::time::timeout(self.timeout, self.agent.prompt(prompt.as_str()))
            .await
            .map_err(|_| AnalysisError::SynthesisUnavailable(Cause::Timeout))?
            .map_err(|e| AnalysisError::SynthesisUnavailable(e.into()))?;

        // Blank narratives never reach a report.
        if narrative.trim().is_empty() {
            return Err(AnalysisError::SynthesisUnavailable(Cause::Empty(
                "completion contained no text".to_string(),
            )));
        }

        info!(%pair, chars = narrative.len(), "narrative generated");
        Ok(narrative)
    }
}

/// Composes the analysis prompt. The pair and rate are always included in
/// full; only the article digest is condensed to keep the prompt bounded.
pub fn build_prompt(rate: &ExchangeRate, articles: &[NewsArticle], pair: &CurrencyPair) -> String {
    let as_of = rate.fetched_at.format("%B %d, %Y");
    let last_updated = rate.last_updated.as_deref().unwrap_or("unknown");
    let next_update = rate.next_update.as_deref().unwrap_or("unknown");
    let digest = news_digest(articles);

    format!(
        "Please analyze the currency pair {pair} ({base} to {target}) as of {as_of}.\n\n\
         ## EXCHANGE RATE\n\
         1 {base} = {rate} {target}\n\
         Last updated: {last_updated}\n\
         Next update: {next_update}\n\n\
         ## RECENT NEWS\n\
         {digest}\n\n\
         Your report should include:\n\
         1. A clear title and introduction\n\
         2. The current exchange rate with time of update\n\
         3. Summary of key news (as bullet points)\n\
         4. Analysis of current trends and sentiment\n\
         5. Factors that might influence short-term movement (1 week outlook)\n\
         6. Conclusion with key takeaways\n",
        pair = pair,
        base = pair.base,
        target = pair.target,
        as_of = as_of,
        rate = rate.rate,
        last_updated = last_updated,
        next_update = next_update,
        digest = digest,
    )
}

fn news_digest(articles: &[NewsArticle]) -> String {
    if articles.is_empty() {
        return "No relevant news articles were found.".to_string();
    }

    let mut digest = String::new();
    for article in articles.iter().take(MAX_DIGEST_ARTICLES) {
        let mut line = format!("- {}", if article.title.is_empty() { "(untitled)" } else { article.title.as_str() });
        if !article.source.is_empty() || !article.published_at.is_empty() {
            line.push_str(&format!(" ({}, {})", article.source, article.published_at));
        }
        if !article.summary.is_empty() {
            line.push_str(": ");
            line.push_str(&clip(&article.summary, MAX_SUMMARY_CHARS));
        }
        line.push('\n');

        if digest.chars().count() + line.chars().count() > MAX_DIGEST_CHARS {
            let room = MAX_DIGEST_CHARS.saturating_sub(digest.chars().count());
            digest.push_str(&clip(&line, room));
            break;
        }
        digest.push_str(&line);
    }
    digest.trim_end().to_string()
}

/// Shortens to at most `max` chars, marking the cut with an ellipsis.
fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut clipped: String = text.chars().take(max - 1).collect();
    clipped.push('…');
    clipped
}
