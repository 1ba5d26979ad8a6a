use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use super::RateFetcher;
use crate::config::Config;
use crate::error::{AnalysisError, Cause};
use crate::models::{CurrencyPair, ExchangeRate};

const USER_AGENT: &str = concat!("forex-agents/", env!("CARGO_PKG_VERSION"));

/// ExchangeRate-API v6 `pair` endpoint.
pub struct ExchangeRateClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ExchangeRateClient {
    pub fn new(config: &Config) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AnalysisError::RateUnavailable(e.into()))?;

        Ok(Self {
            client,
            base_url: config.exchange_rate_api_url.trim_end_matches('/').to_string(),
            api_key: config.exchange_rate_api_key.clone(),
        })
    }

    async fn make_request(&self, pair: &CurrencyPair) -> Result<Value, Cause> {
        let url = format!("{}/{}/pair/{}/{}", self.base_url, self.api_key, pair.base, pair.target);
        debug!(%pair, "requesting exchange rate");

        let response = self.client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let body: Option<Value> = serde_json::from_str(&text).ok();

        // Error payloads carry `error-type` whatever the status code.
        if let Some(error_type) = body
            .as_ref()
            .filter(|b| b.get("result").and_then(Value::as_str) == Some("error"))
            .map(|b| b.get("error-type").and_then(Value::as_str).unwrap_or("unknown-error"))
        {
            return Err(match error_type {
                "invalid-key" | "inactive-account" => Cause::Auth(error_type.to_string()),
                other => Cause::Rejected(other.to_string()),
            });
        }

        if !status.is_success() {
            return Err(Cause::Status { status: status.as_u16(), body: text });
        }

        if text.trim().is_empty() {
            return Err(Cause::Empty("empty response from exchange rate service".to_string()));
        }

        body.ok_or_else(|| Cause::Parse(format!("response is not JSON: {}", text)))
    }

    fn parse_rate(pair: &CurrencyPair, body: &Value) -> Result<ExchangeRate, Cause> {
        for (field, expected) in [("base_code", &pair.base), ("target_code", &pair.target)] {
            if let Some(code) = body.get(field).and_then(Value::as_str) {
                if !code.eq_ignore_ascii_case(expected) {
                    return Err(Cause::Parse(format!(
                        "asked for {} but {} was {}",
                        pair, field, code
                    )));
                }
            }
        }

        let rate = body.get("conversion_rate")
            .and_then(Value::as_f64)
            .ok_or_else(|| Cause::Parse("missing conversion_rate".to_string()))?;

        if !rate.is_finite() || rate <= 0.0 {
            return Err(Cause::Parse(format!("conversion_rate must be positive, got {}", rate)));
        }

        Ok(ExchangeRate {
            pair: pair.clone(),
            rate,
            fetched_at: Utc::now(),
            last_updated: body.get("time_last_update_utc").and_then(Value::as_str).map(String::from),
            next_update: body.get("time_next_update_utc").and_then(Value::as_str).map(String::from),
        })
    }
}

#[async_trait]
impl RateFetcher for ExchangeRateClient {
    async fn fetch_rate(&self, pair: &CurrencyPair) -> Result<ExchangeRate, AnalysisError> {
        let body = self.make_request(pair).await.map_err(AnalysisError::RateUnavailable)?;
        let rate = Self::parse_rate(pair, &body).map_err(AnalysisError::RateUnavailable)?;
        info!(%pair, rate = rate.rate, "fetched exchange rate");
        Ok(rate)
    }
}
