use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAJOR_CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "JPY", "AUD", "CAD", "CHF", "NZD"];
pub const EMERGING_CURRENCIES: &[&str] = &["INR", "CNY", "BRL", "ZAR", "MXN", "RUB", "TRY", "SGD"];

/// All supported currency codes, sorted.
pub fn supported_currencies() -> Vec<&'static str> {
    let mut all: Vec<&str> = MAJOR_CURRENCIES.iter().chain(EMERGING_CURRENCIES).copied().collect();
    all.sort_unstable();
    all
}

pub fn is_supported(code: &str) -> bool {
    MAJOR_CURRENCIES.contains(&code) || EMERGING_CURRENCIES.contains(&code)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PairError {
    #[error("Unsupported currency code: {0}")]
    UnsupportedCurrency(String),

    #[error("Currency pair should be in format 'XXX/YYY' (e.g. 'USD/INR'), got '{0}'")]
    InvalidFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: String,
    pub target: String,
}

impl CurrencyPair {
    pub fn new(base: &str, target: &str) -> Result<Self, PairError> {
        let base = normalize(base)?;
        let target = normalize(target)?;
        if base == target {
            tracing::warn!(currency = %base, "base and target currency are identical");
        }
        Ok(Self { base, target })
    }

    /// `BASE_TARGET`, used in file names.
    pub fn slug(&self) -> String {
        format!("{}_{}", self.base, self.target)
    }
}

fn normalize(code: &str) -> Result<String, PairError> {
    let code = code.trim().to_ascii_uppercase();
    if is_supported(&code) {
        Ok(code)
    } else {
        Err(PairError::UnsupportedCurrency(code))
    }
}

impl FromStr for CurrencyPair {
    type Err = PairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((base, target)) => Self::new(base, target),
            None => Err(PairError::InvalidFormat(s.to_string())),
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.target)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub pair: CurrencyPair,
    pub rate: f64,
    pub fetched_at: DateTime<Utc>,
    /// Provider's own last-update stamp, verbatim.
    pub last_updated: Option<String>,
    pub next_update: Option<String>,
}

impl ExchangeRate {
    /// Converts an amount of base currency into the target currency.
    pub fn convert(&self, amount: f64) -> f64 {
        amount * self.rate
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub source: String,
    pub published_at: String,
    pub summary: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub pair: CurrencyPair,
    pub rate: ExchangeRate,
    pub articles: Vec<NewsArticle>,
    pub narrative: String,
    pub generated_at: DateTime<Utc>,
}
