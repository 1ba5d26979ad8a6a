use std::time::Duration;

use common::providers::LLAMA3_70B;

pub const DEFAULT_EXCHANGE_RATE_API_URL: &str = "https://v6.exchangerate-api.com/v6";
pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_COMPLETION_API_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_NEWS_PAGE_SIZE: u32 = 3;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing API keys: {}. Please add them in your .env file.", .0.join(", "))]
    MissingKeys(Vec<&'static str>),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Credentials and endpoints for the three external services. Built once and
/// handed to each collaborator at construction.
#[derive(Debug, Clone)]
pub struct Config {
    pub exchange_rate_api_key: String,
    pub news_api_key: String,
    pub completion_api_key: String,
    pub exchange_rate_api_url: String,
    pub news_api_url: String,
    pub completion_api_url: String,
    pub completion_model: String,
    pub timeout: Duration,
    pub news_page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exchange_rate_api_key: String::new(),
            news_api_key: String::new(),
            completion_api_key: String::new(),
            exchange_rate_api_url: DEFAULT_EXCHANGE_RATE_API_URL.to_string(),
            news_api_url: DEFAULT_NEWS_API_URL.to_string(),
            completion_api_url: DEFAULT_COMPLETION_API_URL.to_string(),
            completion_model: LLAMA3_70B.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            news_page_size: DEFAULT_NEWS_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Reads the process environment. Call `dotenv().ok()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::Invalid { key: "HTTP_TIMEOUT_SECS", value: raw }),
            },
            None => defaults.timeout,
        };

        let news_page_size = match get("NEWS_PAGE_SIZE") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(size) if (1..=100).contains(&size) => size,
                _ => return Err(ConfigError::Invalid { key: "NEWS_PAGE_SIZE", value: raw }),
            },
            None => defaults.news_page_size,
        };

        Ok(Self {
            exchange_rate_api_key: get("EXCHANGE_RATE_API_KEY").unwrap_or_default(),
            news_api_key: get("NEWS_API_KEY").unwrap_or_default(),
            completion_api_key: get("GROQ_API_KEY").unwrap_or_default(),
            exchange_rate_api_url: get("EXCHANGE_RATE_API_URL").unwrap_or(defaults.exchange_rate_api_url),
            news_api_url: get("NEWS_API_URL").unwrap_or(defaults.news_api_url),
            completion_api_url: get("COMPLETION_API_URL").unwrap_or(defaults.completion_api_url),
            completion_model: get("COMPLETION_MODEL").unwrap_or(defaults.completion_model),
            timeout,
            news_page_size,
        })
    }

    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.exchange_rate_api_key.is_empty() {
            missing.push("Exchange Rate API Key");
        }
        if self.news_api_key.is_empty() {
            missing.push("News API Key");
        }
        if self.completion_api_key.is_empty() {
            missing.push("Groq API Key");
        }
        missing
    }

    pub fn ensure_credentials(&self) -> Result<(), ConfigError> {
        let missing = self.missing_keys();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingKeys(missing))
        }
    }
}
