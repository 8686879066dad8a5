//! Data provider adapters for web search, news search, market data and currency rates
//!
//! Every adapter follows the same contract: a query goes in, normalized records
//! come out, and any failure (missing credential, transport, HTTP status,
//! malformed payload) is logged and turned into an empty result.

mod alpha_vantage;
mod serpapi;
mod tavily;
mod yahoo;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};

use crate::model::{CurrencyRate, MarketSnapshot, SearchResult};

pub use alpha_vantage::AlphaVantageClient;
pub use serpapi::SerpApiNewsSearch;
pub use tavily::TavilySearch;
pub use yahoo::YahooFinanceClient;

const USER_AGENT: &str = "geopolitical-risk-agent/0.1";

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Unexpected status {0}")]
    Status(StatusCode),

    #[error("No credential configured")]
    MissingCredential,
}

/// Search adapter: query in, up to `max_results` normalized hits out, empty on failure
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short provider name for logs
    fn source(&self) -> &'static str;

    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult>;
}

/// Historical market data by ticker symbol
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Summary over `period` (e.g. `1mo`); `None` if the series is empty or the call fails
    async fn snapshot(&self, symbol: &str, period: &str) -> Option<MarketSnapshot>;
}

/// Spot exchange rates by currency pair
#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    /// Raw rate record; empty if no credential or on any failure
    async fn exchange_rate(&self, from_currency: &str, to_currency: &str) -> CurrencyRate;
}

/// Map non-success statuses to provider errors
fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::RateLimited);
    }

    if !status.is_success() {
        return Err(ProviderError::Status(status));
    }

    Ok(response)
}

/// Join a base URL and a path without doubling the slash
fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
