//! Yahoo Finance chart API: daily closes and volumes for a ticker

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{check_status, endpoint, MarketDataProvider, ProviderError, USER_AGENT};
use crate::model::MarketSnapshot;

pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl YahooFinanceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, symbol: &str, period: &str) -> Result<Option<MarketSnapshot>, ProviderError> {
        let url = endpoint(&self.base_url, &format!("v8/finance/chart/{symbol}"));

        tracing::debug!(symbol = %symbol, period = %period, "Fetching price history");

        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .query(&[("range", period), ("interval", "1d")])
            .send()
            .await?;

        let payload: ChartResponse = check_status(response)?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        summarize(payload)
    }
}

fn summarize(payload: ChartResponse) -> Result<Option<MarketSnapshot>, ProviderError> {
    if let Some(error) = payload.chart.error {
        return Err(ProviderError::ParseError(format!(
            "{}: {}",
            error.code, error.description
        )));
    }

    let Some(quote) = payload
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .and_then(|result| result.indicators.quote.into_iter().next())
    else {
        return Ok(None);
    };

    // Non-trading days come back as nulls
    let closes: Vec<f64> = quote.close.into_iter().flatten().collect();
    let volumes: Vec<f64> = quote.volume.into_iter().flatten().collect();

    Ok(MarketSnapshot::from_series(&closes, &volumes))
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    async fn snapshot(&self, symbol: &str, period: &str) -> Option<MarketSnapshot> {
        match self.fetch(symbol, period).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "Error getting financial data");
                None
            }
        }
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new(crate::model::config::YAHOO_FINANCE_BASE_URL)
    }
}
