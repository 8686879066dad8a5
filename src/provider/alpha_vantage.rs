//! Alpha Vantage realtime currency exchange rates

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{check_status, endpoint, CurrencyRateProvider, ProviderError, USER_AGENT};
use crate::model::CurrencyRate;

const RATE_KEY: &str = "Realtime Currency Exchange Rate";

pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl AlphaVantageClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        if api_key.is_none() {
            tracing::info!("No Alpha Vantage credential, currency rates disabled");
        }

        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    async fn fetch(&self, from_currency: &str, to_currency: &str) -> Result<CurrencyRate, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredential)?;

        let response = self
            .client
            .get(endpoint(&self.base_url, "query"))
            .header("User-Agent", USER_AGENT)
            .query(&[
                ("function", "CURRENCY_EXCHANGE_RATE"),
                ("from_currency", from_currency),
                ("to_currency", to_currency),
                ("apikey", api_key),
            ])
            .send()
            .await?;

        let payload: Value = check_status(response)?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        extract_rate(payload)
    }
}

/// Pull the rate record out of the payload. Alpha Vantage reports quota and
/// argument problems with a 200 and a `Note`, `Information` or `Error Message` body.
fn extract_rate(payload: Value) -> Result<CurrencyRate, ProviderError> {
    for key in ["Error Message", "Note", "Information"] {
        if let Some(message) = payload.get(key).and_then(Value::as_str) {
            return Err(ProviderError::ParseError(message.to_string()));
        }
    }

    let record = payload
        .get(RATE_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| ProviderError::ParseError(format!("missing '{RATE_KEY}'")))?;

    Ok(record
        .iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect())
}

#[async_trait]
impl CurrencyRateProvider for AlphaVantageClient {
    async fn exchange_rate(&self, from_currency: &str, to_currency: &str) -> CurrencyRate {
        if self.api_key.is_none() {
            return CurrencyRate::new();
        }

        match self.fetch(from_currency, to_currency).await {
            Ok(rate) => rate,
            Err(e) => {
                tracing::warn!(
                    from = %from_currency,
                    to = %to_currency,
                    error = %e,
                    "Error getting currency rates"
                );
                CurrencyRate::new()
            }
        }
    }
}
