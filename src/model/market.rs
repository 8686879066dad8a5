use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Summary statistics over a historical daily price series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub latest_price: f64,
    /// Standard deviation of day-over-day percentage change, in percent
    pub volatility: f64,
    pub mean_volume: f64,
}

impl MarketSnapshot {
    /// Summarize a series of closes and volumes, oldest first. `None` for an empty series.
    pub fn from_series(closes: &[f64], volumes: &[f64]) -> Option<Self> {
        let latest_price = *closes.last()?;

        let changes: Vec<f64> = closes
            .windows(2)
            .filter(|w| w[0] != 0.0)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect();

        let mean_volume = if volumes.is_empty() {
            0.0
        } else {
            volumes.iter().sum::<f64>() / volumes.len() as f64
        };

        Some(Self {
            latest_price,
            volatility: sample_std_dev(&changes) * 100.0,
            mean_volume,
        })
    }
}

/// Sample (n-1) standard deviation; zero when fewer than two values
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Raw exchange-rate record as returned by the provider, keyed by field name
pub type CurrencyRate = BTreeMap<String, String>;
