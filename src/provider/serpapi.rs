//! SerpApi news search (Google News vertical)

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{check_status, endpoint, ProviderError, SearchProvider, USER_AGENT};
use crate::model::SearchResult;

pub struct SerpApiNewsSearch {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    news_results: Vec<NewsResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    /// Either a plain name or `{"name": ..., "icon": ...}` depending on the engine version
    source: Option<serde_json::Value>,
    date: Option<String>,
}

fn source_name(source: Option<serde_json::Value>) -> Option<String> {
    match source? {
        serde_json::Value::String(name) => Some(name),
        serde_json::Value::Object(map) => map.get("name")?.as_str().map(str::to_string),
        _ => None,
    }
}

impl From<NewsResult> for SearchResult {
    fn from(r: NewsResult) -> Self {
        // Fold source and date into the snippet; the prompt is the only consumer
        let prefix = match (source_name(r.source), r.date) {
            (Some(source), Some(date)) => format!("[{source}, {date}] "),
            (Some(source), None) => format!("[{source}] "),
            (None, Some(date)) => format!("[{date}] "),
            (None, None) => String::new(),
        };

        SearchResult {
            title: r.title,
            url: r.link,
            snippet: format!("{prefix}{}", r.snippet),
        }
    }
}

impl SerpApiNewsSearch {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    async fn fetch(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredential)?;
        let num = max_results.to_string();

        let response = self
            .client
            .get(endpoint(&self.base_url, "search"))
            .header("User-Agent", USER_AGENT)
            .query(&[("q", query), ("tbm", "nws"), ("num", num.as_str()), ("api_key", api_key)])
            .send()
            .await?;

        let payload: NewsResponse = check_status(response)?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        normalize(payload, max_results)
    }
}

fn normalize(payload: NewsResponse, max_results: usize) -> Result<Vec<SearchResult>, ProviderError> {
    if let Some(error) = payload.error {
        return Err(ProviderError::ParseError(error));
    }

    Ok(payload
        .news_results
        .into_iter()
        .take(max_results)
        .map(SearchResult::from)
        .collect())
}

#[async_trait]
impl SearchProvider for SerpApiNewsSearch {
    fn source(&self) -> &'static str {
        "serpapi"
    }

    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        if self.api_key.is_none() {
            return Vec::new();
        }

        match self.fetch(query, max_results).await {
            Ok(results) => {
                tracing::debug!(query = %query, count = results.len(), "News search completed");
                results
            }
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "Error searching news with SerpApi");
                Vec::new()
            }
        }
    }
}
