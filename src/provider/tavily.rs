//! Tavily web search, restricted to an allow-list of news and finance domains

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{check_status, endpoint, ProviderError, SearchProvider, USER_AGENT};
use crate::model::{SearchConfig, SearchResult};

pub struct TavilySearch {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    config: SearchConfig,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    include_answer: bool,
    include_raw_content: bool,
    max_results: usize,
    include_domains: &'a [String],
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl From<TavilyResult> for SearchResult {
    fn from(r: TavilyResult) -> Self {
        SearchResult {
            title: r.title,
            url: r.url,
            snippet: r.content,
        }
    }
}

impl TavilySearch {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, config: SearchConfig) -> Self {
        if !config.include_domains.is_empty() {
            tracing::info!(domains = ?config.include_domains, "Web search domain allow-list configured");
        }

        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key,
            config,
        }
    }

    async fn fetch(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredential)?;

        let body = SearchRequest {
            api_key,
            query,
            search_depth: &self.config.search_depth,
            include_answer: true,
            include_raw_content: false,
            max_results,
            include_domains: &self.config.include_domains,
        };

        let response = self
            .client
            .post(endpoint(&self.base_url, "search"))
            .header("User-Agent", USER_AGENT)
            .json(&body)
            .send()
            .await?;

        let payload: SearchResponse = check_status(response)?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(normalize(payload, max_results))
    }
}

fn normalize(payload: SearchResponse, max_results: usize) -> Vec<SearchResult> {
    payload
        .results
        .into_iter()
        .take(max_results)
        .map(SearchResult::from)
        .collect()
}

#[async_trait]
impl SearchProvider for TavilySearch {
    fn source(&self) -> &'static str {
        "tavily"
    }

    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        if self.api_key.is_none() {
            return Vec::new();
        }

        match self.fetch(query, max_results).await {
            Ok(results) => {
                tracing::debug!(query = %query, count = results.len(), "Tavily search completed");
                results
            }
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "Error searching with Tavily");
                Vec::new()
            }
        }
    }
}
