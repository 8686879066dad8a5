//! Application state and service initialization
//!
//! Centralizes construction of the providers and services from [`Config`].

use std::sync::Arc;

use crate::model::{Config, Taxonomy, TaxonomyError};
use crate::provider::{
    AlphaVantageClient, SearchProvider, SerpApiNewsSearch, TavilySearch, YahooFinanceClient,
};
use crate::service::{ChatModel, LlmClient, LlmRiskScorer, RiskAssessmentService};

/// Application state containing all services
pub struct AppState {
    /// Category x country assessment loop
    pub assessment_service: RiskAssessmentService,
}

impl AppState {
    /// Initialize all services
    ///
    /// Fails before anything runs if a required credential is missing or the
    /// taxonomy is inconsistent.
    pub fn new(config: Config, taxonomy: Taxonomy) -> Result<Self, AppError> {
        let missing = config.missing_required_credentials();
        if !missing.is_empty() {
            return Err(AppError::MissingCredentials(missing));
        }

        taxonomy.validate()?;

        let model: Option<Arc<dyn ChatModel>> = match config.credentials.openai.as_deref() {
            Some(api_key) => {
                let client = LlmClient::new(api_key, config.model.clone());
                tracing::info!(model = %client.model(), "Risk scoring model initialized");
                let client: Arc<dyn ChatModel> = Arc::new(client);
                Some(client)
            }
            None => None,
        };

        let web_search: Arc<dyn SearchProvider> = Arc::new(TavilySearch::new(
            config.endpoints.tavily.clone(),
            config.credentials.tavily.clone(),
            config.search.clone(),
        ));
        let news_search: Arc<dyn SearchProvider> = Arc::new(SerpApiNewsSearch::new(
            config.endpoints.serpapi.clone(),
            config.credentials.serpapi.clone(),
        ));

        let assessment_service = RiskAssessmentService::new(
            taxonomy,
            web_search,
            news_search,
            Arc::new(LlmRiskScorer::new(model)),
        )
        .with_max_results(config.search.max_results)
        .with_pacing_delay(config.pacing_delay);

        Ok(Self { assessment_service })
    }
}

/// Standalone market data adapter; needs no credential
pub fn market_data(config: &Config) -> YahooFinanceClient {
    YahooFinanceClient::new(config.endpoints.yahoo_finance.clone())
}

/// Standalone currency adapter; degrades to empty results without a credential
pub fn currency_rates(config: &Config) -> AlphaVantageClient {
    AlphaVantageClient::new(
        config.endpoints.alpha_vantage.clone(),
        config.credentials.alpha_vantage.clone(),
    )
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Required credentials are not set
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error("Invalid taxonomy: {0}")]
    Taxonomy(#[from] TaxonomyError),
}
