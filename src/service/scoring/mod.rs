//! Risk scoring using an LLM
//!
//! Builds a prompt from gathered search context, asks the model for a JSON
//! verdict and normalizes whatever comes back. Scoring never blocks the
//! pipeline: without a model, or when the call fails, a random placeholder
//! score in `[0, 5]` is returned together with a note.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{ScoreOutcome, SearchResult};
use crate::service::llm::ChatModel;
use crate::service::scoring::parser::ReplyParser;
use crate::service::scoring::prompts::{build_risk_prompt, RISK_SYSTEM_PROMPT};

pub mod parser;
pub mod prompts;

/// Upper bound of the placeholder score used in degraded mode
pub const FALLBACK_MAX_SCORE: f64 = 5.0;

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("Failed to build scoring prompt: {0}")]
    Prompt(#[from] serde_json::Error),
}

/// Scores one (category, country) pair from its search context
#[async_trait]
pub trait RiskScorer: Send + Sync {
    async fn score(
        &self,
        category: &str,
        country: &str,
        web_results: &[SearchResult],
        news_results: &[SearchResult],
    ) -> Result<ScoreOutcome, ScoringError>;
}

/// LLM-backed scorer with a degraded mode
pub struct LlmRiskScorer {
    model: Option<Arc<dyn ChatModel>>,
    parser: ReplyParser,
    rng: Mutex<StdRng>,
}

impl LlmRiskScorer {
    /// `None` puts the scorer permanently in degraded mode
    pub fn new(model: Option<Arc<dyn ChatModel>>) -> Self {
        Self::with_rng(model, StdRng::from_entropy())
    }

    /// Deterministic placeholder scores
    #[cfg(test)]
    pub fn with_seed(model: Option<Arc<dyn ChatModel>>, seed: u64) -> Self {
        Self::with_rng(model, StdRng::seed_from_u64(seed))
    }

    fn with_rng(model: Option<Arc<dyn ChatModel>>, rng: StdRng) -> Self {
        if model.is_none() {
            tracing::warn!("No language model configured, risk scores will be placeholders");
        }

        Self {
            model,
            parser: ReplyParser::new(),
            rng: Mutex::new(rng),
        }
    }

    fn fallback(&self, note: String) -> ScoreOutcome {
        let score = match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0.0..=FALLBACK_MAX_SCORE),
            Err(poisoned) => poisoned.into_inner().gen_range(0.0..=FALLBACK_MAX_SCORE),
        };
        ScoreOutcome::Fallback { score, note }
    }
}

#[async_trait]
impl RiskScorer for LlmRiskScorer {
    async fn score(
        &self,
        category: &str,
        country: &str,
        web_results: &[SearchResult],
        news_results: &[SearchResult],
    ) -> Result<ScoreOutcome, ScoringError> {
        let Some(model) = &self.model else {
            return Ok(self.fallback("LLM not available".to_string()));
        };

        let start_time = std::time::Instant::now();
        let prompt = build_risk_prompt(category, country, web_results, news_results)?;

        tracing::debug!(
            category = %category,
            country = %country,
            web_results = web_results.len(),
            news_results = news_results.len(),
            prompt_length = prompt.len(),
            "Requesting risk score"
        );

        match model.complete(RISK_SYSTEM_PROMPT, &prompt).await {
            Ok(reply) => {
                tracing::debug!(
                    category = %category,
                    country = %country,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    "Risk score request completed"
                );
                Ok(self.parser.parse(&reply))
            }
            Err(e) => {
                tracing::error!(
                    category = %category,
                    country = %country,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    error = %e,
                    "Error analyzing with LLM"
                );
                Ok(self.fallback(format!("Error: {e}")))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::service::llm::LlmError;

    /// Replies with a canned string, or fails when none is given
    pub(crate) struct CannedModel(pub Option<String>);

    #[async_trait]
    impl ChatModel for CannedModel {
        async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
            assert_eq!(system, RISK_SYSTEM_PROMPT);
            assert!(prompt.contains("Risk Category:"));
            self.0
                .clone()
                .ok_or_else(|| LlmError::Completion("connection reset".to_string()))
        }
    }

    #[tokio::test]
    async fn test_degraded_mode_without_model() {
        let scorer = LlmRiskScorer::with_seed(None, 7);

        for _ in 0..50 {
            let outcome = scorer.score("Major Cyber Attacks", "Japan", &[], &[]).await.unwrap();
            let risk = outcome.clone().into_risk_score();

            assert!(outcome.is_fallback());
            assert!((0.0..=FALLBACK_MAX_SCORE).contains(&risk.score));
            assert_eq!(risk.explanation, "LLM not available");
        }
    }

    #[tokio::test]
    async fn test_seeded_fallback_is_deterministic() {
        let a = LlmRiskScorer::with_seed(None, 42);
        let b = LlmRiskScorer::with_seed(None, 42);

        for _ in 0..5 {
            let sa = a.score("c", "x", &[], &[]).await.unwrap().score();
            let sb = b.score("c", "x", &[], &[]).await.unwrap().score();
            assert_eq!(sa, sb);
        }
    }

    #[tokio::test]
    async fn test_model_failure_falls_back() {
        let scorer = LlmRiskScorer::with_seed(Some(Arc::new(CannedModel(None))), 1);
        let outcome = scorer.score("Russia-NATO Conflict", "Ukraine", &[], &[]).await.unwrap();

        match outcome {
            ScoreOutcome::Fallback { score, note } => {
                assert!((0.0..=FALLBACK_MAX_SCORE).contains(&score));
                assert!(note.starts_with("Error: "));
                assert!(note.contains("connection reset"));
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_json_reply() {
        let reply = r#"{"score": 8, "explanation": "Active conflict", "key_indicators": ["shelling"]}"#;
        let scorer = LlmRiskScorer::with_seed(Some(Arc::new(CannedModel(Some(reply.to_string())))), 1);

        let risk = scorer
            .score("Russia-NATO Conflict", "Ukraine", &[], &[])
            .await
            .unwrap()
            .into_risk_score();

        assert_eq!(risk.score, 8.0);
        assert_eq!(risk.explanation, "Active conflict");
        assert_eq!(risk.key_indicators, vec!["shelling"]);
    }

    #[tokio::test]
    async fn test_free_text_reply() {
        let reply = "Risk score: 12 out of 10 due to tension";
        let scorer = LlmRiskScorer::with_seed(Some(Arc::new(CannedModel(Some(reply.to_string())))), 1);

        let risk = scorer
            .score("Middle East Regional War", "Israel", &[], &[])
            .await
            .unwrap()
            .into_risk_score();

        assert_eq!(risk.score, 10.0);
        assert_eq!(risk.explanation, reply);
        assert!(risk.key_indicators.is_empty());
    }
}
