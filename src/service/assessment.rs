//! Risk assessment loop
//!
//! Walks the taxonomy in order, gathers web and news context for every
//! (category, country) pair, scores it and collects the results. A failing
//! pair is logged and skipped; it never aborts the run.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::model::{Assessment, ProviderContext, Report, RiskCategory, Taxonomy};
use crate::provider::SearchProvider;
use crate::service::scoring::{RiskScorer, ScoringError};

const DEFAULT_MAX_RESULTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

/// Build the free-text search query for a pair
pub fn search_query(category: &str, country: &str) -> String {
    format!("{category} {country} latest news analysis")
}

pub struct RiskAssessmentService {
    taxonomy: Taxonomy,
    web_search: Arc<dyn SearchProvider>,
    news_search: Arc<dyn SearchProvider>,
    scorer: Arc<dyn RiskScorer>,
    max_results: usize,
    pacing_delay: Duration,
}

impl RiskAssessmentService {
    pub fn new(
        taxonomy: Taxonomy,
        web_search: Arc<dyn SearchProvider>,
        news_search: Arc<dyn SearchProvider>,
        scorer: Arc<dyn RiskScorer>,
    ) -> Self {
        Self {
            taxonomy,
            web_search,
            news_search,
            scorer,
            max_results: DEFAULT_MAX_RESULTS,
            pacing_delay: Duration::from_secs(1),
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_pacing_delay(mut self, pacing_delay: Duration) -> Self {
        self.pacing_delay = pacing_delay;
        self
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    async fn gather_context(&self, query: &str) -> ProviderContext {
        let web_results = self.web_search.search(query, self.max_results).await;
        let news_results = self.news_search.search(query, self.max_results).await;

        tracing::debug!(
            query = %query,
            web_source = self.web_search.source(),
            web_results = web_results.len(),
            news_source = self.news_search.source(),
            news_results = news_results.len(),
            "Gathered provider context"
        );

        ProviderContext {
            web_results,
            news_results,
        }
    }

    /// Assess risk for a specific category and country
    pub async fn assess_category_risk(
        &self,
        category: &str,
        country: &str,
    ) -> Result<Assessment, AssessmentError> {
        let query = search_query(category, country);
        let context = self.gather_context(&query).await;

        let outcome = self
            .scorer
            .score(category, country, &context.web_results, &context.news_results)
            .await?;

        if outcome.is_fallback() {
            tracing::warn!(
                category = %category,
                country = %country,
                score = outcome.score(),
                "Using placeholder score"
            );
        }

        Ok(Assessment::new(
            category,
            country,
            outcome.into_risk_score(),
            Utc::now(),
        ))
    }

    async fn assess_category(&self, category: &RiskCategory, report: &mut Report) {
        for country in self.taxonomy.countries_for(category) {
            match self.assess_category_risk(&category.name, country).await {
                Ok(assessment) => {
                    tracing::info!(
                        category = %category.name,
                        country = %country,
                        "Score: {:.1}/10",
                        assessment.score
                    );
                    report.push(assessment);
                }
                Err(e) => {
                    tracing::error!(
                        category = %category.name,
                        country = %country,
                        error = %e,
                        "Assessment failed, skipping"
                    );
                }
            }

            if !self.pacing_delay.is_zero() {
                tokio::time::sleep(self.pacing_delay).await;
            }
        }
    }

    /// Assess every (category, country) pair in taxonomy order
    pub async fn generate_report(&self) -> Report {
        let categories = self.taxonomy.categories();
        let mut report = Report::with_capacity(self.taxonomy.expected_assessments());

        tracing::info!(
            categories = categories.len(),
            countries = self.taxonomy.countries().len(),
            pairs = self.taxonomy.expected_assessments(),
            "Starting geopolitical risk analysis"
        );

        for (i, category) in categories.iter().enumerate() {
            tracing::info!(
                "Analyzing category {}/{}: {}",
                i + 1,
                categories.len(),
                category.name
            );
            self.assess_category(category, &mut report).await;
        }

        tracing::info!(
            assessments = report.len(),
            skipped = self.taxonomy.expected_assessments().saturating_sub(report.len()),
            "Geopolitical risk analysis finished"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::model::taxonomy::{Scope, GLOBAL};
    use crate::model::{ScoreOutcome, SearchResult};
    use crate::service::report::save_as_table;
    use crate::service::scoring::LlmRiskScorer;

    /// Records queries and returns a fixed result set
    struct FakeSearch {
        results: Vec<SearchResult>,
        queries: Mutex<Vec<String>>,
    }

    impl FakeSearch {
        fn empty() -> Arc<Self> {
            Self::with(vec![])
        }

        fn with(results: Vec<SearchResult>) -> Arc<Self> {
            Arc::new(Self {
                results,
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SearchProvider for FakeSearch {
        fn source(&self) -> &'static str {
            "fake"
        }

        async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
            self.queries.lock().unwrap().push(query.to_string());
            self.results.iter().take(max_results).cloned().collect()
        }
    }

    /// Scores every pair with a fixed value; fails for the listed countries
    struct FakeScorer {
        score: f64,
        fail_for: Vec<&'static str>,
        calls: Mutex<Vec<(String, String, usize, usize)>>,
    }

    impl FakeScorer {
        fn new(score: f64, fail_for: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                score,
                fail_for,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl RiskScorer for FakeScorer {
        async fn score(
            &self,
            category: &str,
            country: &str,
            web_results: &[SearchResult],
            news_results: &[SearchResult],
        ) -> Result<ScoreOutcome, ScoringError> {
            self.calls.lock().unwrap().push((
                category.to_string(),
                country.to_string(),
                web_results.len(),
                news_results.len(),
            ));

            if self.fail_for.iter().any(|c| *c == country) {
                let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
                return Err(ScoringError::Prompt(cause));
            }

            Ok(ScoreOutcome::Structured {
                score: self.score,
                explanation: format!("{category} in {country}"),
                key_indicators: vec!["indicator".to_string()],
            })
        }
    }

    fn service(
        taxonomy: Taxonomy,
        web: Arc<dyn SearchProvider>,
        news: Arc<dyn SearchProvider>,
        scorer: Arc<dyn RiskScorer>,
    ) -> RiskAssessmentService {
        RiskAssessmentService::new(taxonomy, web, news, scorer).with_pacing_delay(Duration::ZERO)
    }

    #[test]
    fn test_search_query() {
        assert_eq!(
            search_query("Russia-NATO Conflict", "Germany"),
            "Russia-NATO Conflict Germany latest news analysis"
        );
    }

    #[tokio::test]
    async fn test_full_report_shape_and_order() {
        let taxonomy = Taxonomy::default();
        let scorer = FakeScorer::new(4.0, vec![]);
        let svc = service(taxonomy.clone(), FakeSearch::empty(), FakeSearch::empty(), scorer);

        let report = svc.generate_report().await;

        assert_eq!(report.len(), taxonomy.expected_assessments());
        assert_eq!(report.len(), 182);

        let mut idx = 0;
        for category in taxonomy.categories() {
            if category.scope == Scope::Global {
                assert_eq!(report[idx].category, category.name);
                assert_eq!(report[idx].country, GLOBAL);
                idx += 1;
            } else {
                for country in taxonomy.countries() {
                    assert_eq!(report[idx].category, category.name);
                    assert_eq!(&report[idx].country, country);
                    idx += 1;
                }
            }
        }
        assert_eq!(idx, report.len());
    }

    #[tokio::test]
    async fn test_global_categories_only_use_global() {
        let taxonomy = Taxonomy::default();
        let svc = service(
            taxonomy.clone(),
            FakeSearch::empty(),
            FakeSearch::empty(),
            FakeScorer::new(2.0, vec![]),
        );

        let report = svc.generate_report().await;

        for category in taxonomy.categories().iter().filter(|c| c.is_global()) {
            let countries: Vec<_> = report
                .iter()
                .filter(|a| a.category == category.name)
                .map(|a| a.country.as_str())
                .collect();
            assert_eq!(countries, vec![GLOBAL]);
        }
        assert!(report
            .iter()
            .filter(|a| a.country == GLOBAL)
            .all(|a| a.category.starts_with("Global ")));
    }

    #[tokio::test]
    async fn test_failed_pairs_are_skipped() {
        let taxonomy = Taxonomy::new(
            vec![
                RiskCategory::new("Global Indicator", Scope::Global),
                RiskCategory::new("Major Cyber Attacks", Scope::PerCountry),
                RiskCategory::new("Major Terror Attacks", Scope::PerCountry),
            ],
            vec!["France".to_string(), "Iran".to_string(), "Japan".to_string()],
        )
        .unwrap();
        let scorer = FakeScorer::new(5.0, vec!["Iran"]);
        let svc = service(taxonomy, FakeSearch::empty(), FakeSearch::empty(), scorer.clone());

        let report = svc.generate_report().await;

        // 1 global + 2 categories x 3 countries, minus the two Iran pairs
        assert_eq!(report.len(), 5);
        assert!(report.iter().all(|a| a.country != "Iran"));
        // Every pair was still attempted
        assert_eq!(scorer.calls.lock().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_serial_numbers_contiguous_after_skips() {
        let taxonomy = Taxonomy::new(
            vec![
                RiskCategory::new("Global Indicator", Scope::Global),
                RiskCategory::new("Major Cyber Attacks", Scope::PerCountry),
                RiskCategory::new("Major Terror Attacks", Scope::PerCountry),
            ],
            vec!["France".to_string(), "Iran".to_string(), "Japan".to_string()],
        )
        .unwrap();
        let svc = service(
            taxonomy,
            FakeSearch::empty(),
            FakeSearch::empty(),
            FakeScorer::new(5.0, vec!["Iran"]),
        );

        let report = svc.generate_report().await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        assert_eq!(save_as_table(&report, &path).unwrap(), 5);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let serials: Vec<String> = reader
            .records()
            .map(|r| r.unwrap()[0].to_string())
            .collect();
        assert_eq!(serials, vec!["1", "2", "3", "4", "5"]);
    }

    #[tokio::test]
    async fn test_empty_context_still_scored() {
        let taxonomy = Taxonomy::new(
            vec![RiskCategory::new("North Korea Conflict", Scope::PerCountry)],
            vec!["South Korea".to_string()],
        )
        .unwrap();
        let web = FakeSearch::empty();
        let news = FakeSearch::empty();
        let scorer = FakeScorer::new(6.0, vec![]);
        let svc = service(taxonomy, web.clone(), news.clone(), scorer.clone());

        let report = svc.generate_report().await;

        assert_eq!(report.len(), 1);
        assert_eq!(
            scorer.calls.lock().unwrap()[0],
            ("North Korea Conflict".to_string(), "South Korea".to_string(), 0, 0)
        );
        assert_eq!(
            web.queries.lock().unwrap().as_slice(),
            ["North Korea Conflict South Korea latest news analysis"]
        );
        assert_eq!(news.queries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_context_is_passed_to_scorer() {
        let hit = SearchResult {
            title: "t".to_string(),
            url: "https://www.reuters.com/x".to_string(),
            snippet: "s".to_string(),
        };
        let taxonomy = Taxonomy::new(vec![RiskCategory::new("Global Indicator", Scope::Global)], vec![]).unwrap();
        let scorer = FakeScorer::new(1.0, vec![]);
        let svc = service(
            taxonomy,
            FakeSearch::with(vec![hit.clone(); 8]),
            FakeSearch::with(vec![hit; 2]),
            scorer.clone(),
        )
        .with_max_results(5);

        svc.generate_report().await;

        let calls = scorer.calls.lock().unwrap();
        assert_eq!((calls[0].2, calls[0].3), (5, 2));
    }

    #[tokio::test]
    async fn test_scores_always_in_range_with_degraded_scorer() {
        let svc = service(
            Taxonomy::default(),
            FakeSearch::empty(),
            FakeSearch::empty(),
            Arc::new(LlmRiskScorer::with_seed(None, 99)),
        );

        let report = svc.generate_report().await;

        assert_eq!(report.len(), 182);
        assert!(report.iter().all(|a| (0.0..=10.0).contains(&a.score)));
        assert!(report.iter().all(|a| a.explanation == "LLM not available"));
    }

    #[tokio::test]
    async fn test_out_of_range_structured_score_is_clamped() {
        let taxonomy = Taxonomy::new(vec![RiskCategory::new("Global Indicator", Scope::Global)], vec![]).unwrap();
        let svc = service(
            taxonomy,
            FakeSearch::empty(),
            FakeSearch::empty(),
            FakeScorer::new(42.0, vec![]),
        );

        let report = svc.generate_report().await;
        assert_eq!(report[0].score, 10.0);
    }
}
