use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

/// Clamp a model-supplied score into the 0-10 scale. NaN maps to the floor.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return MIN_SCORE;
    }
    score.clamp(MIN_SCORE, MAX_SCORE)
}

/// A search hit normalized across providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Context gathered for one (category, country) pair
#[derive(Debug, Clone, Default)]
pub struct ProviderContext {
    pub web_results: Vec<SearchResult>,
    pub news_results: Vec<SearchResult>,
}

/// Reply shape requested from the language model
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RiskReply {
    /// Risk score from 0 (no risk) to 10 (extreme risk)
    #[serde(default)]
    pub score: f64,

    /// Brief explanation of the risk factors
    #[serde(default = "default_explanation")]
    pub explanation: String,

    /// Key indicators or events contributing to the risk
    #[serde(default)]
    pub key_indicators: Vec<String>,
}

/// Explanation recorded when the model reply omits one
pub const DEFAULT_EXPLANATION: &str = "No explanation provided";

fn default_explanation() -> String {
    DEFAULT_EXPLANATION.to_string()
}

/// How a score was obtained from the scorer
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    /// The reply parsed as the requested JSON object
    Structured {
        score: f64,
        explanation: String,
        key_indicators: Vec<String>,
    },
    /// The reply was free text; the score was pattern-matched out of it
    Heuristic { score: f64, raw_text: String },
    /// No usable reply; the score is a random placeholder
    Fallback { score: f64, note: String },
}

impl ScoreOutcome {
    pub fn score(&self) -> f64 {
        match self {
            Self::Structured { score, .. }
            | Self::Heuristic { score, .. }
            | Self::Fallback { score, .. } => *score,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Flatten into the `(score, explanation, indicators)` triple, clamping the score
    pub fn into_risk_score(self) -> RiskScore {
        match self {
            Self::Structured {
                score,
                explanation,
                key_indicators,
            } => RiskScore {
                score: clamp_score(score),
                explanation,
                key_indicators,
            },
            Self::Heuristic { score, raw_text } => RiskScore {
                score: clamp_score(score),
                explanation: raw_text,
                key_indicators: Vec::new(),
            },
            Self::Fallback { score, note } => RiskScore {
                score: clamp_score(score),
                explanation: note,
                key_indicators: Vec::new(),
            },
        }
    }
}

/// Normalized scorer output
#[derive(Debug, Clone, PartialEq)]
pub struct RiskScore {
    pub score: f64,
    pub explanation: String,
    pub key_indicators: Vec<String>,
}

/// One scored (category, country) record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub country: String,
    pub category: String,
    pub score: f64,
    pub explanation: String,
    pub key_indicators: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl Assessment {
    pub fn new(category: &str, country: &str, risk: RiskScore, timestamp: DateTime<Utc>) -> Self {
        Self {
            country: country.to_string(),
            category: category.to_string(),
            score: clamp_score(risk.score),
            explanation: risk.explanation,
            key_indicators: risk.key_indicators,
            timestamp,
        }
    }
}

/// Assessments in generation order
pub type Report = Vec<Assessment>;
