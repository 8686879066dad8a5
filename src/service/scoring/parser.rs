//! Turns a free-text model reply into a [`ScoreOutcome`]
//!
//! Order of precedence:
//! 1. the reply (optionally inside a markdown code fence) is a JSON object;
//!    its `score`, `explanation` and `key_indicators` fields are read leniently
//! 2. a `score: <n>` / `score <n>/10` pattern found anywhere in the text
//! 3. neither: score 0 with the raw text as explanation

use regex::Regex;
use serde_json::{Map, Value};

use crate::model::{clamp_score, ScoreOutcome, DEFAULT_EXPLANATION};

pub struct ReplyParser {
    score_pattern: Regex,
}

impl ReplyParser {
    pub fn new() -> Self {
        Self {
            score_pattern: Regex::new(r#"(?i)score"?[\s:]*([\d.]+)(?:\s*/\s*10)?"#)
                .expect("score pattern is valid"),
        }
    }

    pub fn parse(&self, reply: &str) -> ScoreOutcome {
        if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(strip_code_fence(reply)) {
            return structured(&fields);
        }

        tracing::debug!(reply_length = reply.len(), "Reply is not JSON, extracting score from text");

        ScoreOutcome::Heuristic {
            score: self.extract_score(reply).map(clamp_score).unwrap_or(0.0),
            raw_text: reply.to_string(),
        }
    }

    fn extract_score(&self, text: &str) -> Option<f64> {
        self.score_pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().trim_end_matches('.').parse().ok())
    }
}

impl Default for ReplyParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a reply object, tolerating loosely typed fields
fn structured(fields: &Map<String, Value>) -> ScoreOutcome {
    let score = fields.get("score").and_then(as_number).unwrap_or(0.0);

    let explanation = fields
        .get("explanation")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_EXPLANATION.to_string());

    let key_indicators = match fields.get("key_indicators") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(single)) => vec![single.clone()],
        _ => Vec::new(),
    };

    ScoreOutcome::Structured {
        score: clamp_score(score),
        explanation,
        key_indicators,
    }
}

/// A JSON number, or a string holding one (`"8"`)
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Strip a surrounding ```json ... ``` fence if present
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();

    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = body.strip_suffix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") on the opening line
    match body.split_once('\n') {
        Some((_, rest)) => rest.trim(),
        None => body.trim(),
    }
}
