//! Prompts for geopolitical risk scoring

use crate::model::{RiskReply, SearchResult};

/// Number of results per source embedded in the prompt
pub const CONTEXT_RESULTS: usize = 3;

/// System prompt for risk scoring
pub const RISK_SYSTEM_PROMPT: &str = "You are a geopolitical risk analyst. Analyze the given information and provide a risk assessment.";

/// Serialize up to [`CONTEXT_RESULTS`] results, or a placeholder line
fn format_results(results: &[SearchResult], empty: &str) -> serde_json::Result<String> {
    if results.is_empty() {
        return Ok(empty.to_string());
    }

    let head = &results[..results.len().min(CONTEXT_RESULTS)];
    serde_json::to_string_pretty(head)
}

/// Build the scoring prompt for one (category, country) pair
pub fn build_risk_prompt(
    category: &str,
    country: &str,
    web_results: &[SearchResult],
    news_results: &[SearchResult],
) -> serde_json::Result<String> {
    let web = format_results(web_results, "No web results found.")?;
    let news = format_results(news_results, "No news results found.")?;
    let schema = serde_json::to_string_pretty(&schemars::schema_for!(RiskReply))?;

    Ok(format!(
        r#"Analyze the geopolitical risk for the given country and category based on the provided information.

Country: {country}
Risk Category: {category}

## Recent Web Results
{web}

## Recent News
{news}

Please provide:
1. A risk score from 0-10 where 0 is no risk and 10 is extreme risk
2. A brief explanation of the risk factors
3. Key indicators or events contributing to the risk

Format your response as a JSON object with the following structure:
{{
    "score": 0-10,
    "explanation": "...",
    "key_indicators": ["...", "..."]
}}

The object must conform to this JSON schema:
{schema}

Output JSON only."#
    ))
}
