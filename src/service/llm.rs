//! Shared LLM client and interaction utilities
//!
//! Provides a chat-completion seam over the OpenAI API so scoring can be
//! exercised against in-memory models.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;

/// Sampling temperature for risk scoring
pub const TEMPERATURE: f64 = 0.3;

/// Cap on reply length
pub const MAX_TOKENS: u64 = 500;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Completion request failed: {0}")]
    Completion(String),
}

/// A system + user message pair in, free text out
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

/// Shared LLM client wrapper
#[derive(Clone)]
pub struct LlmClient {
    client: openai::Client,
    model: String,
}

impl LlmClient {
    /// Create a new LLM client with the provided API key
    pub fn new(api_key: &str, model: impl Into<String>) -> Self {
        Self {
            client: openai::Client::new(api_key),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(system)
            .temperature(TEMPERATURE)
            .max_tokens(MAX_TOKENS)
            .build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| LlmError::Completion(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_keeps_model_name() {
        let client = LlmClient::new("sk-test", "gpt-4o-mini");
        assert_eq!(client.model(), "gpt-4o-mini");
    }
}
