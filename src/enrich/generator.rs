//! Text generation client.
//!
//! Talks to an OpenAI-compatible chat completions endpoint. The
//! `TextGenerator` trait lets tests substitute canned responses.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AiConfig;
use crate::{CatnewsError, Result};

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Prompt prefix for tag generation. The model answers with a comma-separated
/// list.
pub const TAG_PROMPT: &str = "Generate 3 tags for the following text, split with ,:";

/// Prompt prefix for summary generation.
pub const SUMMARY_PROMPT: &str = "Create a summary of the following text:";

/// Generates text from a prompt.
pub trait TextGenerator: Send + Sync {
    /// Complete the given prompt.
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Generator backed by an OpenAI-compatible HTTP API.
pub struct OpenAiGenerator {
    config: AiConfig,
    http: reqwest::Client,
}

impl OpenAiGenerator {
    /// Create a generator from the AI configuration.
    pub fn new(config: AiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| CatnewsError::Generation(e.to_string()))?;

        Ok(Self { config, http })
    }

    async fn generate_inner(&self, prompt: &str) -> Result<String> {
        debug!("Requesting completion from {}", self.config.base_url);

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CatnewsError::Generation(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatnewsError::Generation(format!(
                "completion request failed: HTTP {}",
                response.status()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| CatnewsError::Generation(e.to_string()))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CatnewsError::Generation("empty completion response".to_string()))?;

        Ok(choice.message.content)
    }
}

impl TextGenerator for OpenAiGenerator {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(self.generate_inner(prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
    }

    #[test]
    fn test_chat_response_parsing() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"cats, news, rss"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "cats, news, rss");
    }
}
