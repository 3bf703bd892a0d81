//! Thin Anthropic Messages API client: one construct-once HTTP client, plain
//! text completion (no tool-use), and the spec's exact retry/backoff ladder.

use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.1;
const MAX_RETRIES: u32 = 3;
const BACKOFF_MS: [u64; 3] = [2_000, 4_000, 8_000];

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

pub struct LlmClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One request per call site; retries up to 3 times with 2s/4s/8s
    /// backoff on a 429 (HTTP status or a message containing "429").
    pub async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system: system_prompt,
            messages: vec![WireMessage {
                role: "user",
                content: user_prompt,
            }],
        };

        let mut attempt = 0u32;
        loop {
            match self.send(&request).await {
                Ok(text) => return Ok(text),
                Err(err) if is_rate_limited(&err) && attempt < MAX_RETRIES => {
                    let delay = BACKOFF_MS[attempt as usize];
                    warn!(attempt, delay_ms = delay, "extractor: rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<String> {
        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            return Err(anyhow!("LLM call failed ({}): {}", status.as_u16(), body_text));
        }

        let parsed: ChatResponse = serde_json::from_str(&body_text)
            .map_err(|e| anyhow!("malformed LLM response envelope: {e}"))?;

        parsed
            .content
            .into_iter()
            .find_map(|b| b.text)
            .ok_or_else(|| anyhow!("no text content in LLM response"))
    }
}

fn is_rate_limited(err: &anyhow::Error) -> bool {
    let msg = err.to_string();
    msg.contains("429")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_429_in_error_message() {
        let err = anyhow!("LLM call failed (429): rate limited");
        assert!(is_rate_limited(&err));
        let ok = anyhow!("LLM call failed (500): server error");
        assert!(!is_rate_limited(&ok));
    }
}
