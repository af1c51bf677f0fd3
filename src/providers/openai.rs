//! OpenAI chat-completions client.
//!
//! Sends one `system` and one `user` message and returns the first choice's
//! content, trimmed.

use super::{read_json, send_checked, TextCompletion};
use crate::config::CompletionSettings;
use crate::error::{Result, UpstreamError};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

const SERVICE: &str = "openai";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| UpstreamError::malformed(SERVICE, "response has no message content"))
    }
}

/// Text completion over the OpenAI chat-completions API.
pub struct OpenAiCompletion {
    http: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl OpenAiCompletion {
    /// Create a completion client.
    ///
    /// # Arguments
    ///
    /// * `http` - The process-wide HTTP client
    /// * `api_key` - Bearer key for the API
    /// * `settings` - Base URL, model, temperature and request timeout
    pub fn new(http: reqwest::Client, api_key: SecretString, settings: &CompletionSettings) -> Self {
        Self {
            http,
            api_key,
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

#[async_trait]
impl TextCompletion for OpenAiCompletion {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn complete(&self, system_instruction: &str, user_content: &str) -> Result<String> {
        let t0 = Instant::now();
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: user_content,
                },
            ],
            temperature: self.temperature,
        };
        debug!(user_bytes = user_content.len(), "Sending completion request");

        let request = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .timeout(self.timeout)
            .json(&body);
        let resp = send_checked(SERVICE, request).await?;
        let text = read_json::<ChatResponse>(SERVICE, resp).await?.into_text()?;

        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            answer_bytes = text.len(),
            "Completion succeeded"
        );
        Ok(text)
    }
}
