//! LLM (Groq) API client module
//!
//! Encapsulates the chat-completion call that produces pull request summaries.

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::prompt_builder::{build_fallback_prompt, build_prompt, estimate_tokens};
use crate::core::config::AppConfig;
use crate::core::models::{PullRequestContext, SummaryResult};
use crate::core::ports::Summarizer;
use crate::errors::SummaryError;

/// Longest summary the chat channel receives, in characters.
pub const MAX_SUMMARY_CHARS: usize = 1_900;

const MAX_OUTPUT_TOKENS: u32 = 800;
const FALLBACK_OUTPUT_TOKENS: u32 = 400;
const TEMPERATURE: f64 = 0.1;

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Serializes chat messages for an OpenAI-compatible `chat/completions` body.
/// Image parts are dropped; the relay only sends text.
pub(crate) fn chat_messages_json(prompt: &[ChatCompletionMessage]) -> Vec<Value> {
    prompt
        .iter()
        .filter_map(|m| {
            let role_str = match m.role {
                MessageRole::system => "system",
                MessageRole::user | MessageRole::function | MessageRole::tool => "user",
                MessageRole::assistant => "assistant",
            };
            match &m.content {
                Content::Text(text) => Some(json!({ "role": role_str, "content": text })),
                Content::ImageUrl(_) => None,
            }
        })
        .collect()
}

/// LLM API client for generating summaries
pub struct LlmClient {
    http: Client,
    api_key: String,
    base_url: String,
    model_name: String,
}

impl LlmClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, SummaryError> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| SummaryError::Http(format!("Failed to build Groq HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: config.groq_api_key.clone(),
            base_url: config.groq_api_url.clone(),
            model_name: config.groq_model.clone(),
        })
    }

    /// Sends one completion request and returns the raw text of the first choice.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API answers with a
    /// non-success status, or the response has no text.
    pub async fn complete(
        &self,
        prompt: &[ChatCompletionMessage],
        max_tokens: u32,
    ) -> Result<String, SummaryError> {
        #[cfg(feature = "debug-logs")]
        info!("Using Groq prompt:\n{:?}", prompt);

        let estimated_input_tokens = prompt
            .iter()
            .map(|msg| match &msg.content {
                Content::Text(text) => estimate_tokens(text),
                Content::ImageUrl(_) => 0,
            })
            .sum::<usize>();
        info!(
            model = %self.model_name,
            estimated_input_tokens,
            max_tokens,
            "Requesting summary"
        );

        let request_body = json!({
            "model": self.model_name,
            "messages": chat_messages_json(prompt),
            "max_tokens": max_tokens,
            "temperature": TEMPERATURE,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| SummaryError::Http(format!("Groq API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(SummaryError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| SummaryError::Decode(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(SummaryError::EmptyContent)
    }

    async fn complete_bounded(
        &self,
        prompt: &[ChatCompletionMessage],
        max_tokens: u32,
    ) -> Result<SummaryResult, SummaryError> {
        let text = self.complete(prompt, max_tokens).await?;
        SummaryResult::bounded(&text, MAX_SUMMARY_CHARS)
    }
}

#[async_trait]
impl Summarizer for LlmClient {
    #[tracing::instrument(level = "info", skip_all, fields(pr = context.number))]
    async fn summarize(&self, context: &PullRequestContext) -> Result<SummaryResult, SummaryError> {
        match self
            .complete_bounded(&build_prompt(context), MAX_OUTPUT_TOKENS)
            .await
        {
            Ok(summary) => Ok(summary),
            Err(e) => {
                warn!("Full summary request failed, falling back to minimal prompt: {}", e);
                self.complete_bounded(&build_fallback_prompt(context), FALLBACK_OUTPUT_TOKENS)
                    .await
            }
        }
    }
}
