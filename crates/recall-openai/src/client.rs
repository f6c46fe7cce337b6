// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI chat-completions and embeddings APIs.
//!
//! Handles request construction, authentication, and transient error
//! retry. The [`AiProvider`] implementation maps the engine's three
//! capabilities (summarize, embed, rank) onto these two endpoints.

use std::time::Duration;

use async_trait::async_trait;
use recall_config::OpenAiConfig;
use recall_core::traits::AiProvider;
use recall_core::types::UrlCandidate;
use recall_core::RecallError;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::types::{
    ApiErrorResponse, ChatMessage, ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse,
};

/// Base URL for the OpenAI API.
const API_BASE_URL: &str = "https://api.openai.com/v1";

const SUMMARIZE_SYSTEM_PROMPT: &str = "You summarize web articles for a personal memory store. \
Write a dense 2-4 sentence summary of the article's substance. No preamble, no commentary.";

const RANK_SYSTEM_PROMPT: &str = "You curate browsing history for a personal memory store. \
From the candidate list, pick the URLs whose pages most likely contain substantive, \
memorable content (articles, essays, research) rather than transient utility pages. \
Respond with a JSON array of the selected URL strings, nothing else.";

/// OpenAI API client.
///
/// Manages authentication headers, connection pooling, and retry logic
/// for transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    chat_model: String,
    embedding_model: String,
    max_retries: u32,
    base_url: String,
}

impl OpenAiClient {
    /// Creates a new client from configuration.
    ///
    /// Fails when no API key is configured; the engine never calls the
    /// provider anonymously.
    pub fn new(config: &OpenAiConfig) -> Result<Self, RecallError> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| RecallError::Config("openai.api_key is not set".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                RecallError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| RecallError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
            max_retries: 1,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Posts a request, retrying once after a 1-second delay on 429/5xx.
    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<R, RecallError> {
        let url = format!("{}{endpoint}", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, endpoint, "retrying request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| RecallError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, endpoint, "response received");

            if status.is_success() {
                let text = response.text().await.map_err(|e| RecallError::Provider {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return serde_json::from_str(&text).map_err(|e| RecallError::Provider {
                    message: format!("failed to parse API response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(RecallError::Provider {
                    message: format!("API returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            // Non-transient error or exhausted retries.
            let body = response.text().await.unwrap_or_default();
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!(
                    "OpenAI API error ({}): {}",
                    api_err.error.type_.as_deref().unwrap_or("unknown"),
                    api_err.error.message
                )
            } else {
                format!("API returned {status}: {body}")
            };
            return Err(RecallError::Provider {
                message,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| RecallError::Provider {
            message: "request failed after retries".to_string(),
            source: None,
        }))
    }

    async fn chat(&self, system: &str, user: String) -> Result<String, RecallError> {
        let request = ChatRequest {
            model: self.chat_model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: Some(0.2),
        };
        let response: ChatResponse = self.post_json("/chat/completions", &request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| RecallError::Provider {
                message: "chat completion returned no content".to_string(),
                source: None,
            })
    }
}

#[async_trait]
impl AiProvider for OpenAiClient {
    async fn summarize(&self, text: &str) -> Result<String, RecallError> {
        let summary = self.chat(SUMMARIZE_SYSTEM_PROMPT, text.to_string()).await?;
        Ok(summary.trim().to_string())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RecallError> {
        let request = EmbeddingRequest {
            model: self.embedding_model.clone(),
            input: text.to_string(),
        };
        let response: EmbeddingResponse = self.post_json("/embeddings", &request).await?;
        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| RecallError::Provider {
                message: "embeddings response contained no vectors".to_string(),
                source: None,
            })
    }

    async fn rank_top_urls(
        &self,
        candidates: &[UrlCandidate],
        target: usize,
    ) -> Result<Vec<String>, RecallError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let listing = candidates
            .iter()
            .map(|c| format!("- {} | {} | visits: {}", c.url, c.title, c.visit_count))
            .collect::<Vec<_>>()
            .join("\n");
        let user = format!(
            "Select up to {target} URLs from these candidates:\n{listing}"
        );
        let content = self.chat(RANK_SYSTEM_PROMPT, user).await?;
        let urls = parse_url_array(&content)?;
        Ok(urls.into_iter().take(target).collect())
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

/// Parse a JSON array of URL strings out of a chat reply, tolerating
/// markdown code fences around it.
fn parse_url_array(content: &str) -> Result<Vec<String>, RecallError> {
    let trimmed = content.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed).trim();

    serde_json::from_str::<Vec<String>>(trimmed).map_err(|e| RecallError::Provider {
        message: format!("ranking reply was not a JSON array of URLs: {e}"),
        source: None,
    })
}
