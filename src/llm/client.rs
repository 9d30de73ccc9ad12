//! Chat-completion access for review generation.
//!
//! [`OpenAiClient`] talks to any OpenAI-compatible `/v1/chat/completions`
//! endpoint. Each operation pairs a system message and a rendered user message
//! from [`PromptTemplates`]; transport, status, and decode failures all become
//! [`ReviewAppError::ReviewGeneration`].

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::LlmConfig;
use crate::error::{ReviewAppError, Result};
use crate::llm::prompts::{PromptTemplate, PromptTemplates};

pub const REVIEW_FALLBACK: &str = "Unable to generate code review";
pub const SUMMARY_FALLBACK: &str = "Unable to generate pull request summary";
pub const DIFF_ANALYSIS_FALLBACK: &str = "Unable to generate diff analysis";

#[async_trait]
pub trait ReviewGenerator: Send + Sync {
    /// Reviews the concatenated per-file diff blocks of one pull request.
    async fn review_changes(&self, content: &str) -> Result<String>;

    /// Reviews the full content of a single file.
    async fn review_file(&self, content: &str, extension: &str) -> Result<String>;

    async fn summarize_pull_request(
        &self,
        title: &str,
        description: &str,
        files: &[String],
    ) -> Result<String>;

    async fn analyze_diff(&self, diff: &str) -> Result<String>;
}

pub struct OpenAiClient {
    client: reqwest::Client,
    url_chat: String,
    model: String,
    templates: PromptTemplates,
}

impl OpenAiClient {
    pub fn new(cfg: &LlmConfig, templates: PromptTemplates) -> Result<Self> {
        let base = cfg.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ReviewAppError::Config(format!(
                "Invalid LLM endpoint: {}",
                cfg.base_url
            )));
        }

        let mut headers = header::HeaderMap::new();
        let bearer = header::HeaderValue::from_str(&format!("Bearer {}", cfg.api_key))
            .map_err(|e| ReviewAppError::Config(format!("Invalid LLM API key: {}", e)))?;
        headers.insert(header::AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| ReviewAppError::Config(format!("Failed to build LLM client: {}", e)))?;

        let url_chat = format!("{}/v1/chat/completions", base.trim_end_matches('/'));

        info!(
            model = %cfg.model,
            endpoint = %url_chat,
            timeout_secs = cfg.timeout_secs,
            "LLM client initialized"
        );

        Ok(Self {
            client,
            url_chat,
            model: cfg.model.clone(),
            templates,
        })
    }

    async fn complete(
        &self,
        template: &PromptTemplate,
        user_message: String,
        fallback: &str,
    ) -> Result<String> {
        let started = Instant::now();
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: template.system.trim(),
                },
                ChatMessage {
                    role: "user",
                    content: &user_message,
                },
            ],
            temperature: template.temperature,
            max_tokens: template.max_tokens,
        };

        debug!(
            model = %self.model,
            prompt_len = user_message.len(),
            "POST {}", self.url_chat
        );

        let response = self
            .client
            .post(&self.url_chat)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Chat completion request failed");
                ReviewAppError::ReviewGeneration(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Chat completion returned an error status");
            return Err(ReviewAppError::ReviewGeneration(format!(
                "HTTP {}: {}",
                status.as_u16(),
                snippet(&body)
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ReviewAppError::ReviewGeneration(format!("Invalid response: {}", e)))?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty());

        info!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            empty = text.is_none(),
            "Chat completion finished"
        );

        Ok(text.unwrap_or_else(|| fallback.to_string()))
    }
}

#[async_trait]
impl ReviewGenerator for OpenAiClient {
    async fn review_changes(&self, content: &str) -> Result<String> {
        let template = &self.templates.review;
        let message = template.render(&[("content", content)]);
        self.complete(template, message, REVIEW_FALLBACK).await
    }

    async fn review_file(&self, content: &str, extension: &str) -> Result<String> {
        let template = &self.templates.file_review;
        let message = template.render(&[("content", content), ("extension", extension)]);
        self.complete(template, message, REVIEW_FALLBACK).await
    }

    async fn summarize_pull_request(
        &self,
        title: &str,
        description: &str,
        files: &[String],
    ) -> Result<String> {
        let template = &self.templates.summary;
        let files = files.join("\n");
        let message = template.render(&[
            ("title", title),
            ("description", description),
            ("files", &files),
        ]);
        self.complete(template, message, SUMMARY_FALLBACK).await
    }

    async fn analyze_diff(&self, diff: &str) -> Result<String> {
        let template = &self.templates.diff_analysis;
        let message = template.render(&[("diff", diff)]);
        self.complete(template, message, DIFF_ANALYSIS_FALLBACK).await
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn snippet(body: &str) -> String {
    const MAX: usize = 300;
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX).collect();
        format!("{}...", cut)
    }
}
