use std::sync::Arc;

use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::github::{GitHubClient, GitHubGateway};
use crate::llm::{OpenAiClient, PromptTemplates, ReviewGenerator};
use crate::review::ReviewOrchestrator;
use crate::webhooks;

/// Shared request state. Both gateways hold only long-lived credentials.
#[derive(Clone)]
pub struct AppState {
    pub webhook_secret: Arc<str>,
    pub orchestrator: ReviewOrchestrator,
}

impl AppState {
    pub fn new(webhook_secret: &str, orchestrator: ReviewOrchestrator) -> Self {
        Self {
            webhook_secret: Arc::from(webhook_secret),
            orchestrator,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let github: Arc<dyn GitHubGateway> = Arc::new(GitHubClient::new(
            &config.github_token,
            config.github_api_url.as_deref(),
            config.github_timeout(),
        )?);
        info!("GitHub client initialized");

        let reviewer: Option<Arc<dyn ReviewGenerator>> = match &config.llm {
            Some(llm) => {
                let templates = PromptTemplates::load(&config.prompts_path)?;
                Some(Arc::new(OpenAiClient::new(llm, templates)?))
            }
            None => {
                warn!("OPENAI_API_KEY is not set, AI code review is disabled");
                None
            }
        };

        let orchestrator = ReviewOrchestrator::new(
            github,
            reviewer,
            config.review_mode,
            config.post_review_comment,
        );

        Ok(Self::new(&config.webhook_secret, orchestrator))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/webhook", post(webhooks::github::handle_webhook))
        .route("/webhook/", post(webhooks::github::handle_webhook))
        .route(
            "/api/review/webhook",
            post(webhooks::review::handle_review_webhook),
        )
        .route(
            "/api/review/diff/:owner/:repo/:pull_number",
            get(webhooks::review::analyze_pull_request_diff),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .into_inner(),
        )
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "pr-review-app",
        "timestamp": chrono::Utc::now()
    }))
}
