use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

impl From<serde_json::Error> for ReviewAppError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(format!("JSON parse error: {}", err))
    }
}

impl From<octocrab::Error> for ReviewAppError {
    fn from(err: octocrab::Error) -> Self {
        let status = match &err {
            octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
            _ => None,
        };
        let message = match &err {
            octocrab::Error::GitHub { source, .. } => source.message.clone(),
            other => other.to_string(),
        };
        Self::Upstream { status, message }
    }
}

impl From<config::ConfigError> for ReviewAppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ReviewAppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt template error: {0}")]
    Template(String),

    #[error("Webhook signature verification failed: {0}")]
    Signature(String),

    #[error("Missing GitHub event type")]
    MissingEventType,

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    #[error("GitHub API error{}: {message}", fmt_status(.status))]
    Upstream { status: Option<u16>, message: String },

    #[error("Path is not a single file: {0}")]
    NotAFile(String),

    #[error("Review generation failed: {0}")]
    ReviewGeneration(String),

    #[error("Review functionality is disabled: no LLM API key configured")]
    ReviewUnavailable,

    #[error("Error processing pull request: {0}")]
    Processing(String),
}

impl ReviewAppError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Signature(_) => StatusCode::UNAUTHORIZED,
            Self::MissingEventType | Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Self::ReviewUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the JSON error body.
    fn public_message(&self) -> String {
        match self {
            Self::Signature(_) => "Webhook signature verification failed".to_string(),
            Self::MissingEventType => "Missing GitHub event type".to_string(),
            Self::Processing(_) => "Error processing pull request".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ReviewAppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.public_message() }));
        (self.status_code(), body).into_response()
    }
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

pub type Result<T, E = ReviewAppError> = std::result::Result<T, E>;
