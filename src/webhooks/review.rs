//! `/api/review/*`: review-focused endpoints that return the generated text.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::ReviewAppError;
use crate::github::signature;
use crate::github::types::WebhookPayload;
use crate::github::webhooks::{EventCategory, WebhookClassifier};
use crate::server::AppState;
use crate::webhooks::signature_header;

/// `POST /api/review/webhook`: per-file review of a signed pull request delivery.
pub async fn handle_review_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = signature_header(&headers);
    if !signature::verify(&body, signature, &state.webhook_secret) {
        warn!("Review webhook signature verification failed");
        return ReviewAppError::Signature("signature mismatch".to_string()).into_response();
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => return ReviewAppError::from(e).into_response(),
    };

    let action = WebhookClassifier::action(&payload);
    if WebhookClassifier::classify(&payload) == EventCategory::Unrecognized {
        return (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": format!("PR {} event received, no review needed", action)
            })),
        )
            .into_response();
    }

    if !state.orchestrator.review_enabled() {
        return ReviewAppError::ReviewUnavailable.into_response();
    }

    let event: WebhookPayload = match serde_json::from_value(payload) {
        Ok(event) => event,
        Err(e) => return ReviewAppError::from(e).into_response(),
    };

    info!(
        pr_number = event.pr_number(),
        owner = %event.owner(),
        repo = %event.repo(),
        "Reviewing pull request"
    );

    match state.orchestrator.review_per_file(&event).await {
        Ok(review) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "PR review completed",
                "summary": review.summary,
                "fileReviews": review.file_reviews,
            })),
        )
            .into_response(),
        Err(e) => {
            error!(pr_number = event.pr_number(), error = %e, "PR review failed");
            e.into_response()
        }
    }
}

/// `GET /api/review/diff/:owner/:repo/:pull_number`
pub async fn analyze_pull_request_diff(
    State(state): State<AppState>,
    Path((owner, repo, pull_number)): Path<(String, String, String)>,
) -> Response {
    let Ok(number) = pull_number.parse::<u64>() else {
        return ReviewAppError::InvalidPayload(format!(
            "pull_number must be a positive integer, got '{}'",
            pull_number
        ))
        .into_response();
    };

    match state.orchestrator.analyze_diff(&owner, &repo, number).await {
        Ok(analysis) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Diff analysis completed",
                "analysis": analysis,
            })),
        )
            .into_response(),
        Err(e) => {
            error!(owner = %owner, repo = %repo, pr_number = number, error = %e, "Diff analysis failed");
            e.into_response()
        }
    }
}
