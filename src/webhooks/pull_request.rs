use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;
use tracing::{info, warn};

use crate::github::types::WebhookPayload;
use crate::github::webhooks::{EventCategory, WebhookClassifier};
use crate::review::ReviewOrchestrator;
use crate::webhooks::github::ignored;

/// Handles a verified `pull_request` delivery.
///
/// Only `opened` and `synchronize` reach the orchestrator; everything else,
/// including payloads that do not decode, is acknowledged with 200.
pub async fn handle_pull_request_event(
    orchestrator: &ReviewOrchestrator,
    payload: &Value,
) -> Response {
    let category = WebhookClassifier::classify(payload);
    let action = WebhookClassifier::action(payload);

    if category == EventCategory::Unrecognized {
        info!(action, "Pull request action not processed");
        return ignored(&format!("Pull request action '{}' not processed", action));
    }

    let event: WebhookPayload = match serde_json::from_value(payload.clone()) {
        Ok(event) => event,
        Err(e) => {
            warn!(action, error = %e, "Malformed pull request payload, ignoring");
            return ignored("Event not processed: malformed pull request payload");
        }
    };

    info!(
        pr_number = event.pr_number(),
        category = ?category,
        "Processing pull request event"
    );

    match orchestrator.process_pull_request(&event).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => e.into_response(),
    }
}
