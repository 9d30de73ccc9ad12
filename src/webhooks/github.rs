use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::ReviewAppError;
use crate::github::signature;
use crate::github::webhooks::{DELIVERY_HEADER, EVENT_HEADER};
use crate::server::AppState;
use crate::webhooks::{header_str, pull_request, signature_header};

/// `POST /webhook`: verifies the delivery, then dispatches on `X-GitHub-Event`.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let delivery = header_str(&headers, DELIVERY_HEADER)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let span = info_span!("webhook", delivery = %delivery);

    dispatch(state, headers, body).instrument(span).await
}

async fn dispatch(state: AppState, headers: HeaderMap, body: Bytes) -> Response {
    let signature = signature_header(&headers);
    if !signature::verify(&body, signature, &state.webhook_secret) {
        warn!(has_signature = signature.is_some(), "Webhook signature verification failed");
        return ReviewAppError::Signature("signature mismatch".to_string()).into_response();
    }

    let Some(event) = header_str(&headers, EVENT_HEADER) else {
        warn!("Missing GitHub event type");
        return ReviewAppError::MissingEventType.into_response();
    };

    info!(event, "Received webhook");

    match event {
        "pull_request" => {
            let payload: Value = match serde_json::from_slice(&body) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(error = %e, "Webhook body is not valid JSON, ignoring");
                    return ignored("Event not processed: payload is not valid JSON");
                }
            };
            pull_request::handle_pull_request_event(&state.orchestrator, &payload).await
        }
        "ping" => (StatusCode::OK, Json(serde_json::json!({ "message": "pong" }))).into_response(),
        other => {
            info!(event = other, "Unhandled webhook event");
            ignored(&format!("Event type '{}' not handled", other))
        }
    }
}

pub(crate) fn ignored(message: &str) -> Response {
    (StatusCode::OK, Json(serde_json::json!({ "message": message }))).into_response()
}
