use serde::Serialize;
use serde_json::Value;

pub const EVENT_HEADER: &str = "x-github-event";
pub const DELIVERY_HEADER: &str = "x-github-delivery";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    PrOpened,
    PrSynchronized,
    Unrecognized,
}

impl EventCategory {
    pub fn is_reviewable(&self) -> bool {
        !matches!(self, EventCategory::Unrecognized)
    }
}

pub struct WebhookClassifier;

impl WebhookClassifier {
    /// Categorizes a decoded webhook body by its `action` and `pull_request` fields.
    pub fn classify(payload: &Value) -> EventCategory {
        let has_pull_request = payload
            .get("pull_request")
            .map(|pr| !pr.is_null())
            .unwrap_or(false);

        let action = payload.get("action").and_then(|v| v.as_str());

        match (has_pull_request, action) {
            (true, Some("opened")) => EventCategory::PrOpened,
            (true, Some("synchronize")) => EventCategory::PrSynchronized,
            _ => EventCategory::Unrecognized,
        }
    }

    pub fn action(payload: &Value) -> &str {
        payload
            .get("action")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
    }
}
