pub mod client;
pub mod signature;
pub mod types;
pub mod webhooks;

pub use client::{get_pull_request_full_info, GitHubClient, GitHubGateway};
pub use webhooks::{EventCategory, WebhookClassifier};
