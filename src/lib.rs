//! GitHub pull request review service.
//!
//! Receives signed `pull_request` webhook deliveries, gathers the changed
//! files through the GitHub REST API, and asks a chat-completion model for a
//! review of the diff.

pub mod config;
pub mod error;
pub mod github;
pub mod llm;
pub mod review;
pub mod server;
pub mod webhooks;

pub use error::ReviewAppError;
pub use server::{router, AppState};
