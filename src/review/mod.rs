pub mod format;
pub mod orchestrator;

pub use orchestrator::{FileReview, PerFileReview, ProcessingSummary, ReviewOrchestrator};
