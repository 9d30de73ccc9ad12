//! Turns a reviewable pull request event into GitHub fetches and LLM requests.

use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::ReviewMode;
use crate::error::{ReviewAppError, Result};
use crate::github::client::{get_pull_request_full_info, GitHubGateway};
use crate::github::types::{ChangedFile, FileStatus, PullRequest, WebhookPayload};
use crate::llm::ReviewGenerator;
use crate::review::format;

pub const PROCESSED_MESSAGE: &str = "Pull request processed successfully";

/// Response body for a handled pull request webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingSummary {
    pub message: String,
    pub pr_number: u64,
    pub files_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_reviews: Option<Vec<FileReview>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReview {
    pub filename: String,
    pub review: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerFileReview {
    pub summary: String,
    pub file_reviews: Vec<FileReview>,
    pub files_count: usize,
}

#[derive(Clone)]
pub struct ReviewOrchestrator {
    github: Arc<dyn GitHubGateway>,
    reviewer: Option<Arc<dyn ReviewGenerator>>,
    mode: ReviewMode,
    post_comment: bool,
}

impl ReviewOrchestrator {
    pub fn new(
        github: Arc<dyn GitHubGateway>,
        reviewer: Option<Arc<dyn ReviewGenerator>>,
        mode: ReviewMode,
        post_comment: bool,
    ) -> Self {
        Self {
            github,
            reviewer,
            mode,
            post_comment,
        }
    }

    pub fn review_enabled(&self) -> bool {
        self.reviewer.is_some()
    }

    /// Fetches the unified diff of a pull request and asks the model to analyze it.
    #[instrument(skip(self), fields(pr_number = number))]
    pub async fn analyze_diff(&self, owner: &str, repo: &str, number: u64) -> Result<String> {
        let reviewer = self
            .reviewer
            .as_deref()
            .ok_or(ReviewAppError::ReviewUnavailable)?;

        let diff = self.github.get_pull_request_diff(owner, repo, number).await?;
        info!(pr_number = number, diff_len = diff.len(), "Fetched pull request diff");

        reviewer.analyze_diff(&diff).await
    }

    /// Handles an opened or synchronized pull request.
    ///
    /// Any failure is logged and surfaced as [`ReviewAppError::Processing`];
    /// no partial result is returned.
    #[instrument(
        name = "pull_request",
        skip(self, event),
        fields(
            pr_number = event.pr_number(),
            owner = %event.owner(),
            repo = %event.repo(),
            action = %event.action,
        )
    )]
    pub async fn process_pull_request(&self, event: &WebhookPayload) -> Result<ProcessingSummary> {
        let outcome = match (&self.reviewer, self.mode) {
            (None, _) => self.log_only(event).await,
            (Some(reviewer), ReviewMode::Combined) => {
                self.review_combined(reviewer.as_ref(), event).await
            }
            (Some(_), ReviewMode::PerFile) => {
                self.review_per_file(event).await.map(|review| ProcessingSummary {
                    message: PROCESSED_MESSAGE.to_string(),
                    pr_number: event.pr_number(),
                    files_count: review.files_count,
                    summary: Some(review.summary),
                    file_reviews: Some(review.file_reviews),
                })
            }
        };

        outcome.map_err(|e| {
            error!(error = %e, "Failed to process pull request");
            ReviewAppError::Processing(e.to_string())
        })
    }

    /// Summary plus one review per changed file that still exists and has a patch.
    ///
    /// PR details and the file listing are fetched concurrently, and the
    /// per-file reviews run concurrently once the summary is in.
    pub async fn review_per_file(&self, event: &WebhookPayload) -> Result<PerFileReview> {
        let reviewer = self
            .reviewer
            .as_deref()
            .ok_or(ReviewAppError::ReviewUnavailable)?;

        let (owner, repo, number) = (event.owner(), event.repo(), event.pr_number());
        let (details, files) =
            get_pull_request_full_info(self.github.as_ref(), owner, repo, number).await?;
        log_pull_request(&details, &files);

        let filenames: Vec<String> = files.iter().map(|f| f.filename.clone()).collect();
        let summary = reviewer
            .summarize_pull_request(
                &details.title,
                details.body.as_deref().unwrap_or(""),
                &filenames,
            )
            .await?;
        info!(pr_number = number, summary = %summary, "Pull request summary generated");

        let head_sha = event.pull_request.head.sha.as_str();
        let reviews = files
            .iter()
            .filter(|file| is_individually_reviewable(file))
            .map(|file| async move {
                let content = self
                    .github
                    .get_file_content(owner, repo, &file.filename, head_sha)
                    .await?;
                let review = reviewer.review_file(&content, file.extension()).await?;
                debug!(pr_number = number, filename = %file.filename, "File reviewed");
                Ok::<_, ReviewAppError>(FileReview {
                    filename: file.filename.clone(),
                    review,
                })
            });

        let file_reviews = try_join_all(reviews).await?;
        info!(
            pr_number = number,
            reviewed = file_reviews.len(),
            files = files.len(),
            "Per-file review finished"
        );

        Ok(PerFileReview {
            summary,
            file_reviews,
            files_count: files.len(),
        })
    }

    async fn review_combined(
        &self,
        reviewer: &dyn ReviewGenerator,
        event: &WebhookPayload,
    ) -> Result<ProcessingSummary> {
        let (owner, repo, number) = (event.owner(), event.repo(), event.pr_number());

        let files = self.github.get_pull_request_files(owner, repo, number).await?;
        log_pull_request(&event.pull_request, &files);

        let input = format::build_review_input(&files);
        let review = reviewer.review_changes(&input).await?;
        info!(pr_number = number, review = %review, "Review generated");

        if self.post_comment {
            let body = format::format_review_comment(&review);
            if let Err(e) = self
                .github
                .add_pull_request_comment(owner, repo, number, &body)
                .await
            {
                warn!(pr_number = number, error = %e, "Failed to post review comment");
            }
        }

        Ok(summary_for(number, files.len()))
    }

    async fn log_only(&self, event: &WebhookPayload) -> Result<ProcessingSummary> {
        let (owner, repo, number) = (event.owner(), event.repo(), event.pr_number());

        let files = self.github.get_pull_request_files(owner, repo, number).await?;
        log_pull_request(&event.pull_request, &files);
        warn!(pr_number = number, "No LLM configured, skipping review");

        Ok(summary_for(number, files.len()))
    }
}

fn summary_for(pr_number: u64, files_count: usize) -> ProcessingSummary {
    ProcessingSummary {
        message: PROCESSED_MESSAGE.to_string(),
        pr_number,
        files_count,
        summary: None,
        file_reviews: None,
    }
}

fn is_individually_reviewable(file: &ChangedFile) -> bool {
    file.status != FileStatus::Removed && file.patch.is_some()
}

fn log_pull_request(pr: &PullRequest, files: &[ChangedFile]) {
    info!(
        pr_number = pr.number,
        title = %pr.title,
        author = %pr.user.login,
        head = %pr.head.ref_field,
        base = %pr.base.ref_field,
        commit = %pr.short_head_sha(),
        url = pr.html_url.as_deref().unwrap_or(""),
        "Pull request received"
    );

    if files.is_empty() {
        info!(pr_number = pr.number, "No changed files");
    }
    for file in files {
        info!(
            pr_number = pr.number,
            filename = %file.filename,
            status = %file.status,
            additions = file.additions,
            deletions = file.deletions,
            "Changed file"
        );
        debug!("{}", format::format_file_changes(file));
    }

    info!(
        pr_number = pr.number,
        files = files.len(),
        totals = %format::format_totals(pr),
        "Pull request totals"
    );
}
