//! GitHub REST access for pull request data.
//!
//! [`GitHubGateway`] is the seam request handlers depend on; [`GitHubClient`] is
//! the octocrab-backed implementation. Every failure surfaces as
//! [`ReviewAppError::Upstream`] carrying the HTTP status when GitHub sent one.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{ReviewAppError, Result};
use crate::github::types::{ChangedFile, IssueComment, PullRequest};

/// GitHub caps the file listing page size at 100; later pages are not requested.
const FILES_PER_PAGE: &str = "100";

#[async_trait]
pub trait GitHubGateway: Send + Sync {
    async fn get_pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest>;

    /// Changed files in API order. Only the first page is fetched.
    async fn get_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ChangedFile>>;

    /// Decoded content of a single file at `git_ref`.
    async fn get_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<String>;

    /// The pull request rendered with the unified-diff media type.
    async fn get_pull_request_diff(&self, owner: &str, repo: &str, number: u64) -> Result<String>;

    async fn add_pull_request_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<IssueComment>;
}

/// Fetches PR metadata and the file listing concurrently.
pub async fn get_pull_request_full_info(
    gateway: &dyn GitHubGateway,
    owner: &str,
    repo: &str,
    number: u64,
) -> Result<(PullRequest, Vec<ChangedFile>)> {
    tokio::try_join!(
        gateway.get_pull_request(owner, repo, number),
        gateway.get_pull_request_files(owner, repo, number),
    )
}

pub struct GitHubClient {
    client: Octocrab,
    timeout: Duration,
}

impl GitHubClient {
    pub fn new(token: &str, base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if let Some(url) = base_url {
            builder = builder.base_uri(url).map_err(|e| {
                ReviewAppError::Config(format!("Invalid GitHub API URL {}: {}", url, e))
            })?;
        }
        builder.add_retry_config(RetryConfig::None);

        let client = builder.build().map_err(|e| {
            ReviewAppError::Config(format!("Failed to create GitHub client: {}", e))
        })?;

        Ok(Self { client, timeout })
    }

    async fn call<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, octocrab::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(ReviewAppError::from),
            Err(_) => Err(ReviewAppError::upstream(
                None,
                format!("{} timed out after {}s", operation, self.timeout.as_secs()),
            )),
        }
    }
}

#[async_trait]
impl GitHubGateway for GitHubClient {
    async fn get_pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest> {
        debug!("Fetching pull request {}/{}#{}", owner, repo, number);
        let route = format!("/repos/{}/{}/pulls/{}", owner, repo, number);
        self.call("get pull request", self.client.get(route, None::<&()>))
            .await
    }

    async fn get_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ChangedFile>> {
        debug!("Listing files of {}/{}#{}", owner, repo, number);
        let route = format!("/repos/{}/{}/pulls/{}/files", owner, repo, number);
        let files: Vec<ChangedFile> = self
            .call(
                "list pull request files",
                self.client
                    .get(route, Some(&[("per_page", FILES_PER_PAGE)][..])),
            )
            .await?;

        info!(
            owner,
            repo,
            pr_number = number,
            files = files.len(),
            "Fetched pull request files"
        );
        Ok(files)
    }

    async fn get_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<String> {
        debug!("Fetching file content: {}/{}:{}@{}", owner, repo, path, git_ref);
        let route = format!(
            "/repos/{}/{}/contents/{}",
            owner,
            repo,
            encode_path(path)
        );
        let response: ContentsResponse = self
            .call(
                "get file content",
                self.client.get(route, Some(&[("ref", git_ref)][..])),
            )
            .await?;

        response.into_text(path)
    }

    async fn get_pull_request_diff(&self, owner: &str, repo: &str, number: u64) -> Result<String> {
        debug!("Fetching diff of {}/{}#{}", owner, repo, number);
        self.call(
            "get pull request diff",
            self.client.pulls(owner, repo).get_diff(number),
        )
        .await
    }

    async fn add_pull_request_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<IssueComment> {
        let route = format!("/repos/{}/{}/issues/{}/comments", owner, repo, number);
        let comment: IssueComment = self
            .call(
                "create comment",
                self.client
                    .post(route, Some(&serde_json::json!({ "body": body }))),
            )
            .await?;

        info!(owner, repo, pr_number = number, comment_id = comment.id, "Posted review comment");
        Ok(comment)
    }
}

/// The contents endpoint answers with an array for directories and an object otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Listing(Vec<serde_json::Value>),
    Entry(ContentEntry),
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl ContentsResponse {
    fn into_text(self, path: &str) -> Result<String> {
        let entry = match self {
            ContentsResponse::Entry(entry) if entry.kind == "file" => entry,
            ContentsResponse::Entry(entry) => {
                return Err(ReviewAppError::NotAFile(format!("{} ({})", path, entry.kind)))
            }
            ContentsResponse::Listing(_) => {
                return Err(ReviewAppError::NotAFile(format!("{} (dir)", path)))
            }
        };

        let content = entry.content.unwrap_or_default();
        match entry.encoding.as_deref() {
            Some("base64") => {
                let compact: String = content.split_whitespace().collect();
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(compact)
                    .map_err(|e| {
                        ReviewAppError::upstream(
                            None,
                            format!("Invalid base64 content for {}: {}", path, e),
                        )
                    })?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            _ => Ok(content),
        }
    }
}

/// Percent-encodes a repository path, keeping `/` separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}
