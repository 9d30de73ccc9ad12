#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use pr_review_app::config::ReviewMode;
use pr_review_app::error::{ReviewAppError, Result};
use pr_review_app::github::signature::sign;
use pr_review_app::github::types::{
    ChangedFile, CommitRef, FileStatus, IssueComment, PullRequest, User,
};
use pr_review_app::github::GitHubGateway;
use pr_review_app::llm::ReviewGenerator;
use pr_review_app::review::ReviewOrchestrator;
use pr_review_app::{router, AppState};

pub const SECRET: &str = "It's a Secret to Everybody";
pub const OWNER: &str = "octocat";
pub const REPO: &str = "hello-world";
pub const HEAD_SHA: &str = "6dcb09b5b57875f334f61aebed695e2e4193db5e";

#[derive(Debug, Clone, PartialEq)]
pub enum GitHubCall {
    PullRequest { owner: String, repo: String, number: u64 },
    Files { owner: String, repo: String, number: u64 },
    Content { path: String, git_ref: String },
    Diff { owner: String, repo: String, number: u64 },
    Comment { number: u64, body: String },
}

/// GitHub gateway double that records every call.
pub struct StubGitHub {
    files: Vec<ChangedFile>,
    fail_status: Option<u16>,
    calls: Mutex<Vec<GitHubCall>>,
}

impl StubGitHub {
    pub fn with_files(files: Vec<ChangedFile>) -> Arc<Self> {
        Arc::new(Self {
            files,
            fail_status: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            files: Vec::new(),
            fail_status: Some(status),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<GitHubCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: GitHubCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.fail_status {
            Some(status) => Err(ReviewAppError::upstream(Some(status), "Bad credentials")),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GitHubGateway for StubGitHub {
    async fn get_pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest> {
        self.record(GitHubCall::PullRequest {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        })?;
        Ok(sample_pull_request(number))
    }

    async fn get_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ChangedFile>> {
        self.record(GitHubCall::Files {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        })?;
        Ok(self.files.clone())
    }

    async fn get_file_content(
        &self,
        _owner: &str,
        _repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<String> {
        self.record(GitHubCall::Content {
            path: path.to_string(),
            git_ref: git_ref.to_string(),
        })?;
        Ok(format!("// contents of {}", path))
    }

    async fn get_pull_request_diff(&self, owner: &str, repo: &str, number: u64) -> Result<String> {
        self.record(GitHubCall::Diff {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        })?;
        Ok("diff --git a/src/lib.rs b/src/lib.rs\n-old\n+new\n".to_string())
    }

    async fn add_pull_request_comment(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
        body: &str,
    ) -> Result<IssueComment> {
        self.record(GitHubCall::Comment {
            number,
            body: body.to_string(),
        })?;
        Ok(IssueComment {
            id: 1,
            body: body.to_string(),
            html_url: None,
            user: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewerCall {
    Changes(String),
    File { content: String, extension: String },
    Summary { title: String, files: Vec<String> },
    Diff(String),
}

/// LLM gateway double that records every request.
#[derive(Default)]
pub struct StubReviewer {
    fail: bool,
    calls: Mutex<Vec<ReviewerCall>>,
}

impl StubReviewer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<ReviewerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: ReviewerCall, answer: String) -> Result<String> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            Err(ReviewAppError::ReviewGeneration("model overloaded".to_string()))
        } else {
            Ok(answer)
        }
    }
}

#[async_trait]
impl ReviewGenerator for StubReviewer {
    async fn review_changes(&self, content: &str) -> Result<String> {
        self.record(ReviewerCall::Changes(content.to_string()), "Looks risky.".to_string())
    }

    async fn review_file(&self, content: &str, extension: &str) -> Result<String> {
        self.record(
            ReviewerCall::File {
                content: content.to_string(),
                extension: extension.to_string(),
            },
            format!("review of .{} file", extension),
        )
    }

    async fn summarize_pull_request(
        &self,
        title: &str,
        _description: &str,
        files: &[String],
    ) -> Result<String> {
        self.record(
            ReviewerCall::Summary {
                title: title.to_string(),
                files: files.to_vec(),
            },
            "Adds a parser.".to_string(),
        )
    }

    async fn analyze_diff(&self, diff: &str) -> Result<String> {
        self.record(ReviewerCall::Diff(diff.to_string()), "Renames a value.".to_string())
    }
}

pub fn app(
    github: &Arc<StubGitHub>,
    reviewer: Option<&Arc<StubReviewer>>,
    mode: ReviewMode,
    post_comment: bool,
) -> Router {
    let github: Arc<dyn GitHubGateway> = github.clone();
    let reviewer = reviewer.map(|r| r.clone() as Arc<dyn ReviewGenerator>);
    let orchestrator = ReviewOrchestrator::new(github, reviewer, mode, post_comment);
    router(AppState::new(SECRET, orchestrator))
}

pub fn signed_request(uri: &str, event: Option<&str>, body: &Value, secret: &str) -> Request<Body> {
    let bytes = serde_json::to_vec(body).unwrap();
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-hub-signature-256", sign(&bytes, secret))
        .header("x-github-delivery", "72d3162e-cc78-11e3-81ab-4c9367dc0958");
    if let Some(event) = event {
        builder = builder.header("x-github-event", event);
    }
    builder.body(Body::from(bytes)).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn sample_pull_request(number: u64) -> PullRequest {
    PullRequest {
        number,
        title: "Add parser".to_string(),
        body: Some("Implements the expression parser.".to_string()),
        html_url: Some(format!("https://github.com/{}/{}/pull/{}", OWNER, REPO, number)),
        state: Some("open".to_string()),
        head: CommitRef {
            ref_field: "feature/parser".to_string(),
            sha: HEAD_SHA.to_string(),
        },
        base: CommitRef {
            ref_field: "main".to_string(),
            sha: "9049f1265b7d61be4a8904a9a27120d2064dab3b".to_string(),
        },
        user: User {
            login: OWNER.to_string(),
        },
        additions: 12,
        deletions: 3,
        changed_files: 3,
    }
}

pub fn pr_payload(action: &str, number: u64) -> Value {
    json!({
        "action": action,
        "number": number,
        "pull_request": serde_json::to_value(sample_pull_request(number)).unwrap(),
        "repository": {
            "name": REPO,
            "full_name": format!("{}/{}", OWNER, REPO),
            "owner": { "login": OWNER }
        },
        "sender": { "login": OWNER }
    })
}

pub fn changed_file(name: &str, status: FileStatus, patch: Option<&str>) -> ChangedFile {
    ChangedFile {
        filename: name.to_string(),
        status,
        additions: 4,
        deletions: 1,
        patch: patch.map(str::to_string),
    }
}

/// A modified source file, a binary without a patch, and a removed file.
pub fn three_files() -> Vec<ChangedFile> {
    vec![
        changed_file(
            "src/parser.rs",
            FileStatus::Modified,
            Some("@@ -1,3 +1,4 @@\n fn parse() {\n+    todo!()\n }"),
        ),
        changed_file("assets/logo.png", FileStatus::Added, None),
        changed_file("src/legacy.rs", FileStatus::Removed, Some("@@ -1 +0,0 @@\n-fn old() {}")),
    ]
}
