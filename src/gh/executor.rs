use crate::gh::parser;
use crate::gh::traits::ChecksApi;
use crate::gh::types::{CheckRun, Commit, PullRequest, WorkflowJob, WorkflowRunPage};
use async_trait::async_trait;
use color_eyre::eyre::{eyre, Result};
use std::time::Duration;
use tokio::process::Command;

const GH_TIMEOUT: Duration = Duration::from_secs(30);
const LOG_TIMEOUT: Duration = Duration::from_secs(120);

/// `gh api` client scoped to one pull request.
pub struct GhExecutor {
    pub repo: String,
    pub pr: u64,
}

impl GhExecutor {
    pub fn new(repo: String, pr: u64) -> Self {
        Self { repo, pr }
    }

    pub async fn check_available() -> Result<()> {
        run_gh(&["auth", "status"], GH_TIMEOUT).await.map(|_| ())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("repos/{}/{path}", self.repo)
    }
}

#[async_trait]
impl ChecksApi for GhExecutor {
    async fn pull_request(&self) -> Result<PullRequest> {
        let path = self.endpoint(&format!("pulls/{}", self.pr));
        let json = run_gh(&["api", &path], GH_TIMEOUT).await?;
        parser::parse_pull_request(&json)
    }

    async fn commits(&self) -> Result<Vec<Commit>> {
        let path = self.endpoint(&format!("pulls/{}/commits?per_page=100", self.pr));
        let json = run_gh(&["api", &path], GH_TIMEOUT).await?;
        parser::parse_commits(&json)
    }

    async fn check_runs(&self, sha: &str) -> Result<Vec<CheckRun>> {
        let path = self.endpoint(&format!("commits/{sha}/check-runs?per_page=100"));
        let json = run_gh(&["api", &path], GH_TIMEOUT).await?;
        parser::parse_check_runs(&json)
    }

    async fn workflow_runs(&self, actor: &str, branch: &str, page: u32) -> Result<WorkflowRunPage> {
        let path = self.endpoint("actions/runs");
        let actor = format!("actor={actor}");
        let branch = format!("branch={branch}");
        let page = format!("page={page}");
        let json = run_gh(
            &[
                "api",
                "-X",
                "GET",
                &path,
                "-f",
                &actor,
                "-f",
                &branch,
                "-f",
                "event=pull_request",
                "-f",
                "status=completed",
                "-f",
                "per_page=100",
                "-f",
                &page,
            ],
            GH_TIMEOUT,
        )
        .await?;
        parser::parse_workflow_runs(&json)
    }

    async fn workflow_jobs(&self, run_id: u64) -> Result<Vec<WorkflowJob>> {
        let path = self.endpoint(&format!("actions/runs/{run_id}/jobs?filter=latest"));
        let json = run_gh(&["api", &path], GH_TIMEOUT).await?;
        parser::parse_jobs(&json)
    }

    async fn job_log(&self, job_id: u64) -> Result<String> {
        let path = self.endpoint(&format!("actions/jobs/{job_id}/logs"));
        run_gh(&["api", &path], LOG_TIMEOUT).await
    }
}

async fn run_gh(args: &[&str], limit: Duration) -> Result<String> {
    let start = std::time::Instant::now();
    let output = tokio::time::timeout(limit, Command::new("gh").args(args).output())
        .await
        .map_err(|_| eyre!("gh command timed out after {}s", limit.as_secs()))?
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                eyre!("gh CLI not found. Install it from https://cli.github.com/")
            } else {
                eyre!("Failed to run gh: {}", e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(eyre!("{}", classify_gh_error(&stderr)));
    }

    tracing::debug!(
        args = ?args,
        elapsed_ms = start.elapsed().as_millis(),
        "gh command completed"
    );
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

pub fn classify_gh_error(stderr: &str) -> String {
    if stderr.contains("not logged") || stderr.contains("auth login") {
        "Not authenticated with gh. Run `gh auth login` first.".to_string()
    } else if stderr.contains("HTTP 404") || stderr.contains("Not Found") {
        "Pull request or repository not found (check owner/repo and number).".to_string()
    } else if stderr.contains("API rate limit") {
        "GitHub API rate limit exceeded, try again later.".to_string()
    } else {
        let trimmed = stderr.trim();
        if trimmed.is_empty() {
            "gh command failed".to_string()
        } else {
            format!("gh command failed: {trimmed}")
        }
    }
}
