use crate::gh::types::{CheckRun, Commit, PullRequest, WorkflowJob, WorkflowRunPage};
use async_trait::async_trait;
use color_eyre::eyre::Result;

/// The GitHub calls the browser needs for one pull request.
#[async_trait]
pub trait ChecksApi: Send + Sync {
    async fn pull_request(&self) -> Result<PullRequest>;
    async fn commits(&self) -> Result<Vec<Commit>>;
    async fn check_runs(&self, sha: &str) -> Result<Vec<CheckRun>>;
    /// One page (1-based, 100 per page) of completed `pull_request` workflow runs.
    async fn workflow_runs(&self, actor: &str, branch: &str, page: u32) -> Result<WorkflowRunPage>;
    async fn workflow_jobs(&self, run_id: u64) -> Result<Vec<WorkflowJob>>;
    async fn job_log(&self, job_id: u64) -> Result<String>;
}
