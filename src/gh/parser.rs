use crate::gh::types::{CheckRun, Commit, PullRequest, WorkflowJob, WorkflowRunPage};
use color_eyre::eyre::Result;

pub fn parse_pull_request(json: &str) -> Result<PullRequest> {
    Ok(serde_json::from_str(json)?)
}

/// Commits, newest committer date first.
pub fn parse_commits(json: &str) -> Result<Vec<Commit>> {
    let mut commits: Vec<Commit> = serde_json::from_str(json)?;
    commits.sort_by(|a, b| b.committed_at().cmp(&a.committed_at()));
    Ok(commits)
}

#[derive(serde::Deserialize)]
struct CheckRunsResponse {
    check_runs: Vec<CheckRun>,
}

/// Check runs ordered by check suite, so runs of one suite sit together.
pub fn parse_check_runs(json: &str) -> Result<Vec<CheckRun>> {
    let resp: CheckRunsResponse = serde_json::from_str(json)?;
    let mut runs = resp.check_runs;
    runs.sort_by_key(CheckRun::suite_id);
    Ok(runs)
}

pub fn parse_workflow_runs(json: &str) -> Result<WorkflowRunPage> {
    Ok(serde_json::from_str(json)?)
}

#[derive(serde::Deserialize)]
struct JobsResponse {
    jobs: Vec<WorkflowJob>,
}

pub fn parse_jobs(json: &str) -> Result<Vec<WorkflowJob>> {
    let resp: JobsResponse = serde_json::from_str(json)?;
    Ok(resp.jobs)
}

/// Last path segment of an API URL, e.g. the check suite id in `check_suite_url`.
pub fn url_id(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
}
