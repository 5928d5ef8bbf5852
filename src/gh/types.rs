use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Queued,
    InProgress,
    Completed,
    Waiting,
    Requested,
    Pending,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Success,
    Failure,
    Neutral,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Stale,
    StartupFailure,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub user: User,
    pub head: HeadRef,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct User {
    pub login: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct HeadRef {
    #[serde(rename = "ref")]
    pub branch: String,
    pub sha: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Commit {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CommitDetail {
    pub message: String,
    #[serde(default)]
    pub committer: Option<Signature>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl Commit {
    pub fn committed_at(&self) -> Option<DateTime<Utc>> {
        self.commit.committer.as_ref().and_then(|c| c.date)
    }

    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }

    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.commit.message.lines().next().unwrap_or_default()
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CheckRun {
    pub id: u64,
    pub name: String,
    pub status: CheckStatus,
    pub conclusion: Option<Conclusion>,
    #[serde(default)]
    pub check_suite: Option<CheckSuiteRef>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CheckSuiteRef {
    pub id: u64,
}

impl CheckRun {
    /// Job logs are only offered for runs that finished with a pass or a fail.
    pub fn has_logs(&self) -> bool {
        self.status == CheckStatus::Completed
            && matches!(self.conclusion, Some(Conclusion::Success | Conclusion::Failure))
    }

    pub fn suite_id(&self) -> u64 {
        self.check_suite.as_ref().map_or(0, |s| s.id)
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub check_suite_url: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct WorkflowRunPage {
    pub total_count: u64,
    pub workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct WorkflowJob {
    pub id: u64,
    pub name: String,
    pub check_run_url: String,
}
