use crate::gh::parser::url_id;
use crate::gh::traits::ChecksApi;
use crate::gh::types::{CheckRun, PullRequest, WorkflowRun};
use color_eyre::eyre::{eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Upper bound on how long a log request waits for the workflow-run inventory.
pub const INVENTORY_WAIT: Duration = Duration::from_secs(5);

pub type Inventory = Arc<Vec<WorkflowRun>>;

/// Resolves a check run to its job log on disk, downloading it on first use.
///
/// Downloads need the workflow run behind a check run, which the API only exposes
/// through the repository's run listing. That listing is loaded once in the background
/// when the service starts and published through a watch channel.
pub struct LogService {
    api: Arc<dyn ChecksApi>,
    cache_dir: PathBuf,
    inventory: watch::Receiver<Option<Inventory>>,
    wait: Duration,
}

impl LogService {
    pub fn new(
        api: Arc<dyn ChecksApi>,
        cache_dir: PathBuf,
        inventory: watch::Receiver<Option<Inventory>>,
        wait: Duration,
    ) -> Self {
        Self {
            api,
            cache_dir,
            inventory,
            wait,
        }
    }

    /// Creates the service and starts loading the inventory for the PR's author and branch.
    pub fn start(api: Arc<dyn ChecksApi>, cache_dir: PathBuf, pr: &PullRequest) -> Self {
        let (tx, rx) = watch::channel(None);
        let loader = api.clone();
        let actor = pr.user.login.clone();
        let branch = pr.head.branch.clone();
        tokio::spawn(async move {
            let runs = load_inventory(loader.as_ref(), &actor, &branch).await;
            tracing::debug!(runs = runs.len(), "workflow run inventory loaded");
            if tx.send(Some(Arc::new(runs))).is_err() {
                tracing::warn!("inventory: log service dropped before load finished");
            }
        });
        Self::new(api, cache_dir, rx, INVENTORY_WAIT)
    }

    pub fn log_path(&self, check: &CheckRun) -> PathBuf {
        self.cache_dir.join(format!("{}.log", check.id))
    }

    /// Path of the check run's job log, downloaded into the cache if not already there.
    pub async fn logs(&self, check: &CheckRun) -> Result<PathBuf> {
        let path = self.log_path(check);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(check = check.id, "job log cache hit");
            return Ok(path);
        }

        let runs = self.inventory().await;
        let suite_id = check.suite_id().to_string();
        let run = runs
            .iter()
            .find(|r| url_id(&r.check_suite_url) == suite_id)
            .ok_or_else(|| eyre!("unable to find workflow for '{}'", check.name))?;

        let jobs = self.api.workflow_jobs(run.id).await?;
        let check_id = check.id.to_string();
        let job = jobs
            .iter()
            .find(|j| url_id(&j.check_run_url) == check_id)
            .ok_or_else(|| eyre!("unable to find workflow job for '{}'", check.name))?;

        let text = self.api.job_log(job.id).await?;
        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| eyre!("Failed to create cache directory {:?}: {e}", self.cache_dir))?;
        // Written under a temporary name so an interrupted download is never taken for a cache hit.
        let partial = path.with_extension("log.part");
        tokio::fs::write(&partial, text).await?;
        tokio::fs::rename(&partial, &path).await?;
        tracing::debug!(check = check.id, job = job.id, "job log downloaded");
        Ok(path)
    }

    async fn inventory(&self) -> Inventory {
        let mut rx = self.inventory.clone();
        let runs = match tokio::time::timeout(self.wait, rx.wait_for(Option::is_some)).await {
            Ok(Ok(runs)) => (*runs).clone().unwrap_or_default(),
            Ok(Err(_)) => {
                tracing::warn!("inventory: loader stopped without publishing");
                self.inventory.borrow().clone().unwrap_or_default()
            }
            Err(_) => {
                tracing::warn!("inventory: not ready after {}ms", self.wait.as_millis());
                Inventory::default()
            }
        };
        runs
    }
}

/// Pages through completed `pull_request` runs until an empty page or the reported total.
/// A failed request ends the load with an empty inventory.
pub async fn load_inventory(api: &dyn ChecksApi, actor: &str, branch: &str) -> Vec<WorkflowRun> {
    let mut runs = Vec::new();
    let mut page = 1;
    loop {
        match api.workflow_runs(actor, branch, page).await {
            Ok(batch) => {
                if batch.workflow_runs.is_empty() {
                    break;
                }
                runs.extend(batch.workflow_runs);
                if runs.len() as u64 >= batch.total_count {
                    break;
                }
                page += 1;
            }
            Err(e) => {
                tracing::warn!("inventory: listing workflow runs failed: {e}");
                return Vec::new();
            }
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gh::types::{
        CheckStatus, CheckSuiteRef, Commit, Conclusion, WorkflowJob, WorkflowRunPage,
    };
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct FakeApi {
        runs: Vec<WorkflowRun>,
        page_size: usize,
        fail_runs: bool,
        jobs: Vec<WorkflowJob>,
        log: String,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChecksApi for FakeApi {
        async fn pull_request(&self) -> Result<PullRequest> {
            Err(eyre!("not used"))
        }

        async fn commits(&self) -> Result<Vec<Commit>> {
            Err(eyre!("not used"))
        }

        async fn check_runs(&self, _sha: &str) -> Result<Vec<CheckRun>> {
            Err(eyre!("not used"))
        }

        async fn workflow_runs(&self, actor: &str, branch: &str, page: u32) -> Result<WorkflowRunPage> {
            self.calls.lock().push(format!("runs {actor} {branch} {page}"));
            if self.fail_runs {
                return Err(eyre!("HTTP 500"));
            }
            let size = self.page_size.max(1);
            let start = (page as usize - 1) * size;
            Ok(WorkflowRunPage {
                total_count: self.runs.len() as u64,
                workflow_runs: self.runs.iter().skip(start).take(size).cloned().collect(),
            })
        }

        async fn workflow_jobs(&self, run_id: u64) -> Result<Vec<WorkflowJob>> {
            self.calls.lock().push(format!("jobs {run_id}"));
            Ok(self.jobs.clone())
        }

        async fn job_log(&self, job_id: u64) -> Result<String> {
            self.calls.lock().push(format!("log {job_id}"));
            Ok(self.log.clone())
        }
    }

    fn workflow_run(id: u64, suite: u64) -> WorkflowRun {
        WorkflowRun {
            id,
            name: Some("CI".to_string()),
            check_suite_url: format!("https://api.github.com/repos/o/r/check-suites/{suite}"),
        }
    }

    fn job(id: u64, check_run: u64) -> WorkflowJob {
        WorkflowJob {
            id,
            name: "unit".to_string(),
            check_run_url: format!("https://api.github.com/repos/o/r/check-runs/{check_run}"),
        }
    }

    fn check(id: u64, suite: u64) -> CheckRun {
        CheckRun {
            id,
            name: "unit".to_string(),
            status: CheckStatus::Completed,
            conclusion: Some(Conclusion::Failure),
            check_suite: Some(CheckSuiteRef { id: suite }),
        }
    }

    fn cache_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("swt-service-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn ready(runs: Vec<WorkflowRun>) -> watch::Receiver<Option<Inventory>> {
        let (_tx, rx) = watch::channel(Some(Arc::new(runs)));
        rx
    }

    #[tokio::test]
    async fn downloads_into_cache_then_reuses_it() {
        let api = Arc::new(FakeApi {
            jobs: vec![job(70, 9), job(71, 1)],
            log: "2021-05-01T00:00:00Z ##[group]Run make\n".to_string(),
            ..FakeApi::default()
        });
        let dir = cache_dir("download");
        let svc = LogService::new(
            api.clone(),
            dir.clone(),
            ready(vec![workflow_run(5, 99), workflow_run(6, 10)]),
            Duration::from_secs(1),
        );

        let path = svc.logs(&check(1, 10)).await.unwrap();
        assert_eq!(path, dir.join("1.log"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("##[group]Run make"));
        assert_eq!(*api.calls.lock(), vec!["jobs 6".to_string(), "log 71".to_string()]);

        let again = svc.logs(&check(1, 10)).await.unwrap();
        assert_eq!(again, path);
        assert_eq!(api.calls.lock().len(), 2);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_workflow_is_reported_by_name() {
        let api = Arc::new(FakeApi::default());
        let dir = cache_dir("no-workflow");
        let svc = LogService::new(api, dir, ready(vec![workflow_run(5, 99)]), Duration::from_secs(1));

        let err = svc.logs(&check(1, 10)).await.unwrap_err();
        assert_eq!(err.to_string(), "unable to find workflow for 'unit'");
    }

    #[tokio::test]
    async fn missing_job_is_reported_by_name() {
        let api = Arc::new(FakeApi {
            jobs: vec![job(70, 9)],
            ..FakeApi::default()
        });
        let dir = cache_dir("no-job");
        let svc = LogService::new(api, dir, ready(vec![workflow_run(6, 10)]), Duration::from_secs(1));

        let err = svc.logs(&check(1, 10)).await.unwrap_err();
        assert_eq!(err.to_string(), "unable to find workflow job for 'unit'");
    }

    #[tokio::test]
    async fn wait_for_inventory_is_bounded() {
        let api = Arc::new(FakeApi::default());
        let (_tx, rx) = watch::channel(None);
        let svc = LogService::new(api, cache_dir("bounded"), rx, Duration::from_millis(50));

        let started = std::time::Instant::now();
        let err = svc.logs(&check(1, 10)).await.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(err.to_string().contains("unable to find workflow"));
    }

    #[tokio::test]
    async fn late_inventory_is_picked_up() {
        let api = Arc::new(FakeApi {
            jobs: vec![job(71, 1)],
            log: "line\n".to_string(),
            ..FakeApi::default()
        });
        let dir = cache_dir("late");
        let (tx, rx) = watch::channel(None);
        let svc = LogService::new(api, dir.clone(), rx, Duration::from_secs(5));

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let _ = tx.send(Some(Arc::new(vec![workflow_run(6, 10)])));
        });

        let path = svc.logs(&check(1, 10)).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "line\n");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn closed_inventory_channel_is_treated_as_empty() {
        let api = Arc::new(FakeApi::default());
        let (tx, rx) = watch::channel(None);
        drop(tx);
        let svc = LogService::new(api, cache_dir("closed"), rx, Duration::from_secs(5));

        let started = std::time::Instant::now();
        let err = svc.logs(&check(1, 10)).await.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(err.to_string(), "unable to find workflow for 'unit'");
    }

    #[tokio::test]
    async fn inventory_pages_until_total() {
        let api = FakeApi {
            runs: (1..=5).map(|i| workflow_run(i, i * 10)).collect(),
            page_size: 2,
            ..FakeApi::default()
        };
        let runs = load_inventory(&api, "octocat", "feature").await;
        assert_eq!(runs.len(), 5);
        assert_eq!(
            *api.calls.lock(),
            vec![
                "runs octocat feature 1".to_string(),
                "runs octocat feature 2".to_string(),
                "runs octocat feature 3".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn inventory_failure_is_empty() {
        let api = FakeApi {
            runs: vec![workflow_run(1, 10)],
            fail_runs: true,
            ..FakeApi::default()
        };
        assert!(load_inventory(&api, "a", "b").await.is_empty());
    }
}
