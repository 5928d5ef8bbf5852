//! Result tree produced by segmentation and parsing.
//!
//! Everything here is append-only once built. `selected` is the only field the UI
//! changes afterwards, and only through [`JobLog::toggle`](crate::model::JobLog::toggle).

/// One `##[group]Run …` section of a CI job log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub id: u64,
    pub title: String,
    pub success: bool,
    pub selected: bool,
    pub lines: Vec<String>,
    pub test_suites: Vec<TestSuite>,
    /// Output seen outside any test context. Kept for diagnostics, never rendered.
    pub stray_lines: Vec<String>,
}

impl Step {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            success: true,
            selected: false,
            lines: Vec::new(),
            test_suites: Vec::new(),
            stray_lines: Vec::new(),
        }
    }

    pub fn is_test(&self) -> bool {
        !self.test_suites.is_empty()
    }

    /// Suites with at least one failed run.
    pub fn failed_test_suites(&self) -> Vec<&TestSuite> {
        self.test_suites.iter().filter(|s| s.has_failures()).collect()
    }

    pub fn test_count(&self) -> u64 {
        self.test_suites.iter().map(|s| s.test_count).sum()
    }
}

/// One `Suite: …` banner. Run 0 is the synthetic main run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSuite {
    pub id: u64,
    pub title: String,
    pub test_count: u64,
    pub selected: bool,
    pub test_runs: Vec<TestRun>,
}

impl TestSuite {
    pub fn failed_test_runs(&self) -> Vec<&TestRun> {
        self.test_runs.iter().filter(|r| !r.success).collect()
    }

    pub fn has_failures(&self) -> bool {
        self.test_runs.iter().any(|r| !r.success)
    }

    /// The run holding output emitted before the suite banner.
    pub fn main_run(&self) -> Option<&TestRun> {
        self.test_runs.first()
    }
}

/// One `=== RUN <name>` subtest and its captured output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRun {
    pub id: u64,
    pub name: String,
    pub success: bool,
    pub selected: bool,
    pub lines: Vec<String>,
}

impl TestRun {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            success: true,
            selected: false,
            lines: Vec::new(),
        }
    }
}

/// Which tier of the tree an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Step,
    Suite,
    Run,
}

/// The ordered steps of one job log (or the single synthetic step of a live stream).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobLog {
    pub steps: Vec<Step>,
}

impl JobLog {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Sum of every suite's `Total:` count.
    pub fn test_count(&self) -> u64 {
        self.steps.iter().map(Step::test_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Locates an id in the tree, searching runs, then suites, then steps.
    pub fn locate(&self, id: u64) -> Option<Tier> {
        let suites = || self.steps.iter().flat_map(|s| s.test_suites.iter());
        if suites().flat_map(|s| s.test_runs.iter()).any(|r| r.id == id) {
            Some(Tier::Run)
        } else if suites().any(|s| s.id == id) {
            Some(Tier::Suite)
        } else if self.steps.iter().any(|s| s.id == id) {
            Some(Tier::Step)
        } else {
            None
        }
    }

    pub fn find_step(&self, id: u64) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// The raw lines of every step, in order, newline-terminated.
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for line in self.steps.iter().flat_map(|s| s.lines.iter()) {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Every id in the tree, in tree order.
    pub fn ids(&self) -> Vec<u64> {
        let mut ids = Vec::new();
        for step in &self.steps {
            ids.push(step.id);
            for suite in &step.test_suites {
                ids.push(suite.id);
                ids.extend(suite.test_runs.iter().map(|r| r.id));
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suite(id: u64, runs: Vec<TestRun>, test_count: u64) -> TestSuite {
        TestSuite {
            id,
            title: format!("Suite: s{id}"),
            test_count,
            selected: false,
            test_runs: runs,
        }
    }

    fn failed(id: u64, name: &str) -> TestRun {
        let mut run = TestRun::new(id, name);
        run.success = false;
        run
    }

    #[test]
    fn step_without_suites_is_not_a_test() {
        let step = Step::new(1, "make build");
        assert!(!step.is_test());
        assert!(step.success);
        assert!(step.failed_test_suites().is_empty());
    }

    #[test]
    fn failed_suites_need_a_failed_run() {
        let mut step = Step::new(1, "make test");
        step.test_suites.push(suite(2, vec![TestRun::new(3, ""), TestRun::new(4, "A")], 1));
        step.test_suites.push(suite(5, vec![TestRun::new(6, ""), failed(7, "B")], 1));

        assert!(step.is_test());
        let failed: Vec<u64> = step.failed_test_suites().iter().map(|s| s.id).collect();
        assert_eq!(failed, vec![5]);
    }

    #[test]
    fn failed_runs_filters_success() {
        let s = suite(1, vec![TestRun::new(2, ""), failed(3, "A"), TestRun::new(4, "B"), failed(5, "C")], 0);
        let names: Vec<&str> = s.failed_test_runs().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(s.main_run().map(|r| r.id), Some(2));
    }

    #[test]
    fn test_count_sums_across_steps() {
        let mut a = Step::new(1, "a");
        a.test_suites.push(suite(2, vec![TestRun::new(3, "")], 4));
        a.test_suites.push(suite(4, vec![TestRun::new(5, "")], 6));
        let mut b = Step::new(6, "b");
        b.test_suites.push(suite(7, vec![TestRun::new(8, "")], 10));

        let log = JobLog::new(vec![a, b]);
        assert_eq!(log.test_count(), 20);
    }

    #[test]
    fn locate_reports_tier() {
        let mut step = Step::new(1, "a");
        step.test_suites.push(suite(2, vec![TestRun::new(3, "")], 0));
        let log = JobLog::new(vec![step]);

        assert_eq!(log.locate(1), Some(Tier::Step));
        assert_eq!(log.locate(2), Some(Tier::Suite));
        assert_eq!(log.locate(3), Some(Tier::Run));
        assert_eq!(log.locate(99), None);
        assert_eq!(log.ids(), vec![1, 2, 3]);
        assert_eq!(log.find_step(1).map(|s| s.title.as_str()), Some("a"));
        assert!(log.find_step(2).is_none());
    }

    #[test]
    fn transcript_joins_step_lines() {
        let mut a = Step::new(1, "a");
        a.lines = vec!["x".to_string(), "y".to_string()];
        let b = Step::new(2, "b");
        let mut c = Step::new(3, "c");
        c.lines = vec!["z".to_string()];
        assert_eq!(JobLog::new(vec![a, b, c]).transcript(), "x\ny\nz\n");
        assert_eq!(JobLog::default().transcript(), "");
    }
}
