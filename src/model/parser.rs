//! Line-oriented parser for test-runner output.
//!
//! Recognised lines, checked in this order:
//!
//! | pattern                                   | effect                                   |
//! |-------------------------------------------|------------------------------------------|
//! | `Suite: <rest>`                           | new suite + synthetic main run           |
//! | `Passed: N \| Failed: N \| Skipped: N`    | appended to the suite title              |
//! | `Total: N \| Focused: N \| Pending: N`    | added to the suite's test count          |
//! | `=== RUN <name>`                          | new run (or deferred main run name)      |
//! | `=== <ACTION> <name>`                     | switch current run                       |
//! | `--- <RESULT>: <name> (…)`                | closes the current suite and run         |
//! | `--- FAIL: <name> (…)`                    | marks every run called `<name>` failed   |
//!
//! Anything else is captured as output of the current run.

use super::ids::IdCounter;
use super::result::{Step, TestRun, TestSuite};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("static pattern compiles")
}

static SUITE: LazyLock<Regex> = LazyLock::new(|| pattern(r"^Suite: .+$"));
static TALLY: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^Passed: \d+ \| Failed: \d+ \| Skipped: \d+$"));
static TOTAL: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^Total: (\d+) \| Focused: \d+ \| Pending: \d+$"));
static RUN: LazyLock<Regex> = LazyLock::new(|| pattern(r"^=== RUN\s+(\S+)$"));
static ACTION: LazyLock<Regex> = LazyLock::new(|| pattern(r"^=== [A-Z]+\s+(\S+)$"));
static REPORT: LazyLock<Regex> = LazyLock::new(|| pattern(r"^--- [A-Z]+: (\S+) \(.+$"));
static FAIL: LazyLock<Regex> = LazyLock::new(|| pattern(r"^\s*--- FAIL: (\S+) \(.+$"));

/// Position of a run inside the step being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RunRef {
    suite: usize,
    run: usize,
}

/// Rebuilds suites and runs from test-runner output, one line at a time.
///
/// The same state machine backs both entry points: [`TestOutputParser::parse_step`]
/// walks a step's already collected lines, and [`crate::stream`] feeds a live source
/// through [`TestOutputParser::parse_line`].
#[derive(Debug, Default)]
pub struct TestOutputParser {
    current_suite: Option<String>,
    current_run: Option<String>,
    /// Most recently declared suite; tallies printed after a report line land here.
    last_suite: Option<usize>,
    suite_index: HashMap<String, usize>,
    run_index: HashMap<String, HashMap<String, usize>>,
    failure_index: HashMap<String, Vec<RunRef>>,

    // Output seen before the first suite banner of a block is held back and handed to
    // the next suite's main run.
    pending_main_name: String,
    pending_main_lines: Vec<String>,
    pending_adopted: bool,
}

impl TestOutputParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every line already collected in `step` (batch mode).
    pub fn parse_step(ids: &mut IdCounter, step: &mut Step) {
        let mut parser = Self::new();
        let lines = std::mem::take(&mut step.lines);
        for line in &lines {
            parser.parse_line(ids, step, line);
        }
        step.lines = lines;
        parser.finish(step);
        tracing::debug!(
            step = step.id,
            suites = step.test_suites.len(),
            stray = step.stray_lines.len(),
            "parsed step"
        );
    }

    /// Applies one line of output to `step`.
    pub fn parse_line(&mut self, ids: &mut IdCounter, step: &mut Step, line: &str) {
        if SUITE.is_match(line) {
            self.open_suite(ids, step, line);
            return;
        }

        if TALLY.is_match(line) {
            if let Some(suite) = self.tally_target(step) {
                suite.title = format!("{} ({line})", suite.title);
            }
            return;
        }

        if let Some(caps) = TOTAL.captures(line) {
            let total: u64 = caps[1].parse().unwrap_or(0);
            if let Some(suite) = self.tally_target(step) {
                suite.test_count = suite.test_count.saturating_add(total);
            }
            return;
        }

        if let Some(caps) = RUN.captures(line) {
            self.open_run(ids, step, &caps[1]);
            return;
        }

        if let Some(caps) = ACTION.captures(line) {
            if self.current_suite.is_some() {
                self.current_run = Some(caps[1].to_string());
            }
            return;
        }

        let is_report = REPORT.is_match(line);
        if is_report {
            self.current_suite = None;
            self.current_run = None;
        }

        if let Some(caps) = FAIL.captures(line) {
            self.mark_failed(step, &caps[1]);
            return;
        }

        if !is_report {
            self.capture(step, line);
        }
    }

    /// Flushes deferred main-run output that no suite ever claimed.
    pub fn finish(&mut self, step: &mut Step) {
        if !self.pending_adopted && !self.pending_main_lines.is_empty() {
            step.stray_lines.append(&mut self.pending_main_lines);
            self.pending_adopted = true;
        }
    }

    fn open_suite(&mut self, ids: &mut IdCounter, step: &mut Step, line: &str) {
        let suite_id = ids.allocate();
        let main_run = TestRun {
            lines: self.pending_main_lines.clone(),
            ..TestRun::new(ids.allocate(), self.pending_main_name.clone())
        };
        self.pending_adopted = true;

        let position = step.test_suites.len();
        step.test_suites.push(TestSuite {
            id: suite_id,
            title: line.to_string(),
            test_count: 0,
            selected: false,
            test_runs: vec![main_run],
        });

        self.suite_index.insert(line.to_string(), position);
        self.run_index
            .insert(line.to_string(), HashMap::from([(self.pending_main_name.clone(), 0)]));
        let main_name = self.pending_main_name.clone();
        self.index_failure(&main_name, RunRef { suite: position, run: 0 });

        self.current_suite = Some(line.to_string());
        self.current_run = None;
        self.last_suite = Some(position);
    }

    fn open_run(&mut self, ids: &mut IdCounter, step: &mut Step, name: &str) {
        self.current_run = Some(name.to_string());

        let Some(suite_title) = self.current_suite.clone() else {
            // No suite yet: this run's output belongs to whichever suite is declared next.
            self.pending_main_name = name.to_string();
            self.pending_main_lines.clear();
            self.pending_adopted = false;
            return;
        };

        let Some(&position) = self.suite_index.get(&suite_title) else {
            return;
        };
        let Some(suite) = step.test_suites.get_mut(position) else {
            return;
        };
        let run = suite.test_runs.len();
        suite.test_runs.push(TestRun::new(ids.allocate(), name));

        self.run_index
            .entry(suite_title)
            .or_default()
            .insert(name.to_string(), run);
        self.index_failure(name, RunRef { suite: position, run });
    }

    fn index_failure(&mut self, name: &str, run: RunRef) {
        let refs = self.failure_index.entry(name.to_string()).or_default();
        if !refs.contains(&run) {
            refs.push(run);
        }
    }

    fn mark_failed(&self, step: &mut Step, name: &str) {
        let Some(refs) = self.failure_index.get(name) else {
            return;
        };
        for r in refs {
            if let Some(run) = step
                .test_suites
                .get_mut(r.suite)
                .and_then(|s| s.test_runs.get_mut(r.run))
            {
                run.success = false;
            }
        }
    }

    fn tally_target<'a>(&self, step: &'a mut Step) -> Option<&'a mut TestSuite> {
        let position = match &self.current_suite {
            Some(title) => self.suite_index.get(title).copied(),
            None => self.last_suite,
        }?;
        step.test_suites.get_mut(position)
    }

    fn capture(&mut self, step: &mut Step, line: &str) {
        match (&self.current_suite, &self.current_run) {
            (None, None) => step.stray_lines.push(line.to_string()),
            (None, Some(_)) => self.pending_main_lines.push(line.to_string()),
            (Some(suite_title), Some(run_name)) => {
                let position = self
                    .suite_index
                    .get(suite_title)
                    .copied()
                    .zip(self.run_index.get(suite_title).and_then(|r| r.get(run_name)).copied());
                let Some((suite, run)) = position else {
                    step.stray_lines.push(line.to_string());
                    return;
                };
                let Some(run) = step
                    .test_suites
                    .get_mut(suite)
                    .and_then(|s| s.test_runs.get_mut(run))
                else {
                    return;
                };
                // leading blank lines are dropped
                if line.trim().is_empty() && run.lines.is_empty() {
                    return;
                }
                run.lines.push(line.to_string());
            }
            (Some(_), None) => step.stray_lines.push(line.to_string()),
        }
    }
}
