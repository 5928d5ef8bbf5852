use crate::gh::types::{CheckRun, Commit};
use crate::model::{JobLog, Step, TestRun, TestSuite, Tier};
use crate::stream::SharedLog;
use std::sync::Arc;
use std::time::{Duration, Instant};

// UI constants
pub const SPINNER_FRAME_COUNT: usize = 10;
pub const ERROR_TTL_SECS: u64 = 10;
pub const NARROW_WIDTH_THRESHOLD: u16 = 60;

pub const NO_LOGS_MESSAGE: &str = "Sorry, logs only supported for 'success' or 'failure' runs";

/// Where the result tree comes from. Decides which screens exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    PullRequest,
    File,
    Stdin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Commits,
    Checks,
    Logs,
    Tests,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeLevel {
    Step,
    Suite,
    Run,
    StepLine,
    RunLine,
    AllPassed,
    NoOutput,
}

/// One visible row of the result tree. Indices point into the [`JobLog`] the rows were
/// built from; `id` is set for the rows that Toggle acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    pub level: TreeLevel,
    pub step_idx: usize,
    pub suite_idx: Option<usize>,
    pub run_idx: Option<usize>,
    pub line_idx: Option<usize>,
    pub id: Option<u64>,
    pub expanded: bool,
}

impl TreeItem {
    fn new(level: TreeLevel, step_idx: usize) -> Self {
        Self {
            level,
            step_idx,
            suite_idx: None,
            run_idx: None,
            line_idx: None,
            id: None,
            expanded: false,
        }
    }

    pub fn resolve<'a>(&self, log: &'a JobLog) -> Option<ResolvedItem<'a>> {
        let step = log.steps.get(self.step_idx)?;
        let suite = || step.test_suites.get(self.suite_idx?);
        let run = || suite()?.test_runs.get(self.run_idx?);
        match self.level {
            TreeLevel::Step => Some(ResolvedItem::Step {
                index: self.step_idx,
                step,
            }),
            TreeLevel::Suite => suite().map(ResolvedItem::Suite),
            TreeLevel::Run => run().map(ResolvedItem::Run),
            TreeLevel::StepLine => {
                let line_idx = self.line_idx?;
                let text = step.lines.get(line_idx)?;
                Some(ResolvedItem::StepLine {
                    number: line_idx + 1,
                    text,
                    failing: !step.success && line_idx + 1 == step.lines.len(),
                })
            }
            TreeLevel::RunLine => {
                let text = run()?.lines.get(self.line_idx?)?;
                Some(ResolvedItem::RunLine(text))
            }
            TreeLevel::AllPassed => Some(ResolvedItem::AllPassed),
            TreeLevel::NoOutput => Some(ResolvedItem::NoOutput),
        }
    }
}

pub enum ResolvedItem<'a> {
    Step { index: usize, step: &'a Step },
    Suite(&'a TestSuite),
    Run(&'a TestRun),
    StepLine { number: usize, text: &'a str, failing: bool },
    RunLine(&'a str),
    AllPassed,
    NoOutput,
}

impl ResolvedItem<'_> {
    /// Full, untruncated text of the row, shown in the detail pane.
    pub fn detail_text(&self) -> String {
        match self {
            ResolvedItem::Step { index, step } => format!("Step {index}: {}", step.title),
            ResolvedItem::Suite(suite) => suite.title.clone(),
            ResolvedItem::Run(run) => run.name.clone(),
            ResolvedItem::StepLine { text, .. } | ResolvedItem::RunLine(text) => (*text).to_string(),
            ResolvedItem::AllPassed => "Passed".to_string(),
            ResolvedItem::NoOutput => "No output captured".to_string(),
        }
    }
}

/// Flattens the visible part of the result tree into rows.
///
/// Every step gets a row. An open test step lists only its failed suites, an open suite
/// only its failed runs, an open run its output. An open step without tests lists its
/// numbered lines.
pub fn build_rows(log: &JobLog) -> Vec<TreeItem> {
    let mut items = Vec::new();
    for (step_idx, step) in log.steps.iter().enumerate() {
        items.push(TreeItem {
            id: Some(step.id),
            expanded: step.selected,
            ..TreeItem::new(TreeLevel::Step, step_idx)
        });
        if !step.selected {
            continue;
        }

        if !step.is_test() {
            if step.lines.is_empty() {
                items.push(TreeItem::new(TreeLevel::AllPassed, step_idx));
            }
            for line_idx in 0..step.lines.len() {
                items.push(TreeItem {
                    line_idx: Some(line_idx),
                    ..TreeItem::new(TreeLevel::StepLine, step_idx)
                });
            }
            continue;
        }

        let mut any_failed = false;
        for (suite_idx, suite) in step.test_suites.iter().enumerate() {
            if !suite.has_failures() {
                continue;
            }
            any_failed = true;
            items.push(TreeItem {
                suite_idx: Some(suite_idx),
                id: Some(suite.id),
                expanded: suite.selected,
                ..TreeItem::new(TreeLevel::Suite, step_idx)
            });
            if !suite.selected {
                continue;
            }
            for (run_idx, run) in suite.test_runs.iter().enumerate() {
                if run.success {
                    continue;
                }
                items.push(TreeItem {
                    suite_idx: Some(suite_idx),
                    run_idx: Some(run_idx),
                    id: Some(run.id),
                    expanded: run.selected,
                    ..TreeItem::new(TreeLevel::Run, step_idx)
                });
                if !run.selected {
                    continue;
                }
                if run.lines.is_empty() {
                    items.push(TreeItem {
                        suite_idx: Some(suite_idx),
                        run_idx: Some(run_idx),
                        ..TreeItem::new(TreeLevel::NoOutput, step_idx)
                    });
                }
                for line_idx in 0..run.lines.len() {
                    items.push(TreeItem {
                        suite_idx: Some(suite_idx),
                        run_idx: Some(run_idx),
                        line_idx: Some(line_idx),
                        ..TreeItem::new(TreeLevel::RunLine, step_idx)
                    });
                }
            }
        }
        if !any_failed {
            items.push(TreeItem::new(TreeLevel::AllPassed, step_idx));
        }
    }
    items
}

/// Wall-clock span of a live parse.
#[derive(Debug, Clone, Copy)]
pub struct StreamClock {
    pub started: Instant,
    pub finished: Option<Instant>,
}

impl StreamClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            finished: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.finished.is_none()
    }

    pub fn elapsed(&self) -> Duration {
        self.finished
            .unwrap_or_else(Instant::now)
            .saturating_duration_since(self.started)
    }
}

pub fn tests_label(count: u64) -> String {
    if count == 1 {
        "1 test".to_string()
    } else {
        format!("{count} tests")
    }
}

pub fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else {
        format!("{}h{:02}m{:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

pub struct AppState {
    pub source: Source,
    pub screen: Screen,
    pub title: String,

    // Pull request browsing
    pub commits: Vec<Commit>,
    pub commit_cursor: usize,
    pub checks: Vec<CheckRun>,
    pub checks_sha: Option<String>,
    pub check_cursor: usize,
    pub active_check: Option<u64>,

    // Result tree
    pub log: SharedLog,
    pub tree_items: Vec<TreeItem>,
    pub cursor: usize,
    pub follow_tail: bool,
    pub show_detail: bool,
    pub clock: Option<StreamClock>,
    pub dirty: bool,

    // Transient UI
    pub loading: Option<String>,
    pub error: Option<(String, Instant)>,
    pub spinner_frame: usize,
    pub should_quit: bool,
}

impl AppState {
    fn with(source: Source, screen: Screen, title: String, log: SharedLog) -> Self {
        Self {
            source,
            screen,
            title,
            commits: Vec::new(),
            commit_cursor: 0,
            checks: Vec::new(),
            checks_sha: None,
            check_cursor: 0,
            active_check: None,
            log,
            tree_items: Vec::new(),
            cursor: 0,
            follow_tail: false,
            show_detail: false,
            clock: None,
            dirty: false,
            loading: None,
            error: None,
            spinner_frame: 0,
            should_quit: false,
        }
    }

    pub fn for_pull_request(title: String) -> Self {
        Self::with(Source::PullRequest, Screen::Commits, title, SharedLog::default())
    }

    pub fn for_file(title: String, log: JobLog) -> Self {
        let mut state = Self::with(
            Source::File,
            Screen::Logs,
            title,
            Arc::new(parking_lot::Mutex::new(log)),
        );
        state.rebuild_tree();
        state
    }

    pub fn for_stream(title: String, log: SharedLog) -> Self {
        let mut state = Self::with(Source::Stdin, Screen::Tests, title, log);
        state.clock = Some(StreamClock::start());
        state.follow_tail = true;
        state.rebuild_tree();
        state
    }

    pub fn rebuild_tree(&mut self) {
        self.tree_items = build_rows(&self.log.lock());
        self.dirty = false;
        if self.tree_items.is_empty() {
            self.cursor = 0;
        } else if self.follow_tail || self.cursor >= self.tree_items.len() {
            self.cursor = self.tree_items.len() - 1;
        }
    }

    // --- Cursor movement ---

    pub fn move_cursor_up(&mut self) {
        match self.screen {
            Screen::Commits => self.commit_cursor = self.commit_cursor.saturating_sub(1),
            Screen::Checks => self.check_cursor = self.check_cursor.saturating_sub(1),
            Screen::Logs | Screen::Tests => {
                self.follow_tail = false;
                self.cursor = self.cursor.saturating_sub(1);
            }
        }
    }

    pub fn move_cursor_down(&mut self) {
        match self.screen {
            Screen::Commits => {
                if self.commit_cursor + 1 < self.commits.len() {
                    self.commit_cursor += 1;
                }
            }
            Screen::Checks => {
                if self.check_cursor + 1 < self.checks.len() {
                    self.check_cursor += 1;
                }
            }
            Screen::Logs | Screen::Tests => {
                self.follow_tail = false;
                if self.cursor + 1 < self.tree_items.len() {
                    self.cursor += 1;
                }
            }
        }
    }

    pub fn move_page(&mut self, rows: usize, down: bool) {
        for _ in 0..rows {
            if down {
                self.move_cursor_down();
            } else {
                self.move_cursor_up();
            }
        }
    }

    pub fn cursor_to_top(&mut self) {
        match self.screen {
            Screen::Commits => self.commit_cursor = 0,
            Screen::Checks => self.check_cursor = 0,
            Screen::Logs | Screen::Tests => {
                self.follow_tail = false;
                self.cursor = 0;
            }
        }
    }

    pub fn cursor_to_bottom(&mut self) {
        match self.screen {
            Screen::Commits => self.commit_cursor = self.commits.len().saturating_sub(1),
            Screen::Checks => self.check_cursor = self.checks.len().saturating_sub(1),
            Screen::Logs | Screen::Tests => {
                self.cursor = self.tree_items.len().saturating_sub(1);
                self.follow_tail = self.screen == Screen::Tests;
            }
        }
    }

    // --- Pull request screens ---

    pub fn set_commits(&mut self, commits: Vec<Commit>) {
        self.commits = commits;
        self.commit_cursor = 0;
    }

    pub fn current_commit(&self) -> Option<&Commit> {
        self.commits.get(self.commit_cursor)
    }

    pub fn set_checks(&mut self, sha: String, checks: Vec<CheckRun>) {
        self.checks = checks;
        self.checks_sha = Some(sha);
        self.check_cursor = 0;
        self.screen = Screen::Checks;
    }

    pub fn current_check(&self) -> Option<&CheckRun> {
        self.checks.get(self.check_cursor)
    }

    /// Check runs split into consecutive runs of the same check suite.
    pub fn check_groups(&self) -> Vec<&[CheckRun]> {
        self.checks.chunk_by(|a, b| a.suite_id() == b.suite_id()).collect()
    }

    pub fn open_log(&mut self, check_id: u64, log: JobLog) {
        *self.log.lock() = log;
        self.active_check = Some(check_id);
        self.screen = Screen::Logs;
        self.cursor = 0;
        self.show_detail = false;
        self.rebuild_tree();
    }

    /// Esc: one screen back. Returns false when there is nothing to go back to.
    pub fn back(&mut self) -> bool {
        if self.show_detail {
            self.show_detail = false;
            return true;
        }
        match (self.source, self.screen) {
            (Source::PullRequest, Screen::Logs) => {
                self.screen = Screen::Checks;
                true
            }
            (Source::PullRequest, Screen::Checks) => {
                self.screen = Screen::Commits;
                true
            }
            _ => false,
        }
    }

    // --- Result tree ---

    /// Enter/Space on the result tree: toggles the node under the cursor, or the detail
    /// pane when the row has nothing to toggle.
    pub fn activate(&mut self) -> Option<Tier> {
        let Some(item) = self.tree_items.get(self.cursor) else {
            return None;
        };
        let Some(id) = item.id else {
            self.show_detail = !self.show_detail;
            return None;
        };
        let tier = self.log.lock().toggle(id);
        self.follow_tail = false;
        self.rebuild_tree();
        if let Some(row) = self.tree_items.iter().position(|i| i.id == Some(id)) {
            self.cursor = row;
        }
        tier
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn detail_text(&self) -> Option<String> {
        let item = self.tree_items.get(self.cursor)?;
        let log = self.log.lock();
        item.resolve(&log).map(|r| r.detail_text())
    }

    pub fn test_count(&self) -> u64 {
        self.log.lock().test_count()
    }

    // --- Streaming ---

    pub fn stream_updated(&mut self) {
        self.dirty = true;
    }

    pub fn stream_done(&mut self) {
        if let Some(clock) = self.clock.as_mut() {
            if clock.finished.is_none() {
                clock.finished = Some(Instant::now());
            }
        }
        self.rebuild_tree();
    }

    pub fn is_streaming(&self) -> bool {
        self.clock.is_some_and(|c| c.is_running())
    }

    pub fn stream_status(&self) -> Option<String> {
        let clock = self.clock?;
        let count = tests_label(self.test_count());
        let elapsed = format_elapsed(clock.elapsed());
        Some(if clock.is_running() {
            format!("Running {count}... ({elapsed})")
        } else {
            format!("Completed {count}! ({elapsed})")
        })
    }

    // --- Transient UI ---

    pub fn start_loading(&mut self, msg: impl Into<String>) {
        self.loading = Some(msg.into());
    }

    pub fn end_loading(&mut self) {
        self.loading = None;
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAME_COUNT;
    }

    pub fn set_error(&mut self, msg: String) {
        self.error = Some((msg, Instant::now()));
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn prune_error(&mut self) {
        if let Some((_, ts)) = &self.error {
            if ts.elapsed().as_secs() >= ERROR_TTL_SECS {
                self.error = None;
            }
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|(msg, _)| msg.as_str())
    }
}
