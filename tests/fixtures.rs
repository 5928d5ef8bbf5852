#![allow(dead_code)]

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use std::path::PathBuf;
use swt::gh::types::{CheckRun, CheckStatus, CheckSuiteRef, Conclusion};
use swt::model::{segment_str, IdCounter, JobLog};

/// Two steps: a checkout and a failing `make test` with one suite.
pub const JOB_LOG: &str = "\
2021-05-01T00:00:00.0Z ##[group]Run actions/checkout@v2
2021-05-01T00:00:00.1Z with:
2021-05-01T00:00:00.2Z   fetch-depth: 1
2021-05-01T00:00:01.0Z ##[endgroup]
2021-05-01T00:00:02.0Z Syncing repository
2021-05-01T00:00:03.0Z ##[group]Run make test
2021-05-01T00:00:04.0Z ##[endgroup]
2021-05-01T00:00:05.0Z === RUN TestAcceptance
2021-05-01T00:00:06.0Z Suite: acceptance/0.3
2021-05-01T00:00:07.0Z === RUN TestAcceptance/a
2021-05-01T00:00:08.0Z     a_test.go:12: boom
2021-05-01T00:00:09.0Z Passed: 0 | Failed: 1 | Skipped: 0
2021-05-01T00:00:10.0Z Total: 1 | Focused: 0 | Pending: 0
2021-05-01T00:00:11.0Z --- FAIL: TestAcceptance (0.10s)
2021-05-01T00:00:12.0Z     --- FAIL: TestAcceptance/a (0.05s)
2021-05-01T00:00:13.0Z ##[error]Process completed with exit code 1.
2021-05-01T00:00:14.0Z Post job cleanup.
2021-05-01T00:00:15.0Z [command]/usr/bin/git version
";

/// Plain `go test -v` output, as piped into the live view.
pub const TEST_OUTPUT: &str = "\
=== RUN TestAcceptance
starting
Suite: acceptance/0.3
=== RUN TestAcceptance/a
=== RUN TestAcceptance/b
boom
Passed: 1 | Failed: 1 | Skipped: 0
Total: 2 | Focused: 0 | Pending: 0
--- FAIL: TestAcceptance (0.10s)
    --- PASS: TestAcceptance/a (0.01s)
    --- FAIL: TestAcceptance/b (0.05s)
";

pub fn job_log() -> JobLog {
    segment_str(JOB_LOG, &mut IdCounter::new())
}

pub fn press(code: KeyCode) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    }
}

pub fn check(id: u64, suite: u64, conclusion: Option<Conclusion>) -> CheckRun {
    CheckRun {
        id,
        name: format!("check-{id}"),
        status: if conclusion.is_some() {
            CheckStatus::Completed
        } else {
            CheckStatus::InProgress
        },
        conclusion,
        check_suite: Some(CheckSuiteRef { id: suite }),
    }
}

/// A scratch file under the system temp dir, unique per process and `name`.
pub fn temp_log(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("swt-it-{}-{name}.log", std::process::id()));
    std::fs::write(&path, contents).expect("write temp log");
    path
}
