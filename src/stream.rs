//! Live parsing of test output from an unbounded source (usually stdin).
//!
//! The parser runs on its own OS thread because reads block. It owns all writes to the
//! shared [`JobLog`]; the UI only takes the lock to read between redraws. Progress is
//! reported through two one-way signals: [`StreamSignal::Updated`] after every line and
//! [`StreamSignal::Done`] exactly once, after the last line has been applied.

use crate::model::{IdCounter, JobLog, Step, TestOutputParser};
use parking_lot::Mutex;
use std::io::BufRead;
use std::sync::Arc;
use std::thread::JoinHandle;

pub type SharedLog = Arc<Mutex<JobLog>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSignal {
    Updated,
    Done,
}

/// Builds the one-step log that a live stream fills in. The step starts open.
pub fn stream_log(title: &str, ids: &mut IdCounter) -> JobLog {
    let mut step = Step::new(ids.allocate(), title);
    step.selected = true;
    JobLog::new(vec![step])
}

/// Reads `reader` to the end, applying each line to the first step of `log`.
///
/// Read errors end the stream like EOF does. Returns the number of lines ingested.
pub fn run<R, F>(mut reader: R, log: &SharedLog, mut ids: IdCounter, mut notify: F) -> usize
where
    R: BufRead,
    F: FnMut(StreamSignal),
{
    let mut parser = TestOutputParser::new();
    let mut buf = Vec::new();
    let mut count = 0usize;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::debug!("stream read ended: {e}");
                break;
            }
        }
        let line = String::from_utf8_lossy(trim_newline(&buf)).into_owned();

        {
            let mut guard = log.lock();
            let Some(step) = guard.steps.first_mut() else {
                tracing::warn!("stream log has no step; dropping input");
                break;
            };
            parser.parse_line(&mut ids, step, &line);
            step.lines.push(line);
        }
        count += 1;
        notify(StreamSignal::Updated);
    }

    {
        let mut guard = log.lock();
        if let Some(step) = guard.steps.first_mut() {
            parser.finish(step);
        }
    }
    tracing::debug!(lines = count, "stream finished");
    notify(StreamSignal::Done);
    count
}

/// Runs [`run`] on a dedicated thread.
pub fn spawn<R, F>(reader: R, log: SharedLog, ids: IdCounter, notify: F) -> JoinHandle<usize>
where
    R: BufRead + Send + 'static,
    F: FnMut(StreamSignal) + Send + 'static,
{
    std::thread::spawn(move || run(reader, &log, ids, notify))
}

fn trim_newline(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
