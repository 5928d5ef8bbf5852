//! Splits a downloaded CI job log into steps.
//!
//! Each raw line looks like `<timestamp> <content>`. A step opens at
//! `##[group]Run <title>`; its own header noise runs until `##[endgroup]`, after which
//! every content line belongs to the step until `Post job cleanup.` or the next group.

use super::error::ModelError;
use super::ids::IdCounter;
use super::parser::TestOutputParser;
use super::result::{JobLog, Step};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const GROUP_BEGIN: &str = "##[group]Run ";
const GROUP_END: &str = "##[endgroup]";
const POST_JOB: &str = "Post job cleanup.";
const EXIT_ERROR: &str = "##[error]Process completed with exit code";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collect {
    Unset,
    Header,
    Body,
}

/// Incremental segmenter. Feed lines with [`LogSegmenter::push_line`], then call
/// [`LogSegmenter::finish`] to parse each step's test output.
#[derive(Debug)]
pub struct LogSegmenter<'a> {
    ids: &'a mut IdCounter,
    steps: Vec<Step>,
    collect: Collect,
    dropped: usize,
}

impl<'a> LogSegmenter<'a> {
    pub fn new(ids: &'a mut IdCounter) -> Self {
        Self {
            ids,
            steps: Vec::new(),
            collect: Collect::Unset,
            dropped: 0,
        }
    }

    pub fn push_line(&mut self, raw: &str) {
        let Some((_timestamp, content)) = raw.split_once(' ') else {
            self.dropped += 1;
            return;
        };

        if let Some(title) = content.strip_prefix(GROUP_BEGIN) {
            let id = self.ids.allocate();
            self.steps.push(Step::new(id, title));
            self.collect = Collect::Header;
            return;
        }

        if content == GROUP_END {
            if self.collect == Collect::Header {
                self.collect = Collect::Body;
            }
            return;
        }

        if content == POST_JOB {
            self.collect = Collect::Header;
            return;
        }

        if let Some(rest) = content.strip_prefix(EXIT_ERROR) {
            if let Some(step) = self.steps.last_mut() {
                step.lines.push(rest.to_string());
                step.success = false;
            }
            return;
        }

        if self.collect == Collect::Body {
            if let Some(step) = self.steps.last_mut() {
                step.lines.push(content.to_string());
            }
        }
    }

    /// Runs the test-output parser over every step, in order.
    pub fn finish(self) -> JobLog {
        let Self {
            ids,
            mut steps,
            dropped,
            ..
        } = self;
        for step in &mut steps {
            TestOutputParser::parse_step(ids, step);
        }
        tracing::debug!(steps = steps.len(), dropped, "segmented job log");
        JobLog::new(steps)
    }
}

/// Segments and parses a whole job log held in memory.
pub fn segment_str(text: &str, ids: &mut IdCounter) -> JobLog {
    let mut segmenter = LogSegmenter::new(ids);
    for line in text.lines() {
        segmenter.push_line(line);
    }
    segmenter.finish()
}

/// Segments and parses a job log from any buffered reader.
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the read.
pub fn segment_reader<R: BufRead>(mut reader: R, ids: &mut IdCounter) -> Result<JobLog, ModelError> {
    let mut segmenter = LogSegmenter::new(ids);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
        let line = buf.strip_suffix(b"\n").unwrap_or(&buf);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        segmenter.push_line(&String::from_utf8_lossy(line));
    }
    Ok(segmenter.finish())
}

/// Segments and parses a downloaded job log file.
pub fn segment_file(path: &Path, ids: &mut IdCounter) -> Result<JobLog, ModelError> {
    let io_err = |source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    segment_reader(BufReader::new(file), ids).map_err(|e| match e {
        ModelError::Read(source) => io_err(source),
        other => other,
    })
}
