//! Parsing core: log segmentation, test-output parsing and the result tree.

pub mod error;
pub mod ids;
pub mod parser;
pub mod result;
pub mod segmenter;
mod selection;

pub use error::ModelError;
pub use ids::IdCounter;
pub use parser::TestOutputParser;
pub use result::{JobLog, Step, TestRun, TestSuite, Tier};
pub use segmenter::{segment_file, segment_reader, segment_str, LogSegmenter};
