use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "swt",
    version,
    about = "Steps & Tests Watcher: browse CI job logs and test output"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Write debug logs to the state directory
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Redraw tick in milliseconds
    #[arg(long, global = true, default_value_t = 250, value_parser = clap::value_parser!(u64).range(10..=5000))]
    pub tick_ms: u64,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Browse the check runs of a pull request and open their job logs
    Pr {
        /// Repository in owner/repo format
        #[arg(value_parser = validate_repo_format)]
        repo: String,
        /// Pull request number
        number: u64,
    },
    /// Open a job log that is already on disk
    Log {
        path: PathBuf,
    },
    /// Parse test output from standard input as it arrives
    Test {
        /// Title of the step holding the streamed output
        #[arg(short, long, default_value = "go test")]
        title: String,
    },
}

pub fn validate_repo_format(s: &str) -> Result<String, String> {
    let mut parts = s.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
            Ok(s.to_string())
        }
        _ => Err(format!("expected owner/repo, got '{s}'")),
    }
}
