use crate::cli::Cli;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "swt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub state_dir: PathBuf,
    pub tick_rate: Duration,
    pub verbose: bool,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            state_dir: state_dir_from(|key| std::env::var_os(key)),
            tick_rate: Duration::from_millis(cli.tick_ms),
            verbose: cli.verbose,
        }
    }

    /// Downloaded job logs, one `<check-run-id>.log` per check run.
    pub fn cache_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }

    pub fn debug_log(&self) -> PathBuf {
        self.state_dir.join("debug.log")
    }
}

/// `$XDG_STATE_HOME/swt`, then `$HOME/.local/state/swt`, then `/tmp/swt`.
pub fn state_dir_from(var: impl Fn(&str) -> Option<OsString>) -> PathBuf {
    let set = |key: &str| var(key).filter(|v| !v.is_empty());
    if let Some(state) = set("XDG_STATE_HOME") {
        PathBuf::from(state).join(APP_DIR)
    } else if let Some(home) = set("HOME") {
        PathBuf::from(home).join(".local").join("state").join(APP_DIR)
    } else {
        PathBuf::from("/tmp").join(APP_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), OsString::from(v)))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn xdg_state_home_wins() {
        let dir = state_dir_from(env(&[("XDG_STATE_HOME", "/x/state"), ("HOME", "/home/u")]));
        assert_eq!(dir, PathBuf::from("/x/state/swt"));
    }

    #[test]
    fn falls_back_to_home() {
        let dir = state_dir_from(env(&[("XDG_STATE_HOME", ""), ("HOME", "/home/u")]));
        assert_eq!(dir, PathBuf::from("/home/u/.local/state/swt"));
    }

    #[test]
    fn falls_back_to_tmp() {
        assert_eq!(state_dir_from(env(&[])), PathBuf::from("/tmp/swt"));
    }

    #[test]
    fn derived_paths() {
        let config = Config {
            state_dir: PathBuf::from("/s/swt"),
            tick_rate: Duration::from_millis(250),
            verbose: false,
        };
        assert_eq!(config.cache_dir(), PathBuf::from("/s/swt/logs"));
        assert_eq!(config.debug_log(), PathBuf::from("/s/swt/debug.log"));
    }
}
