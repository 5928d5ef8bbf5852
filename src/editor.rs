use crate::events::EventHandler;
use color_eyre::eyre::{eyre, Result};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

const FALLBACK_EDITOR: &str = "vi";

/// Program and leading arguments from `$VISUAL`, then `$EDITOR`, then `vi`.
pub fn editor_command(var: impl Fn(&str) -> Option<OsString>) -> (String, Vec<String>) {
    let configured = ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|key| var(key))
        .map(|v| v.to_string_lossy().trim().to_string())
        .find(|v| !v.is_empty());
    let line = configured.unwrap_or_else(|| FALLBACK_EDITOR.to_string());
    let mut parts = line.split_whitespace().map(str::to_string);
    let program = parts.next().unwrap_or_else(|| FALLBACK_EDITOR.to_string());
    (program, parts.collect())
}

/// Where the transcript of the current log is written before the editor opens it.
pub fn transcript_path(dir: &Path, title: &str) -> PathBuf {
    let slug: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug.trim_matches('-');
    let slug = if slug.is_empty() { "log" } else { slug };
    dir.join(format!("swt-{}-{slug}.log", std::process::id()))
}

/// Suspends the TUI, shows `transcript` in the user's editor, then takes the terminal
/// back.
pub async fn open(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    events: &EventHandler,
    transcript: String,
    title: &str,
) -> Result<()> {
    let path = transcript_path(&std::env::temp_dir(), title);
    tokio::fs::write(&path, transcript)
        .await
        .map_err(|e| eyre!("Failed to write {}: {e}", path.display()))?;

    let (program, args) = editor_command(|key| std::env::var_os(key));
    tracing::debug!(%program, path = %path.display(), "opening editor");

    events.pause();
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    let status = tokio::process::Command::new(&program)
        .args(&args)
        .arg(&path)
        .status()
        .await;

    let restored = terminal::enable_raw_mode()
        .and_then(|()| execute!(terminal.backend_mut(), EnterAlternateScreen))
        .and_then(|()| terminal.clear());
    events.resume();
    restored?;

    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::debug!("could not remove {}: {e}", path.display());
    }

    match status {
        Ok(s) if s.success() => Ok(()),
        Ok(s) => Err(eyre!("{program} exited with {s}")),
        Err(e) => Err(eyre!("Failed to start editor '{program}': {e}")),
    }
}
