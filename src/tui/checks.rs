use crate::app::AppState;
use crate::gh::types::{CheckRun, CheckStatus, Conclusion};
use crate::tui::truncate;
use chrono::Utc;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

fn panel(title: &str, focused: bool) -> Block<'_> {
    Block::default()
        .title(format!("| {title} |"))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }))
}

fn status_icon(check: &CheckRun) -> (&'static str, Color) {
    match (check.status, check.conclusion) {
        (CheckStatus::Completed, Some(Conclusion::Success)) => ("✔", Color::Green),
        (CheckStatus::Completed, Some(Conclusion::Skipped)) => ("•", Color::Gray),
        (CheckStatus::Completed, _) => ("✘", Color::Red),
        _ => ("•", Color::Yellow),
    }
}

fn status_label(check: &CheckRun) -> &'static str {
    match (check.status, check.conclusion) {
        (CheckStatus::Completed, Some(c)) => match c {
            Conclusion::Success => "success",
            Conclusion::Failure => "failure",
            Conclusion::Neutral => "neutral",
            Conclusion::Cancelled => "cancelled",
            Conclusion::Skipped => "skipped",
            Conclusion::TimedOut => "timed out",
            Conclusion::ActionRequired => "action required",
            Conclusion::Stale => "stale",
            Conclusion::StartupFailure => "startup failure",
            Conclusion::Unknown => "unknown",
        },
        (CheckStatus::Completed, None) => "completed",
        (CheckStatus::InProgress, _) => "in progress",
        (CheckStatus::Queued, _) => "queued",
        (CheckStatus::Waiting, _) => "waiting",
        (CheckStatus::Requested, _) => "requested",
        (CheckStatus::Pending, _) => "pending",
        (CheckStatus::Unknown, _) => "unknown",
    }
}

pub fn relative_time(secs: i64) -> String {
    let secs = secs.max(0);
    if secs < 60 {
        "just now".to_string()
    } else if secs < 3600 {
        format!("{} minutes ago", secs / 60)
    } else if secs < 86_400 {
        format!("{} hours ago", secs / 3600)
    } else {
        format!("{} days ago", secs / 86_400)
    }
}

pub fn render_commits(f: &mut Frame, area: Rect, state: &AppState, focused: bool) {
    let block = panel("commits", focused);
    let inner = block.inner(area);
    f.render_widget(block, area);
    let width = inner.width as usize;

    // two rows per commit
    let per_page = (inner.height as usize / 2).max(1);
    let offset = (state.commit_cursor + 1).saturating_sub(per_page);
    let now = Utc::now();

    let mut lines = Vec::new();
    for (i, commit) in state.commits.iter().enumerate().skip(offset).take(per_page) {
        let style = if i == state.commit_cursor && focused {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let when = commit
            .committed_at()
            .map(|t| relative_time(now.signed_duration_since(t).num_seconds()))
            .unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled(commit.short_sha().to_string(), style),
            Span::raw(" "),
            Span::styled(
                truncate(commit.summary(), width.saturating_sub(8)),
                Style::default().fg(Color::White),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {when}"),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No commits",
            Style::default().fg(Color::DarkGray),
        )));
    }
    f.render_widget(Paragraph::new(lines), inner);
}

/// Check runs grouped by check suite, one "Task N" header per group.
pub fn render_checks(f: &mut Frame, area: Rect, state: &AppState, focused: bool) {
    let block = panel("checks", focused);
    let inner = block.inner(area);
    f.render_widget(block, area);
    let width = inner.width as usize;

    if state.checks.is_empty() {
        let msg = if state.is_loading() {
            ""
        } else if state.checks_sha.is_some() {
            "No data found for this commit."
        } else {
            "Select a commit"
        };
        f.render_widget(
            Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let mut lines = Vec::new();
    let mut cursor_line = 0;
    let mut index = 0;
    for (task, group) in state.check_groups().iter().enumerate() {
        if task > 0 {
            lines.push(Line::raw(""));
        }
        lines.push(Line::from(Span::styled(
            format!("Task {}", task + 1),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )));
        for check in *group {
            let (icon, color) = status_icon(check);
            let selected = index == state.check_cursor;
            if selected {
                cursor_line = lines.len();
            }
            let mut name_style = if check.has_logs() {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            if selected && focused {
                name_style = name_style.add_modifier(Modifier::REVERSED);
            }
            let label = status_label(check);
            lines.push(Line::from(vec![
                Span::styled(format!("{icon} "), Style::default().fg(color)),
                Span::styled(
                    truncate(&check.name, width.saturating_sub(label.len() + 4)),
                    name_style,
                ),
                Span::styled(format!(" {label}"), Style::default().fg(Color::DarkGray)),
            ]));
            index += 1;
        }
    }

    let visible = inner.height as usize;
    let scroll = (cursor_line + 1).saturating_sub(visible) as u16;
    f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}
