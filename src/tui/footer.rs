use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, Screen, Source};

fn hints(state: &AppState, narrow: bool) -> &'static [(&'static str, &'static str)] {
    match (state.screen, narrow) {
        (Screen::Commits, true) => &[("j/k", "nav"), ("Enter", "checks"), ("q", "quit")],
        (Screen::Commits, false) => &[
            ("↑↓/jk", "navigate"),
            ("Enter", "show checks"),
            ("q", "quit"),
        ],
        (Screen::Checks, true) => &[
            ("j/k", "nav"),
            ("Enter", "logs"),
            ("Esc", "back"),
            ("q", "quit"),
        ],
        (Screen::Checks, false) => &[
            ("↑↓/jk", "navigate"),
            ("Enter", "show logs"),
            ("Esc", "commits"),
            ("q", "quit"),
        ],
        (Screen::Logs | Screen::Tests, true) => &[
            ("j/k", "nav"),
            ("Enter", "toggle"),
            ("Tab", "edit"),
            ("q", "quit"),
        ],
        (Screen::Logs | Screen::Tests, false) if state.source == Source::PullRequest => &[
            ("↑↓/jk", "navigate"),
            ("Enter/Space", "toggle"),
            ("d", "detail"),
            ("Tab", "editor"),
            ("Esc", "checks"),
            ("q", "quit"),
        ],
        (Screen::Logs | Screen::Tests, false) => &[
            ("↑↓/jk", "navigate"),
            ("Enter/Space", "toggle"),
            ("d", "detail"),
            ("Tab", "editor"),
            ("q", "quit"),
        ],
    }
}

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let narrow = area.width < crate::app::NARROW_WIDTH_THRESHOLD;

    let mut spans: Vec<Span> = Vec::new();
    for (i, (key, desc)) in hints(state, narrow).iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(*key, Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(
            format!(" {desc}"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::JobLog;

    fn keys(state: &AppState, narrow: bool) -> Vec<&'static str> {
        hints(state, narrow).iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn file_mode_has_no_back_hint() {
        let state = AppState::for_file("f".to_string(), JobLog::default());
        assert!(!keys(&state, false).contains(&"Esc"));
        assert!(keys(&state, false).contains(&"Tab"));
    }

    #[test]
    fn pull_request_logs_offer_back() {
        let mut state = AppState::for_pull_request("o/r #1".to_string());
        state.open_log(1, JobLog::default());
        assert!(keys(&state, false).contains(&"Esc"));
    }

    #[test]
    fn narrow_hints_are_shorter() {
        let state = AppState::for_pull_request("o/r #1".to_string());
        assert!(keys(&state, true).len() <= keys(&state, false).len());
        assert_eq!(hints(&state, true)[0].1, "nav");
    }
}
