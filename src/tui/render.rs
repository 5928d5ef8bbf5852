use crate::app::{AppState, Screen, Source};
use crate::tui::{checks, detail, footer, header, tree};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

pub fn render(f: &mut Frame, state: &AppState) {
    let detail_rows = if state.show_detail {
        detail::DETAIL_HEIGHT
    } else {
        0
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),           // header
            Constraint::Min(1),              // body
            Constraint::Length(detail_rows), // detail pane
            Constraint::Length(2),           // footer
        ])
        .split(f.area());

    header::render(f, chunks[0], state);
    render_body(f, chunks[1], state);
    if state.show_detail {
        detail::render(f, chunks[2], state);
    }
    footer::render(f, chunks[3], state);

    if let Some(err) = state.error_message() {
        let area = f.area();
        if area.height > 6 && area.width >= 4 {
            let err_area = Rect {
                x: area.x + 1,
                y: area.y + area.height.saturating_sub(5),
                width: area.width.saturating_sub(2),
                height: 3,
            };
            let err_widget = Paragraph::new(err.to_owned())
                .style(Style::default().fg(Color::Red))
                .block(
                    Block::default()
                        .title(" Error ")
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Red)),
                )
                .wrap(Wrap { trim: true });
            f.render_widget(err_widget, err_area);
        }
    }
}

fn split_columns(area: Rect, left_pct: u16) -> (Rect, Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(left_pct),
            Constraint::Percentage(100 - left_pct),
        ])
        .split(area);
    (cols[0], cols[1])
}

fn render_body(f: &mut Frame, area: Rect, state: &AppState) {
    match (state.source, state.screen) {
        (_, Screen::Commits) => {
            let (left, right) = split_columns(area, 40);
            checks::render_commits(f, left, state, true);
            checks::render_checks(f, right, state, false);
        }
        (_, Screen::Checks) => {
            let (left, right) = split_columns(area, 40);
            checks::render_commits(f, left, state, false);
            checks::render_checks(f, right, state, true);
        }
        (Source::PullRequest, Screen::Logs) => {
            let (left, right) = split_columns(area, 30);
            checks::render_checks(f, left, state, false);
            tree::render(f, right, state, true);
        }
        (_, Screen::Logs | Screen::Tests) => tree::render(f, area, state, true),
    }
}
