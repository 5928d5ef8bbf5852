use crate::app::AppState;
use crate::tui::spinner;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![
        Span::styled(
            format!(" swt v{} ", env!("CARGO_PKG_VERSION")),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(
            state.title.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    if let Some(sha) = &state.checks_sha {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!("[{}]", sha.get(..7).unwrap_or(sha)),
            Style::default().fg(Color::Yellow),
        ));
    }

    if let Some(msg) = &state.loading {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!("{} {msg}", spinner(state.spinner_frame)),
            Style::default().fg(Color::Yellow),
        ));
    }

    if let Some(status) = state.stream_status() {
        let style = if state.is_streaming() {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Green)
        };
        spans.push(Span::raw("  "));
        if state.is_streaming() {
            spans.push(Span::styled(format!("{} ", spinner(state.spinner_frame)), style));
        }
        spans.push(Span::styled(status, style));
    }

    if state.error_message().is_some() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            "!",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    f.render_widget(header, area);
}
