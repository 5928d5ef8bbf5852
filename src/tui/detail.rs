use crate::app::AppState;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

/// Rows reserved below the tree for the detail pane, borders included.
pub const DETAIL_HEIGHT: u16 = 5;

/// Full text of the row under the cursor, wrapped.
pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(" Detail ")
        .title_bottom(Line::from(" d/Esc close ").centered())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let text = state.detail_text().unwrap_or_default();
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::White))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
