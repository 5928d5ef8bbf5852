use crate::app::{AppState, ResolvedItem, TreeItem};
use crate::model::JobLog;
use crate::tui::truncate;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use regex::Regex;
use std::sync::LazyLock;

/// Step titles are cut short; the detail pane shows them in full.
const STEP_TITLE_MAX: usize = 30;

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("static pattern compiles")
}

static SOURCE_LOCATION: LazyLock<Regex> = LazyLock::new(|| pattern(r"\S+\.go:\d+:"));
static FAILED_TALLY: LazyLock<Regex> = LazyLock::new(|| pattern(r"Failed: \d+"));
static ERROR_LINE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)^\s+error:"));

pub fn render(f: &mut Frame, area: Rect, state: &AppState, focused: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if state.tree_items.is_empty() {
        let msg = if state.is_streaming() {
            "Waiting for test output..."
        } else {
            "No steps found in this log"
        };
        f.render_widget(
            Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let visible_height = inner.height as usize;
    let scroll_offset = if state.cursor >= visible_height {
        state.cursor - visible_height + 1
    } else {
        0
    };
    let width = inner.width as usize;

    let log = state.log.lock();
    let lines: Vec<Line> = state
        .tree_items
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_height)
        .map(|(i, item)| render_row(&log, item, i == state.cursor && focused, width))
        .collect();
    drop(log);

    f.render_widget(Paragraph::new(lines), inner);
}

fn arrow(expanded: bool) -> &'static str {
    if expanded {
        "▼ "
    } else {
        "► "
    }
}

fn render_row(log: &JobLog, item: &TreeItem, is_selected: bool, width: usize) -> Line<'static> {
    let select = |style: Style| {
        if is_selected {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        }
    };
    let dim = Style::default().fg(Color::DarkGray);

    let Some(resolved) = item.resolve(log) else {
        return Line::raw("");
    };

    match resolved {
        ResolvedItem::Step { index, step } => {
            let mark = if step.success {
                Span::raw("  ")
            } else {
                Span::styled("✘ ", Style::default().fg(Color::Red))
            };
            Line::from(vec![
                mark,
                Span::styled(arrow(item.expanded), dim),
                Span::styled(
                    format!("Step {index}: {}", truncate(&step.title, STEP_TITLE_MAX)),
                    select(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                ),
            ])
        }
        ResolvedItem::Suite(suite) => {
            let mut spans = vec![Span::raw("     "), Span::styled(arrow(item.expanded), dim)];
            spans.extend(highlight(
                &truncate(&suite.title, width.saturating_sub(7)),
                &FAILED_TALLY,
                select(dim),
                select(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            ));
            Line::from(spans)
        }
        ResolvedItem::Run(run) => {
            let name = if run.name.is_empty() { "(main)" } else { run.name.as_str() };
            Line::from(vec![
                Span::raw("        "),
                Span::styled(arrow(item.expanded), dim),
                Span::styled(
                    truncate(name, width.saturating_sub(10)),
                    select(Style::default().fg(Color::Gray)),
                ),
            ])
        }
        ResolvedItem::StepLine {
            number,
            text,
            failing,
        } => {
            let style = if failing {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                dim
            };
            let prefix = format!("     {number} ");
            Line::from(vec![
                Span::styled(
                    prefix.clone(),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    truncate(text, width.saturating_sub(prefix.len())),
                    select(style),
                ),
            ])
        }
        ResolvedItem::RunLine(text) => {
            let base = if ERROR_LINE.is_match(text) {
                Style::default().fg(Color::Red)
            } else {
                dim
            };
            let mut spans = vec![Span::raw("          ")];
            spans.extend(highlight(
                &truncate(text, width.saturating_sub(10)),
                &SOURCE_LOCATION,
                select(base),
                select(Style::default().fg(Color::Cyan)),
            ));
            Line::from(spans)
        }
        ResolvedItem::AllPassed => Line::from(vec![
            Span::raw("     "),
            Span::styled("✔", select(Style::default().fg(Color::Green))),
        ]),
        ResolvedItem::NoOutput => Line::from(vec![
            Span::raw("          "),
            Span::styled("✘", select(Style::default().fg(Color::Red))),
        ]),
    }
}

/// Splits `text` into spans, styling every match of `re` with `hit`.
fn highlight(text: &str, re: &Regex, base: Style, hit: Style) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        if m.start() > last {
            spans.push(Span::styled(text[last..m.start()].to_string(), base));
        }
        spans.push(Span::styled(m.as_str().to_string(), hit));
        last = m.end();
    }
    if last < text.len() {
        spans.push(Span::styled(text[last..].to_string(), base));
    }
    spans
}
