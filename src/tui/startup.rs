use crate::gh::executor::GhExecutor;
use crate::gh::traits::ChecksApi;
use crate::gh::types::{Commit, PullRequest};
use crate::model::{segment_file, IdCounter, JobLog};
use crate::tui::spinner;
use color_eyre::eyre::{eyre, Result};
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Terminal;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone)]
enum PhaseStatus {
    InProgress,
    Done,
    Failed(String),
}

#[derive(Clone)]
struct StartupPhase {
    label: String,
    detail: Option<String>,
    status: PhaseStatus,
}

pub struct PullRequestStartup {
    pub pull_request: PullRequest,
    pub commits: Vec<Commit>,
}

fn render_startup<B: Backend>(terminal: &mut Terminal<B>, phases: &[StartupPhase], frame: usize) {
    let _ = terminal.draw(|f| {
        let area = f.area();
        let vertical = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(phases.len() as u16),
            Constraint::Min(0),
        ])
        .split(area);

        let lines: Vec<Line> = phases
            .iter()
            .map(|phase| {
                let (icon, icon_style) = match &phase.status {
                    PhaseStatus::InProgress => {
                        (spinner(frame).to_string(), Style::default().fg(Color::Yellow))
                    }
                    PhaseStatus::Done => ("\u{2713}".to_string(), Style::default().fg(Color::Green)),
                    PhaseStatus::Failed(_) => {
                        ("\u{2717}".to_string(), Style::default().fg(Color::Red))
                    }
                };

                let mut spans = vec![
                    Span::styled(format!("  {icon} "), icon_style),
                    Span::styled(phase.label.clone(), Style::default().fg(Color::White)),
                ];
                if let Some(detail) = &phase.detail {
                    spans.push(Span::raw("  "));
                    spans.push(Span::styled(detail.clone(), Style::default().fg(Color::DarkGray)));
                }
                if let PhaseStatus::Failed(msg) = &phase.status {
                    spans.push(Span::raw("  "));
                    spans.push(Span::styled(msg.clone(), Style::default().fg(Color::Red)));
                }
                Line::from(spans)
            })
            .collect();

        f.render_widget(Paragraph::new(lines), vertical[1]);
    });
}

/// Runs one startup step behind a spinner line. The line turns into a check mark or a
/// cross with the error once `fut` settles.
async fn run_phase<B, F, T>(
    terminal: &mut Terminal<B>,
    phases: &mut Vec<StartupPhase>,
    label: &str,
    fut: F,
) -> Result<T>
where
    B: Backend,
    F: Future<Output = Result<T>>,
{
    phases.push(StartupPhase {
        label: label.to_string(),
        detail: None,
        status: PhaseStatus::InProgress,
    });
    render_startup(terminal, phases, 0);

    let mut ticker = tokio::time::interval(Duration::from_millis(80));
    let mut frame = 0usize;
    tokio::pin!(fut);

    loop {
        tokio::select! {
            result = &mut fut => {
                if let Some(phase) = phases.last_mut() {
                    phase.status = match &result {
                        Ok(_) => PhaseStatus::Done,
                        Err(e) => PhaseStatus::Failed(e.to_string()),
                    };
                }
                render_startup(terminal, phases, frame);
                return result;
            }
            _ = ticker.tick() => {
                frame += 1;
                render_startup(terminal, phases, frame);
            }
        }
    }
}

fn set_detail<B: Backend>(terminal: &mut Terminal<B>, phases: &mut [StartupPhase], detail: String) {
    if let Some(phase) = phases.last_mut() {
        phase.detail = Some(detail);
    }
    render_startup(terminal, phases, 0);
}

pub async fn run_pull_request<B: Backend>(
    terminal: &mut Terminal<B>,
    api: &GhExecutor,
) -> Result<PullRequestStartup> {
    let mut phases: Vec<StartupPhase> = Vec::new();

    run_phase(terminal, &mut phases, "Checking GitHub CLI", GhExecutor::check_available()).await?;

    let pull_request = run_phase(
        terminal,
        &mut phases,
        "Fetching pull request",
        api.pull_request(),
    )
    .await?;
    set_detail(
        terminal,
        &mut phases,
        format!("#{} {}", pull_request.number, pull_request.title),
    );

    let commits = run_phase(terminal, &mut phases, "Fetching commits", api.commits()).await?;
    set_detail(terminal, &mut phases, format!("{} commits", commits.len()));

    Ok(PullRequestStartup {
        pull_request,
        commits,
    })
}

/// Segments a job log file off the async runtime while the spinner runs.
pub async fn run_log_file<B: Backend>(
    terminal: &mut Terminal<B>,
    path: PathBuf,
) -> Result<JobLog> {
    let mut phases: Vec<StartupPhase> = Vec::new();
    let label = path.display().to_string();

    let log = run_phase(terminal, &mut phases, "Reading job log", async move {
        tokio::task::spawn_blocking(move || segment_file(&path, &mut IdCounter::new()))
            .await
            .map_err(|e| eyre!("log reader crashed: {e}"))?
            .map_err(|e| eyre!(e))
    })
    .await?;
    set_detail(
        terminal,
        &mut phases,
        format!("{label}: {} steps", log.steps.len()),
    );

    Ok(log)
}
