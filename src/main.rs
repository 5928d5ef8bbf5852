use swt::app;
use swt::cli;
use swt::config::Config;
use swt::editor;
use swt::events;
use swt::gh;
use swt::input;
use swt::model::{segment_file, IdCounter};
use swt::stream;
use swt::tui;

use app::{AppState, Screen, NO_LOGS_MESSAGE};
use clap::Parser;
use cli::{Cli, Command};
use color_eyre::eyre::{eyre, Result};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, SetTitle};
use events::{AppEvent, EventHandler};
use gh::executor::GhExecutor;
use gh::service::LogService;
use gh::traits::ChecksApi;
use input::{Action, InputContext};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::future::Future;
use std::io;
use std::sync::Arc;
use stream::StreamSignal;
use tokio::sync::mpsc::UnboundedSender;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

fn setup_verbose_logging(config: &Config) -> Result<()> {
    let state_dir = &config.state_dir;
    std::fs::create_dir_all(state_dir)
        .map_err(|e| eyre!("Failed to create log directory {state_dir:?}: {e}"))?;
    let log_path = config.debug_log();
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| eyre!("Failed to open log file {log_path:?}: {e}"))?;
    tracing_subscriber::fmt()
        .with_writer(file)
        .with_ansi(false)
        .init();
    tracing::info!("swt v{} starting with verbose logging", env!("CARGO_PKG_VERSION"));
    Ok(())
}

/// Spawns `fut` and reports a panic inside it to the UI instead of losing it.
fn spawn_monitored(
    tx: UnboundedSender<AppEvent>,
    label: &'static str,
    fut: impl Future<Output = ()> + Send + 'static,
) {
    tokio::spawn(async move {
        let handle = tokio::spawn(fut);
        if let Err(join_err) = handle.await {
            let msg = if join_err.is_panic() {
                match join_err.into_panic().downcast::<String>() {
                    Ok(s) => *s,
                    Err(payload) => match payload.downcast::<&str>() {
                        Ok(s) => s.to_string(),
                        Err(_) => "unknown panic".to_string(),
                    },
                }
            } else {
                "task cancelled".to_string()
            };
            tracing::error!("{label} panicked: {msg}");
            if tx
                .send(AppEvent::Error(format!("{label} crashed: {msg}")))
                .is_err()
            {
                tracing::warn!("{label}: channel closed while reporting panic");
            }
        }
    });
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, SetTitle(""))?;
    terminal.show_cursor()?;
    Ok(())
}

/// Restores the terminal and exits when startup could not produce a state.
fn or_exit<T>(terminal: &mut Term, result: Result<T>) -> Result<T> {
    match result {
        Ok(v) => Ok(v),
        Err(e) => {
            restore_terminal(terminal)?;
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// What the event loop needs besides the state: the pull request collaborators, when
/// browsing one.
struct Session {
    api: Option<Arc<dyn ChecksApi>>,
    logs: Option<Arc<LogService>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();
    let config = Config::from_cli(&args);

    if config.verbose {
        setup_verbose_logging(&config)?;
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        if let Err(e) = terminal::disable_raw_mode() {
            eprintln!("Failed to disable raw mode during panic: {e}");
        }
        if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen, SetTitle("")) {
            eprintln!("Failed to leave alternate screen during panic: {e}");
        }
        original_hook(panic_info);
    }));

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let events = EventHandler::new(config.tick_rate);
    let tx = events.sender();

    let (mut state, session) = match args.command {
        Command::Pr { repo, number } => {
            let executor = GhExecutor::new(repo.clone(), number);
            let startup = tui::startup::run_pull_request(&mut terminal, &executor).await;
            let startup = or_exit(&mut terminal, startup)?;
            execute!(io::stdout(), SetTitle(format!("swt {repo} #{number}")))?;

            let api: Arc<dyn ChecksApi> = Arc::new(executor);
            let logs = LogService::start(api.clone(), config.cache_dir(), &startup.pull_request);
            let mut state = AppState::for_pull_request(format!(
                "{repo} #{number} {}",
                startup.pull_request.title
            ));
            state.set_commits(startup.commits);
            let session = Session {
                api: Some(api),
                logs: Some(Arc::new(logs)),
            };
            (state, session)
        }
        Command::Log { path } => {
            let log = tui::startup::run_log_file(&mut terminal, path.clone()).await;
            let log = or_exit(&mut terminal, log)?;
            let title = path.display().to_string();
            execute!(io::stdout(), SetTitle(format!("swt {title}")))?;
            let session = Session {
                api: None,
                logs: None,
            };
            (AppState::for_file(title, log), session)
        }
        Command::Test { title } => {
            let mut ids = IdCounter::new();
            let shared: stream::SharedLog = Arc::new(parking_lot::Mutex::new(
                stream::stream_log(&title, &mut ids),
            ));
            let stream_tx = tx.clone();
            stream::spawn(
                io::BufReader::new(io::stdin()),
                shared.clone(),
                ids,
                move |signal| {
                    if stream_tx.send(AppEvent::Stream(signal)).is_err() {
                        tracing::debug!("stream: event channel closed");
                    }
                },
            );
            let session = Session {
                api: None,
                logs: None,
            };
            (AppState::for_stream(title, shared), session)
        }
    };

    let result = run_app(&mut terminal, &mut state, events, &tx, &session).await;

    restore_terminal(&mut terminal)?;
    result
}

async fn run_app(
    terminal: &mut Term,
    state: &mut AppState,
    mut events: EventHandler,
    tx: &UnboundedSender<AppEvent>,
    session: &Session,
) -> Result<()> {
    let mut redraw = true;

    loop {
        if redraw {
            terminal.draw(|f| tui::render::render(f, state))?;
        }
        redraw = true;

        let Some(event) = events.next().await else {
            return Ok(());
        };
        match event {
            AppEvent::Key(key) => {
                let ctx = InputContext {
                    screen: state.screen,
                    has_error: state.error.is_some(),
                    is_loading: state.is_loading(),
                };
                let page = terminal.size()?.height.saturating_sub(6).max(1) as usize;
                match input::map_key(key, &ctx) {
                    Action::Quit => state.should_quit = true,
                    Action::DismissError => state.clear_error(),
                    Action::Back => {
                        state.back();
                    }
                    Action::MoveUp => state.move_cursor_up(),
                    Action::MoveDown => state.move_cursor_down(),
                    Action::PageUp => state.move_page(page, false),
                    Action::PageDown => state.move_page(page, true),
                    Action::Top => state.cursor_to_top(),
                    Action::Bottom => state.cursor_to_bottom(),
                    Action::Select => select(state, tx, session),
                    Action::ToggleDetail => state.toggle_detail(),
                    Action::OpenEditor => {
                        let transcript = state.log.lock().transcript();
                        if let Err(e) = editor::open(terminal, &events, transcript, &state.title).await {
                            tracing::warn!("editor: {e}");
                            state.set_error(e.to_string());
                        }
                    }
                    Action::None => redraw = false,
                }
            }
            AppEvent::Tick => {
                state.advance_spinner();
                state.prune_error();
                if state.dirty {
                    state.rebuild_tree();
                }
            }
            AppEvent::Stream(StreamSignal::Updated) => {
                // coalesced: the next tick rebuilds and redraws
                state.stream_updated();
                redraw = false;
            }
            AppEvent::Stream(StreamSignal::Done) => state.stream_done(),
            AppEvent::CheckRuns { sha, runs } => {
                state.end_loading();
                state.set_checks(sha, runs);
            }
            AppEvent::LogReady { check_id, log } => {
                state.end_loading();
                state.open_log(check_id, log);
            }
            AppEvent::Error(e) => {
                state.end_loading();
                state.set_error(e);
            }
        }

        if state.should_quit {
            return Ok(());
        }
    }
}

/// Enter on the current screen: fetch checks for a commit, the job log for a check, or
/// toggle a node of the result tree.
fn select(state: &mut AppState, tx: &UnboundedSender<AppEvent>, session: &Session) {
    match state.screen {
        Screen::Commits => {
            let (Some(api), Some(commit)) = (&session.api, state.current_commit()) else {
                return;
            };
            let sha = commit.sha.clone();
            let label = format!("Fetching checks for {}", commit.short_sha());
            state.start_loading(label);
            let api = api.clone();
            let tx2 = tx.clone();
            spawn_monitored(tx.clone(), "check runs", async move {
                let event = match api.check_runs(&sha).await {
                    Ok(runs) => AppEvent::CheckRuns { sha, runs },
                    Err(e) => AppEvent::Error(e.to_string()),
                };
                if tx2.send(event).is_err() {
                    tracing::debug!("check runs: channel closed");
                }
            });
        }
        Screen::Checks => {
            let (Some(logs), Some(check)) = (&session.logs, state.current_check()) else {
                return;
            };
            if !check.has_logs() {
                state.set_error(NO_LOGS_MESSAGE.to_string());
                return;
            }
            let check = check.clone();
            state.start_loading(format!("Loading log for {}", check.name));
            let logs = logs.clone();
            let tx2 = tx.clone();
            spawn_monitored(tx.clone(), "job log", async move {
                let event = match load_log(&logs, &check).await {
                    Ok(log) => AppEvent::LogReady {
                        check_id: check.id,
                        log,
                    },
                    Err(e) => AppEvent::Error(e.to_string()),
                };
                if tx2.send(event).is_err() {
                    tracing::debug!("job log: channel closed");
                }
            });
        }
        Screen::Logs | Screen::Tests => {
            state.activate();
        }
    }
}

async fn load_log(logs: &LogService, check: &gh::types::CheckRun) -> Result<swt::model::JobLog> {
    let path = logs.logs(check).await?;
    tokio::task::spawn_blocking(move || segment_file(&path, &mut IdCounter::new()))
        .await
        .map_err(|e| eyre!("log reader crashed: {e}"))?
        .map_err(|e| eyre!(e))
}
