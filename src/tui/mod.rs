pub mod action;
pub mod form;
pub mod handlers;
pub mod state;
pub mod view;

use crate::config::Config;
use crate::db;
use crate::logging;
use crate::model::TaskPatch;
use crate::paths::AppPaths;
use crate::service::{SqliteTaskService, TaskService};

use action::{Action, AppEvent, Operation};
use handlers::{handle_app_event, handle_key_event};
use state::AppState;
use view::draw;

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};
use std::sync::Arc;
use std::time::Instant;
use std::{env, io, time::Duration};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub async fn run() -> Result<()> {
    // --- 1. PREAMBLE & CONFIG ---
    let args: Vec<String> = env::args().collect();
    if args.len() > 1 && (args[1] == "--help" || args[1] == "-h") {
        print_help();
        return Ok(());
    }

    let config_exists = AppPaths::get_config_file_path()
        .map(|p| p.exists())
        .unwrap_or(false);
    let config = Config::load()?;
    logging::init_tracing(&config.log_level)?;
    if !config_exists {
        match config.save() {
            Ok(()) => info!("wrote default config"),
            Err(e) => warn!(error = %e, "could not write default config"),
        }
    }

    let url = config.resolve_database_url()?;
    let pool = db::connect(&url)
        .await
        .with_context(|| format!("Failed to open task database at {}", url))?;
    info!(%url, "opened task database");
    let service: Arc<dyn TaskService> = Arc::new(SqliteTaskService::new(pool));

    install_panic_hook();

    // --- 2. TERMINAL SETUP ---
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, service, &config).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn print_help() {
    let config_path = Config::get_path_string()
        .unwrap_or_else(|_| "[Could not determine config path]".to_string());
    println!("Usage: taskday [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -h, --help   Print this help");
    println!();
    println!("Config file: {}", config_path);
    println!("  database_url = \"sqlite:///path/to/tasks.db\"");
    println!("  default_view = \"list\"   # or \"calendar\"");
    println!("  log_level    = \"info\"");
    println!();
    println!("Set RUST_LOG to override log_level.");
}

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        use std::io::Write;
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
        if let Ok(mut file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(AppPaths::get_panic_log_path())
        {
            let _ = writeln!(file, "PANIC: {:?}", info);
        }
        default_hook(info);
    }));
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    service: Arc<dyn TaskService>,
    config: &Config,
) -> Result<()> {
    let mut app_state = AppState::new(Local::now().date_naive(), config.default_view);

    let (action_tx, mut action_rx) = mpsc::channel::<Action>(32);
    let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(32);

    // --- SERVICE ACTOR ---
    tokio::spawn(async move {
        while let Some(action) = action_rx.recv().await {
            if action == Action::Quit {
                break;
            }
            let service = service.clone();
            let event_tx = event_tx.clone();
            tokio::spawn(async move {
                if let Some(event) = perform(service.as_ref(), action).await {
                    let _ = event_tx.send(event).await;
                }
            });
        }
    });

    let _ = action_tx.send(Action::LoadTasks).await;

    // --- UI LOOP ---
    loop {
        app_state.tick(Local::now().date_naive(), Instant::now());
        terminal.draw(|f| draw(f, &mut app_state))?;

        while let Ok(event) = event_rx.try_recv() {
            handle_app_event(&mut app_state, event);
        }

        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(action) = handle_key_event(key, &mut app_state)
        {
            debug!(?action, "dispatching");
            let quit = action == Action::Quit;
            let _ = action_tx.send(action).await;
            if quit {
                break;
            }
        }
    }

    Ok(())
}

/// Runs one action against the service and turns the outcome into an event for the UI.
pub async fn perform(service: &dyn TaskService, action: Action) -> Option<AppEvent> {
    let (op, result) = match action {
        Action::Quit => return None,
        Action::LoadTasks => (
            Operation::Load,
            service.list_all_tasks().await.map(AppEvent::TasksLoaded),
        ),
        Action::CreateTask(new_task) => (
            Operation::Create,
            service.create_task(new_task).await.map(AppEvent::TaskCreated),
        ),
        Action::UpdateTask(id, patch) => (
            Operation::Update,
            service.update_task(id, patch).await.map(AppEvent::TaskUpdated),
        ),
        Action::ToggleCompletion(id, completed) => (
            Operation::Toggle,
            service
                .update_task(id, TaskPatch::completion(completed))
                .await
                .map(AppEvent::CompletionToggled),
        ),
        Action::DeleteTask(id) => (
            Operation::Delete,
            service
                .delete_task(id)
                .await
                .map(|removed| AppEvent::TaskDeleted { id, removed }),
        ),
    };

    Some(result.unwrap_or_else(|e| {
        warn!(?op, error = %e, "task service call failed");
        AppEvent::Failed {
            op,
            error: e.to_string(),
        }
    }))
}
