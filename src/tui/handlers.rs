// File: src/tui/handlers.rs
use crate::calendar::{self, DayClick};
use crate::config::ViewMode;
use crate::timefmt;
use crate::tui::action::{Action, AppEvent, Operation};
use crate::tui::form::TaskForm;
use crate::tui::state::{AppState, Level, Modal};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

/// Reconciles local state with a finished service call. Local data changes only on success.
pub fn handle_app_event(state: &mut AppState, event: AppEvent) {
    match event {
        AppEvent::TasksLoaded(tasks) => {
            debug!(count = tasks.len(), "tasks loaded");
            state.store.replace_all(tasks);
            state.loading = false;
            state.clamp_selection();
            state.close_stale_details();
        }
        AppEvent::TaskCreated(task) => {
            let msg = format!(
                "Task \"{}\" scheduled for {} at {}",
                task.text,
                timefmt::format_date(task.date),
                task.time
            );
            let id = task.id;
            state.store.insert(task);
            state.select_task(id);
            state.draft.clear();
            state.notify(Level::Success, msg);
        }
        AppEvent::TaskUpdated(task) => {
            let id = task.id;
            state.store.replace(task);
            if matches!(&state.modal, Modal::Editing(session) if session.task_id == id) {
                state.close_modal();
            }
            state.notify(Level::Success, "Task updated successfully!");
        }
        AppEvent::CompletionToggled(task) => {
            let msg = if task.completed {
                "Task completed successfully!"
            } else {
                "Task uncompleted successfully!"
            };
            state.store.replace(task);
            state.notify(Level::Success, msg);
        }
        AppEvent::TaskDeleted { id, removed } => {
            if removed {
                state.store.remove(id);
                state.clamp_selection();
                state.close_stale_details();
                if let Modal::DayTasks { selected, .. } = &mut state.modal {
                    *selected = 0;
                }
                state.notify(Level::Success, "Task deleted successfully!");
            } else {
                state.notify(Level::Info, "Task no longer exists (press r to reload)");
            }
        }
        AppEvent::Failed { op, error } => {
            warn!(?op, %error, "service call failed");
            if op == Operation::Load {
                state.loading = false;
            }
            state.notify(Level::Error, format!("{}: {}", op.failure_message(), error));
        }
    }
}

pub fn handle_key_event(key: KeyEvent, state: &mut AppState) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }

    match state.modal {
        Modal::Creating => handle_create_form(key, state),
        Modal::Editing(_) => handle_edit_form(key, state),
        Modal::ConfirmingDelete(_) => handle_delete_prompt(key, state),
        Modal::Details(_) => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                state.close_modal();
            }
            None
        }
        Modal::DayTasks { .. } => handle_day_tasks(key, state),
        Modal::Idle => match state.view {
            ViewMode::List => handle_list(key, state),
            ViewMode::Calendar => handle_calendar(key, state),
        },
    }
}

/// Keys shared by both views when no popup is open.
fn handle_global(key: KeyEvent, state: &mut AppState) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('r') => {
            state.loading = true;
            Some(Action::LoadTasks)
        }
        KeyCode::Tab => {
            state.toggle_view();
            None
        }
        KeyCode::Char('1') => {
            state.switch_view(ViewMode::List);
            None
        }
        KeyCode::Char('2') => {
            state.switch_view(ViewMode::Calendar);
            None
        }
        _ => None,
    }
}

fn handle_list(key: KeyEvent, state: &mut AppState) -> Option<Action> {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => state.next(),
        KeyCode::Up | KeyCode::Char('k') => state.previous(),
        KeyCode::Char('a') => {
            state.draft.focus = Default::default();
            state.modal = Modal::Creating;
        }
        KeyCode::Char(' ') => {
            if let Some(task) = state.get_selected_task() {
                return Some(Action::ToggleCompletion(task.id, !task.completed));
            }
        }
        KeyCode::Char('e') => {
            if let Some(task) = state.get_selected_task().cloned() {
                state.open_edit(&task);
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(task) = state.get_selected_task().cloned() {
                state.open_delete(&task);
            }
        }
        KeyCode::Enter | KeyCode::Char('i') => {
            if let Some(id) = state.get_selected_task().map(|t| t.id) {
                state.modal = Modal::Details(id);
            }
        }
        _ => return handle_global(key, state),
    }
    None
}

fn handle_calendar(key: KeyEvent, state: &mut AppState) -> Option<Action> {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => state.calendar.move_selection(-1),
        KeyCode::Right | KeyCode::Char('l') => state.calendar.move_selection(1),
        KeyCode::Up | KeyCode::Char('k') => state.calendar.move_selection(-7),
        KeyCode::Down | KeyCode::Char('j') => state.calendar.move_selection(7),
        KeyCode::Char('n') | KeyCode::Char(']') | KeyCode::PageDown => state.calendar.next_month(),
        KeyCode::Char('p') | KeyCode::Char('[') | KeyCode::PageUp => {
            state.calendar.previous_month()
        }
        KeyCode::Char('t') => state.calendar.go_to_today(state.today),
        KeyCode::Char('a') => state.start_create_on(state.calendar.selected),
        KeyCode::Enter => match calendar::click_day(state.tasks(), state.calendar.selected) {
            DayClick::ShowTasks(date) => state.modal = Modal::DayTasks { date, selected: 0 },
            DayClick::CreateOn(date) => state.start_create_on(date),
        },
        _ => return handle_global(key, state),
    }
    None
}

fn handle_create_form(key: KeyEvent, state: &mut AppState) -> Option<Action> {
    match key.code {
        KeyCode::Enter => match state.draft.to_new_task() {
            Ok(new_task) => {
                state.close_modal();
                return Some(Action::CreateTask(new_task));
            }
            Err(msg) => state.notify(Level::Error, msg),
        },
        // The draft survives closing so the user can come back to it.
        KeyCode::Esc => state.close_modal(),
        _ => edit_form_field(key, &mut state.draft),
    }
    None
}

fn handle_edit_form(key: KeyEvent, state: &mut AppState) -> Option<Action> {
    let Modal::Editing(session) = &mut state.modal else {
        return None;
    };
    match key.code {
        KeyCode::Enter => {
            // The popup stays open until the update is confirmed.
            match session.form.to_patch() {
                Ok(patch) => return Some(Action::UpdateTask(session.task_id, patch)),
                Err(msg) => state.notify(Level::Error, msg),
            }
        }
        KeyCode::Esc => state.close_modal(),
        _ => edit_form_field(key, &mut session.form),
    }
    None
}

fn edit_form_field(key: KeyEvent, form: &mut TaskForm) {
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
        KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.previous(),
        KeyCode::Char(c) => form.focused_mut().enter_char(c),
        KeyCode::Backspace => form.focused_mut().delete_char(),
        KeyCode::Left => form.focused_mut().move_cursor_left(),
        KeyCode::Right => form.focused_mut().move_cursor_right(),
        _ => {}
    }
}

fn handle_delete_prompt(key: KeyEvent, state: &mut AppState) -> Option<Action> {
    let Modal::ConfirmingDelete(task) = &state.modal else {
        return None;
    };
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            let id = task.id;
            state.close_modal();
            Some(Action::DeleteTask(id))
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            state.close_modal();
            None
        }
        _ => None,
    }
}

fn handle_day_tasks(key: KeyEvent, state: &mut AppState) -> Option<Action> {
    let Modal::DayTasks { date, .. } = state.modal else {
        return None;
    };
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => state.close_modal(),
        KeyCode::Down | KeyCode::Char('j') => state.next_day_task(),
        KeyCode::Up | KeyCode::Char('k') => state.previous_day_task(),
        KeyCode::Char('a') => state.start_create_on(date),
        KeyCode::Char('e') => {
            if let Some(task) = state.selected_day_task().cloned() {
                state.open_edit(&task);
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(task) = state.selected_day_task().cloned() {
                state.open_delete(&task);
            }
        }
        KeyCode::Char(' ') => {
            if let Some(task) = state.selected_day_task() {
                return Some(Action::ToggleCompletion(task.id, !task.completed));
            }
        }
        _ => {}
    }
    None
}
