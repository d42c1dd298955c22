use crate::calendar::CalendarState;
use crate::config::ViewMode;
use crate::model::Task;
use crate::store::TaskStore;
use crate::tui::form::TaskForm;
use chrono::NaiveDate;
use ratatui::widgets::ListState;
use std::time::{Duration, Instant};

pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub shown_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub task_id: i64,
    pub form: TaskForm,
}

/// Which popup, if any, is on screen. One variant at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Idle,
    /// The create form; its contents live in `AppState::draft`.
    Creating,
    Editing(EditSession),
    ConfirmingDelete(Task),
    Details(i64),
    DayTasks { date: NaiveDate, selected: usize },
}

pub struct AppState {
    // Data
    pub store: TaskStore,

    // UI State
    pub view: ViewMode,
    pub modal: Modal,
    pub draft: TaskForm,
    pub list_state: ListState,
    pub calendar: CalendarState,
    pub notification: Option<Notification>,
    pub loading: bool,
    pub today: NaiveDate,
}

impl AppState {
    pub fn new(today: NaiveDate, view: ViewMode) -> Self {
        Self {
            store: TaskStore::new(),
            view,
            modal: Modal::Idle,
            draft: TaskForm::default(),
            list_state: ListState::default(),
            calendar: CalendarState::new(today),
            notification: None,
            loading: true,
            today,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn notify(&mut self, level: Level, message: impl Into<String>) {
        self.notification = Some(Notification {
            level,
            message: message.into(),
            shown_at: Instant::now(),
        });
    }

    /// Called once per frame: drops stale notifications and follows the wall-clock date.
    pub fn tick(&mut self, today: NaiveDate, now: Instant) {
        self.today = today;
        if let Some(n) = &self.notification
            && now.duration_since(n.shown_at) >= NOTIFICATION_TTL
        {
            self.notification = None;
        }
    }

    pub fn switch_view(&mut self, view: ViewMode) {
        self.view = view;
    }

    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            ViewMode::List => ViewMode::Calendar,
            ViewMode::Calendar => ViewMode::List,
        };
    }

    /// Keeps the list selection inside the current task count.
    pub fn clamp_selection(&mut self) {
        let len = self.store.len();
        if len == 0 {
            self.list_state.select(None);
        } else {
            let current = self.list_state.selected().unwrap_or(0);
            if current >= len {
                self.list_state.select(Some(len - 1));
            } else {
                self.list_state.select(Some(current));
            }
        }
    }

    pub fn get_selected_task(&self) -> Option<&Task> {
        self.list_state
            .selected()
            .and_then(|idx| self.store.tasks().get(idx))
    }

    pub fn select_task(&mut self, id: i64) {
        if let Some(idx) = self.store.position(id) {
            self.list_state.select(Some(idx));
        }
    }

    /// Tasks shown in the day popup, if it is open.
    pub fn day_tasks(&self) -> Vec<&Task> {
        match &self.modal {
            Modal::DayTasks { date, .. } => self.store.on_date(*date),
            _ => Vec::new(),
        }
    }

    pub fn selected_day_task(&self) -> Option<&Task> {
        match &self.modal {
            Modal::DayTasks { date, selected } => self.store.on_date(*date).get(*selected).copied(),
            _ => None,
        }
    }

    /// Opens the create form with the date pre-filled, on the list view.
    pub fn start_create_on(&mut self, date: NaiveDate) {
        self.draft.set_date(date);
        self.draft.focus = Default::default();
        self.view = ViewMode::List;
        self.modal = Modal::Creating;
    }

    pub fn open_edit(&mut self, task: &Task) {
        self.modal = Modal::Editing(EditSession {
            task_id: task.id,
            form: TaskForm::from_task(task),
        });
    }

    pub fn open_delete(&mut self, task: &Task) {
        self.modal = Modal::ConfirmingDelete(task.clone());
    }

    pub fn close_modal(&mut self) {
        self.modal = Modal::Idle;
    }

    /// Closes the details popup once its task has left the cache.
    pub fn close_stale_details(&mut self) {
        if let Modal::Details(id) = self.modal
            && self.store.get(id).is_none()
        {
            self.close_modal();
        }
    }

    // --- NAVIGATION ---
    pub fn next(&mut self) {
        let len = self.store.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.store.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn next_day_task(&mut self) {
        let count = self.day_tasks().len();
        if let Modal::DayTasks { selected, .. } = &mut self.modal
            && count > 0
        {
            *selected = (*selected + 1) % count;
        }
    }

    pub fn previous_day_task(&mut self) {
        let count = self.day_tasks().len();
        if let Modal::DayTasks { selected, .. } = &mut self.modal
            && count > 0
        {
            *selected = if *selected == 0 { count - 1 } else { *selected - 1 };
        }
    }
}
