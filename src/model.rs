use crate::error::{TaskError, TaskResult};
use crate::timefmt;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub date: NaiveDate,
    pub time: String, // "HH:MM" or "HH:MM:SS", kept as entered
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// `2024-04-01 at 09:00`
    pub fn schedule_label(&self) -> String {
        timefmt::schedule_label(self.date, &self.time)
    }

    /// Returns a copy with the patch applied. Fields absent from the patch are untouched.
    pub fn patched(&self, patch: &TaskPatch) -> Task {
        let mut next = self.clone();
        if let Some(text) = &patch.text {
            next.text = text.clone();
        }
        if let Some(date) = patch.date {
            next.date = date;
        }
        if let Some(time) = &patch.time {
            next.time = time.clone();
        }
        if let Some(completed) = patch.completed {
            next.completed = completed;
        }
        next
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub text: String,
    pub date: NaiveDate,
    pub time: String,
}

impl NewTask {
    pub fn new(text: impl Into<String>, date: NaiveDate, time: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            date,
            time: time.into(),
        }
    }

    pub fn validate(&self) -> TaskResult<()> {
        validate_text(&self.text)?;
        validate_time(&self.time)
    }
}

/// Partial update. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn completion(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn details(text: impl Into<String>, date: NaiveDate, time: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            date: Some(date),
            time: Some(time.into()),
            completed: None,
        }
    }

    pub fn validate(&self) -> TaskResult<()> {
        if let Some(text) = &self.text {
            validate_text(text)?;
        }
        if let Some(time) = &self.time {
            validate_time(time)?;
        }
        Ok(())
    }
}

fn validate_text(text: &str) -> TaskResult<()> {
    if text.trim().is_empty() {
        return Err(TaskError::validation("text must not be empty"));
    }
    Ok(())
}

fn validate_time(time: &str) -> TaskResult<()> {
    if time.trim().is_empty() {
        return Err(TaskError::validation("time is required"));
    }
    if !timefmt::is_valid_time(time) {
        return Err(TaskError::validation(format!(
            "time '{}' is not HH:MM or HH:MM:SS",
            time
        )));
    }
    Ok(())
}
