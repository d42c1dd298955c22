// File: src/tui/form.rs
use crate::model::{NewTask, Task, TaskPatch};
use crate::timefmt;
use chrono::NaiveDate;

pub const MISSING_FIELDS_MSG: &str = "Please provide a task, date, and time.";

/// Single-line text input with a char-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputField {
    value: String,
    cursor: usize,
}

impl InputField {
    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The part of the value left of the cursor.
    pub fn before_cursor(&self) -> &str {
        &self.value[..self.byte_index()]
    }

    pub fn set(&mut self, value: impl Into<String>) {
        *self = Self::with_value(value);
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.clamp_cursor(self.cursor.saturating_sub(1));
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = self.clamp_cursor(self.cursor.saturating_add(1));
    }

    pub fn enter_char(&mut self, new_char: char) {
        let byte_idx = self.byte_index();
        self.value.insert(byte_idx, new_char);
        self.move_cursor_right();
    }

    pub fn delete_char(&mut self) {
        if self.cursor != 0 {
            let before = self.value.chars().take(self.cursor - 1);
            let after = self.value.chars().skip(self.cursor);
            self.value = before.chain(after).collect();
            self.move_cursor_left();
        }
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.cursor)
            .unwrap_or(self.value.len())
    }

    fn clamp_cursor(&self, pos: usize) -> usize {
        pos.clamp(0, self.value.chars().count())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormField {
    #[default]
    Text,
    Date,
    Time,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Text => FormField::Date,
            FormField::Date => FormField::Time,
            FormField::Time => FormField::Text,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            FormField::Text => FormField::Time,
            FormField::Date => FormField::Text,
            FormField::Time => FormField::Date,
        }
    }
}

/// The text/date/time triple used by both the create and the edit popup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub text: InputField,
    pub date: InputField,
    pub time: InputField,
    pub focus: FormField,
}

impl TaskForm {
    pub fn from_task(task: &Task) -> Self {
        Self {
            text: InputField::with_value(&task.text),
            date: InputField::with_value(timefmt::format_date(task.date)),
            time: InputField::with_value(&task.time),
            focus: FormField::Text,
        }
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date.set(timefmt::format_date(date));
    }

    pub fn focused_mut(&mut self) -> &mut InputField {
        match self.focus {
            FormField::Text => &mut self.text,
            FormField::Date => &mut self.date,
            FormField::Time => &mut self.time,
        }
    }

    pub fn field(&self, field: FormField) -> &InputField {
        match field {
            FormField::Text => &self.text,
            FormField::Date => &self.date,
            FormField::Time => &self.time,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Client-side check before anything is sent to the service.
    fn parse(&self) -> Result<(String, NaiveDate, String), String> {
        let text = self.text.value().trim();
        let date = self.date.value().trim();
        let time = self.time.value().trim();
        if text.is_empty() || date.is_empty() || time.is_empty() {
            return Err(MISSING_FIELDS_MSG.to_string());
        }
        let date = timefmt::parse_date(date)
            .ok_or_else(|| format!("'{}' is not a date (YYYY-MM-DD).", date))?;
        if !timefmt::is_valid_time(time) {
            return Err(format!("'{}' is not a time (HH:MM).", time));
        }
        Ok((text.to_string(), date, time.to_string()))
    }

    pub fn to_new_task(&self) -> Result<NewTask, String> {
        let (text, date, time) = self.parse()?;
        Ok(NewTask::new(text, date, time))
    }

    pub fn to_patch(&self) -> Result<TaskPatch, String> {
        let (text, date, time) = self.parse()?;
        Ok(TaskPatch::details(text, date, time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(text: &str, date: &str, time: &str) -> TaskForm {
        TaskForm {
            text: InputField::with_value(text),
            date: InputField::with_value(date),
            time: InputField::with_value(time),
            focus: FormField::Text,
        }
    }

    #[test]
    fn test_cursor_clamping() {
        let mut input = InputField::with_value("abc");
        assert_eq!(input.cursor(), 3);
        input.move_cursor_right();
        assert_eq!(input.cursor(), 3);

        for _ in 0..5 {
            input.move_cursor_left();
        }
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_editing_multibyte_text() {
        let mut input = InputField::with_value("café");
        input.move_cursor_left();
        input.enter_char('!');
        assert_eq!(input.value(), "caf!é");
        input.delete_char();
        input.delete_char();
        assert_eq!(input.value(), "caé");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn test_focus_cycle() {
        let mut form = TaskForm::default();
        form.focus = form.focus.next();
        form.focused_mut().enter_char('x');
        assert_eq!(form.date.value(), "x");
        assert_eq!(form.field(FormField::Date).value(), "x");
        assert_eq!(form.focus.next().next(), FormField::Text);
        assert_eq!(FormField::Text.previous(), FormField::Time);
    }

    #[test]
    fn test_to_new_task_trims_and_validates() {
        let task = filled("  Pay rent ", "2024-04-01", "09:00").to_new_task().unwrap();
        assert_eq!(task.text, "Pay rent");
        assert_eq!(task.date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(task.time, "09:00");

        assert_eq!(
            filled("", "2024-04-01", "09:00").to_new_task().unwrap_err(),
            MISSING_FIELDS_MSG
        );
        assert_eq!(
            filled("x", "", "09:00").to_new_task().unwrap_err(),
            MISSING_FIELDS_MSG
        );
        assert!(filled("x", "2024-13-01", "09:00").to_new_task().is_err());
        assert!(filled("x", "2024-04-01", "9 o'clock").to_new_task().is_err());
    }

    #[test]
    fn test_to_patch_sets_every_editable_field() {
        let patch = filled("Rent", "2024-04-02", "10:30:00").to_patch().unwrap();
        assert_eq!(patch.text.as_deref(), Some("Rent"));
        assert_eq!(patch.time.as_deref(), Some("10:30:00"));
        assert!(patch.completed.is_none());
    }
}
