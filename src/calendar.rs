// File: src/calendar.rs
//! Month grid model for the calendar view. Everything here is pure: the
//! grid is rebuilt from `(tasks, displayed month, today)` on every draw.
use crate::model::Task;
use chrono::{Datelike, Duration, Months, NaiveDate};
use std::collections::HashMap;

/// Task labels shown inside one day cell before collapsing into "+N more".
pub const MAX_LABELS: usize = 2;

pub const WEEKDAY_HEADERS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn add_months(month: NaiveDate, delta: i32) -> NaiveDate {
    let first = first_of_month(month);
    let shifted = if delta >= 0 {
        first.checked_add_months(Months::new(delta as u32))
    } else {
        first.checked_sub_months(Months::new(delta.unsigned_abs()))
    };
    shifted.unwrap_or(first)
}

pub fn days_in_month(month: NaiveDate) -> u32 {
    let first = first_of_month(month);
    let next = add_months(first, 1);
    (next - first).num_days() as u32
}

#[derive(Debug, Clone)]
pub struct DayCell<'a> {
    pub date: NaiveDate,
    pub tasks: Vec<&'a Task>,
    pub is_today: bool,
}

impl DayCell<'_> {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().take(MAX_LABELS).map(|t| t.text.as_str())
    }

    pub fn overflow(&self) -> usize {
        self.tasks.len().saturating_sub(MAX_LABELS)
    }

    pub fn has_tasks(&self) -> bool {
        !self.tasks.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct MonthGrid<'a> {
    pub month: NaiveDate,
    /// Empty cells before day 1 so that columns line up with Sun..Sat.
    pub leading_blanks: usize,
    pub days: Vec<DayCell<'a>>,
}

impl<'a> MonthGrid<'a> {
    pub fn build(tasks: &'a [Task], month: NaiveDate, today: NaiveDate) -> Self {
        let first = first_of_month(month);
        let mut buckets: HashMap<NaiveDate, Vec<&'a Task>> = HashMap::new();
        for task in tasks {
            buckets.entry(task.date).or_default().push(task);
        }

        let days = (0..days_in_month(first))
            .map(|offset| {
                let date = first + Duration::days(offset as i64);
                DayCell {
                    date,
                    tasks: buckets.remove(&date).unwrap_or_default(),
                    is_today: date == today,
                }
            })
            .collect();

        Self {
            month: first,
            leading_blanks: first.weekday().num_days_from_sunday() as usize,
            days,
        }
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayCell<'a>> {
        if first_of_month(date) != self.month {
            return None;
        }
        self.days.get(date.day0() as usize)
    }

    /// Rows of seven slots; `None` for leading and trailing padding.
    pub fn weeks(&self) -> Vec<[Option<&DayCell<'a>>; 7]> {
        let mut slots: Vec<Option<&DayCell<'a>>> = vec![None; self.leading_blanks];
        slots.extend(self.days.iter().map(Some));
        while slots.len() % 7 != 0 {
            slots.push(None);
        }
        slots
            .chunks(7)
            .map(|row| {
                let mut week = [None; 7];
                week.copy_from_slice(row);
                week
            })
            .collect()
    }
}

/// What activating a day cell should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayClick {
    ShowTasks(NaiveDate),
    CreateOn(NaiveDate),
}

pub fn click_day(tasks: &[Task], date: NaiveDate) -> DayClick {
    if tasks.iter().any(|t| t.date == date) {
        DayClick::ShowTasks(date)
    } else {
        DayClick::CreateOn(date)
    }
}

/// Local navigation state of the calendar. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarState {
    pub displayed_month: NaiveDate,
    pub selected: NaiveDate,
}

impl CalendarState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            displayed_month: first_of_month(today),
            selected: today,
        }
    }

    pub fn next_month(&mut self) {
        self.shift_month(1);
    }

    pub fn previous_month(&mut self) {
        self.shift_month(-1);
    }

    pub fn go_to_today(&mut self, today: NaiveDate) {
        *self = Self::new(today);
    }

    /// Moves the highlighted day; crossing a month edge flips the displayed month.
    pub fn move_selection(&mut self, days: i64) {
        if let Some(next) = self.selected.checked_add_signed(Duration::days(days)) {
            self.selected = next;
            self.displayed_month = first_of_month(next);
        }
    }

    fn shift_month(&mut self, delta: i32) {
        let month = add_months(self.displayed_month, delta);
        let day = self.selected.day().min(days_in_month(month));
        self.displayed_month = month;
        self.selected = month.with_day(day).unwrap_or(month);
    }
}
