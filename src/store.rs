use crate::model::Task;
use chrono::NaiveDate;

/// In-memory copy of the task table, kept in server order.
///
/// Only confirmed service responses should reach the mutating methods; the
/// store never guesses what the server will do.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Appends a newly created task. A task with the same id is replaced in place instead.
    pub fn insert(&mut self, task: Task) {
        if let Some(existing) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *existing = task;
        } else {
            self.tasks.push(task);
        }
    }

    /// Replaces the task with the same id. Returns false if it is not cached.
    pub fn replace(&mut self, task: Task) -> bool {
        match self.get_mut(task.id) {
            Some(existing) => {
                *existing = task;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: i64) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(idx))
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: i64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn position(&self, id: i64) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn on_date(&self, date: NaiveDate) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.date == date).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
